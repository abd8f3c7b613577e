//! HTTP client layer — `InscriptionHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::{FileMetadata, InscriptionHttp};
pub use retry::{with_retry, Backoff, RetryConfig, RetryPolicy};
