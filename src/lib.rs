//! # Inscription SDK
//!
//! Rust SDK for the Kiloscribe inscription service: submit a file or Hashinal
//! metadata, settle the ledger transaction, and track the job to completion.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Requests, validation, job snapshots, progress, errors, logging
//! 2. **Auth** — Challenge-response API-key acquisition with a pluggable signer
//! 3. **HTTP API** — `InscriptionHttp` with per-endpoint retry policies
//! 4. **WebSocket** — Socket.IO session over `tokio-tungstenite`
//! 5. **Orchestration** — Transport selection, submission channels, ledger
//!    execution, completion tracking, and the `InscriptionClient` entry point
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inscription_sdk::prelude::*;
//!
//! let client = InscriptionClient::builder()
//!     .api_key("...")
//!     .network(Network::Testnet)
//!     .ledger(my_ledger)
//!     .build()?;
//!
//! let request = InscriptionRequest::new(
//!     FileInput::url("https://example.com/art.png"),
//!     "0.0.1234",
//!     InscriptionMode::File,
//! );
//! let credentials = LedgerCredentials::new("0.0.1234", private_key, Network::Testnet);
//! let result = client
//!     .inscribe_and_execute(&request, &credentials, None, WaitOptions::default())
//!     .await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Requests, job snapshots, progress and results.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Injected logging capability.
pub mod logging;

/// Network names and service URL constants.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Authentication: signed challenge in, API key out.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
pub mod http;

// ── Layer 4: WebSocket ───────────────────────────────────────────────────────

/// Socket.IO session: packets, acks, server events.
pub mod ws;

// ── Layer 5: Orchestration ───────────────────────────────────────────────────

/// Ledger execution seams and key handling.
pub mod ledger;

/// Transport selection and submission channels.
pub mod transport;

/// Completion tracking.
pub mod tracker;

/// `InscriptionClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Requests
    pub use crate::domain::request::{FileInput, InscriptionMode, InscriptionRequest};

    // Jobs, progress, results
    pub use crate::domain::job::wire::{
        HolderInscriptionsResponse, InscriptionNumberDetails, InscriptionNumbersParams, SortOrder,
    };
    pub use crate::domain::job::{
        InscriptionJob, InscriptionResult, JobSnapshot, ProgressCallback, ProgressEvent,
        ProgressStage,
    };

    // Errors
    pub use crate::error::{AuthError, HttpError, SdkError, ValidationError, WsError};

    // Logging
    pub use crate::logging::{Logger, NoopLogger, TracingLogger};

    // Network
    pub use crate::network::{Network, DEFAULT_API_URL, DEFAULT_AUTH_URL};

    // Auth
    pub use crate::auth::{AuthConfig, AuthResult, Authenticator, ChallengeEncoding, MessageSigner};
    #[cfg(feature = "native-auth")]
    pub use crate::auth::native::Ed25519Signer;

    // Ledger
    pub use crate::ledger::{
        LedgerClient, LedgerCredentials, LedgerError, TransactionReceipt, WalletSigner,
    };

    // Orchestration
    pub use crate::tracker::TrackOptions;
    pub use crate::transport::ConnectionMode;

    // Client
    pub use crate::client::{
        InscriptionClient, InscriptionClientBuilder, InscriptionConfig, WaitOptions,
    };
}
