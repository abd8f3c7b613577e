//! Domain modules: inscription requests and remote inscription jobs.

pub mod job;
pub mod request;
