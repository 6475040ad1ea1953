//! Resilient upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamRequest (dependency + operation)
//!     → client.rs (outbound GET with timeout)
//!     → classify.rs (status + body → UpstreamOutcome)
//!     → resilience::retries (retry Server failures with backoff)
//!     → typed value or UpstreamError
//!
//! Stream calls:
//!     → stream.rs (NDJSON lines, whole-request restart on retryable failure)
//! ```
//!
//! # Design Decisions
//! - Outcomes are a closed enum, never panics or boxed errors
//! - 404 on a single fetch gets a fixed message naming the id
//! - No caching; each call goes to the network

pub mod classify;
pub mod client;
pub mod error;
pub mod request;
mod stream;

pub use client::{http_client, UpstreamClient};
pub use error::{UpstreamError, UpstreamOutcome};
pub use request::{Dependency, Operation, UpstreamRequest};
