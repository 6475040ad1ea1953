//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → upstream client (request timeout from config)
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//!     → backoff.rs (fixed or exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Only dependency-side faults are retried; 4xx never is
//! - The retry loop is independent of how the call reports failure

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::{retry, RetryPolicy};
