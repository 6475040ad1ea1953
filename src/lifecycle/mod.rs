//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.trigger()
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → open NDJSON streams end → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
