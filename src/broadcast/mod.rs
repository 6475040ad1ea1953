//! Live broadcast subsystem.
//!
//! # Data Flow
//! ```text
//! POST handler → store.save() → channel.publish(saved)
//!                                   │
//!         ┌─────────────────────────┼─────────────────────────┐
//!         ▼                         ▼                         ▼
//!    [Subscriber]              [Subscriber]              [Subscriber]
//!    replay latest, then live publishes, as NDJSON over HTTP
//! ```
//!
//! The channel is constructed at startup and shared through application
//! state; there is no global instance.

pub mod channel;

pub use channel::BroadcastChannel;
