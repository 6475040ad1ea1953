//! Aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! GET /v1/movies/{id}
//!     → orchestrator.rs
//!         → MovieInfoSource (mandatory; error propagates unchanged)
//!         → ReviewSource    (after the primary resolves; error → empty list)
//!     → Movie { movieInfo, reviewList }
//! ```

pub mod orchestrator;
pub mod sources;

pub use orchestrator::MoviesOrchestrator;
pub use sources::{MovieInfoSource, MoviesInfoClient, ReviewSource, ReviewsClient};
