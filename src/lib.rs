//! Reactive movie services.
//!
//! Three cooperating services: movie-info (records plus a live feed of
//! additions), reviews, and movies, which composes the other two through a
//! retrying upstream client.

pub mod aggregation;
pub mod broadcast;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;
pub mod upstream;

pub use config::schema::ServiceConfig;
pub use http::{HttpServer, Role};
pub use lifecycle::Shutdown;
