//! HTTP surfaces, one per service role.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware: request id, trace, timeout)
//!     → movie_info.rs | reviews.rs | movies.rs (handlers)
//!     → response.rs (error mapping, NDJSON bodies)
//!     → Send to client
//! ```

pub mod movie_info;
pub mod movies;
pub mod request;
pub mod response;
pub mod reviews;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{HttpServer, Role, ServerError};
