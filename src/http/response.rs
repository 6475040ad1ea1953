//! Response mapping.
//!
//! # Responsibilities
//! - Map upstream, store and validation errors to status codes
//! - Render live sequences as newline-delimited JSON
//!
//! # Design Decisions
//! - Client errors keep the dependency's status and message
//! - Server errors become 500 with the dependency-qualified message
//! - NDJSON bodies end when the process shuts down

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::Shutdown;
use crate::store::StoreError;
use crate::upstream::UpstreamError;

pub const NDJSON: &str = "application/x-ndjson";

/// Errors a handler can surface to its caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request body failed validation; the message lists every violation.
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// `Ok` when `violations` is empty, otherwise one comma-joined message.
    pub fn check(violations: Vec<&str>) -> Result<(), ApiError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Invalid(violations.join(",")))
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Upstream(UpstreamError::Client { status, .. }) => StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_REQUEST),
            ApiError::Upstream(UpstreamError::Server { .. }) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// Stream `items` as one JSON document per line until shutdown.
pub fn ndjson<S, T>(items: S, shutdown: &Shutdown) -> Response
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let lines = items.take_until(shutdown.signalled()).map(|item| {
        let mut line = serde_json::to_vec(&item)?;
        line.push(b'\n');
        Ok::<_, serde_json::Error>(Bytes::from(line))
    });

    ([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(lines)).into_response()
}
