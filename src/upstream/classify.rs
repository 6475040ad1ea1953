//! Status classification.
//!
//! Pure functions from `(request, status, body)` to an outcome, applied in order:
//! 4xx → `Client`, 5xx → `Server`, anything else → decode the body.

use std::fmt::Display;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::upstream::error::{UpstreamError, UpstreamOutcome};
use crate::upstream::request::{Dependency, Operation, UpstreamRequest};

/// Classify a complete response.
pub fn classify<T: DeserializeOwned>(request: &UpstreamRequest, status: StatusCode, body: &str) -> UpstreamOutcome<T> {
    check_status(request, status, body)?;
    decode(&request.dependency, body)
}

/// Turn an error status into a typed failure. Non-error statuses pass.
pub fn check_status(request: &UpstreamRequest, status: StatusCode, body: &str) -> Result<(), UpstreamError> {
    if status.is_client_error() {
        let message = match &request.operation {
            Operation::FetchById(id) if status == StatusCode::NOT_FOUND => not_found_message(&request.dependency, id),
            _ => body.to_string(),
        };
        return Err(UpstreamError::Client {
            message,
            status: status.as_u16(),
        });
    }

    if status.is_server_error() {
        return Err(server_error(&request.dependency, body));
    }

    Ok(())
}

/// Decode a payload; failure is a dependency-side fault.
pub fn decode<T: DeserializeOwned>(dependency: &Dependency, body: &str) -> UpstreamOutcome<T> {
    serde_json::from_str(body)
        .map_err(|e| server_error(dependency, format_args!("returned an undecodable payload: {}", e)))
}

/// `Server` error carrying the dependency name and detail.
pub fn server_error(dependency: &Dependency, detail: impl Display) -> UpstreamError {
    UpstreamError::Server {
        message: format!("Server Exception in {} {}", dependency.name, detail),
    }
}

pub fn not_found_message(dependency: &Dependency, id: &str) -> String {
    format!(
        "There is no {} available for the passed in Id : {}",
        dependency.resource, id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    fn request(operation: Operation) -> UpstreamRequest {
        let dependency = Dependency::new("MoviesInfoService", "movieInfo", "http://localhost/v1/movieinfos").unwrap();
        UpstreamRequest::new(Arc::new(dependency), operation)
    }

    #[test]
    fn test_not_found_on_fetch_by_id_names_the_id() {
        let outcome: UpstreamOutcome<Item> = classify(
            &request(Operation::FetchById("abc".into())),
            StatusCode::NOT_FOUND,
            "",
        );
        assert_eq!(
            outcome.unwrap_err(),
            UpstreamError::Client {
                message: "There is no movieInfo available for the passed in Id : abc".to_string(),
                status: 404,
            }
        );
    }

    #[test]
    fn test_other_client_errors_keep_body_verbatim() {
        let outcome: UpstreamOutcome<Item> = classify(
            &request(Operation::FetchById("abc".into())),
            StatusCode::BAD_REQUEST,
            "movieInfo.name must be present",
        );
        assert_eq!(outcome.unwrap_err().message(), "movieInfo.name must be present");

        let query = request(Operation::FetchByQuery {
            field: "movieInfoId".into(),
            value: "abc".into(),
        });
        let outcome: UpstreamOutcome<Vec<Item>> = classify(&query, StatusCode::NOT_FOUND, "no reviews");
        assert_eq!(outcome.unwrap_err().message(), "no reviews");
    }

    #[test]
    fn test_server_error_prefixes_dependency_name() {
        let outcome: UpstreamOutcome<Item> = classify(
            &request(Operation::FetchById("abc".into())),
            StatusCode::INTERNAL_SERVER_ERROR,
            "MovieInfo Service Unavailable",
        );
        assert_eq!(
            outcome.unwrap_err(),
            UpstreamError::Server {
                message: "Server Exception in MoviesInfoService MovieInfo Service Unavailable".to_string(),
            }
        );
    }

    #[test]
    fn test_success_decodes_payload() {
        let outcome: UpstreamOutcome<Item> = classify(
            &request(Operation::FetchById("abc".into())),
            StatusCode::OK,
            r#"{"name":"Batman Begins"}"#,
        );
        assert_eq!(outcome.unwrap(), Item { name: "Batman Begins".into() });
    }

    #[test]
    fn test_decode_failure_is_server_error() {
        let outcome: UpstreamOutcome<Item> = classify(
            &request(Operation::FetchById("abc".into())),
            StatusCode::OK,
            "<html>",
        );
        let error = outcome.unwrap_err();
        assert!(error.is_retryable());
        assert!(error.message().starts_with("Server Exception in MoviesInfoService"));
    }
}
