//! Resilient HTTP client for one dependency.
//!
//! # Responsibilities
//! - Issue the outbound GET for single, query and stream calls
//! - Classify the response (see `classify.rs`)
//! - Retry `Server` failures under the configured policy
//! - Record per-dependency metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;

use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::resilience::{retry, RetryPolicy};
use crate::upstream::classify::{classify, server_error};
use crate::upstream::error::UpstreamOutcome;
use crate::upstream::request::{Dependency, Operation, UpstreamRequest};
use crate::upstream::stream::retrying_stream;

/// Build the shared HTTP client.
///
/// Only the connect timeout is set here; the total request timeout is applied
/// per call so long-lived stream calls are not cut off.
pub fn http_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}

/// Client for a single dependency. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    dependency: Arc<Dependency>,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(http: reqwest::Client, dependency: Dependency) -> Self {
        Self {
            http,
            dependency: Arc::new(dependency),
            policy: RetryPolicy::default(),
            request_timeout: Duration::from_secs(TimeoutConfig::default().request_secs),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Fetch one resource by id.
    pub async fn fetch_by_id<T: DeserializeOwned>(&self, id: &str) -> UpstreamOutcome<T> {
        self.call(Operation::FetchById(id.to_string())).await
    }

    /// Fetch every resource whose `field` equals `value`.
    pub async fn fetch_by_query<T: DeserializeOwned>(&self, field: &str, value: &str) -> UpstreamOutcome<Vec<T>> {
        self.call(Operation::FetchByQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
        .await
    }

    /// Follow the dependency's NDJSON stream.
    ///
    /// A retryable failure at any point restarts the request from the start.
    pub fn fetch_stream<T>(&self) -> BoxStream<'static, UpstreamOutcome<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = UpstreamRequest::new(self.dependency.clone(), Operation::FetchStream);
        retrying_stream(self.http.clone(), request, self.policy)
    }

    /// Run one logical call, retrying under the policy.
    pub async fn call<T: DeserializeOwned>(&self, operation: Operation) -> UpstreamOutcome<T> {
        let request = UpstreamRequest::new(self.dependency.clone(), operation);
        let request = &request;
        retry(&self.policy, &self.dependency.name, move |attempt| async move {
            self.call_once(request, attempt).await
        })
        .await
    }

    async fn call_once<T: DeserializeOwned>(&self, request: &UpstreamRequest, attempt: u32) -> UpstreamOutcome<T> {
        let start = Instant::now();
        let url = request.url();
        tracing::debug!(dependency = %self.dependency.name, url = %url, attempt, "Calling upstream");

        let outcome = async {
            let response = self
                .http
                .get(url)
                .timeout(self.request_timeout)
                .send()
                .await
                .map_err(|e| server_error(&self.dependency, e))?;
            let status = response.status();
            if !status.is_success() {
                tracing::info!(dependency = %self.dependency.name, status = status.as_u16(), "Status code is not success");
            }
            let body = response
                .text()
                .await
                .map_err(|e| server_error(&self.dependency, e))?;
            classify(request, status, &body)
        }
        .await;

        metrics::record_upstream_call(&self.dependency.name, &outcome, start);
        if let Err(error) = &outcome {
            tracing::warn!(dependency = %self.dependency.name, attempt, kind = error.kind(), error = %error, "Upstream call failed");
        }
        outcome
    }
}
