//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router for one service role
//! - Wire up middleware (request id, tracing, timeout)
//! - Serve on a listener until shutdown

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::aggregation::{MoviesInfoClient, MoviesOrchestrator, ReviewsClient};
use crate::broadcast::BroadcastChannel;
use crate::config::ServiceConfig;
use crate::http::movie_info::{self, MovieInfoState};
use crate::http::movies::{self, MoviesState};
use crate::http::request::request_span;
use crate::http::reviews::{self, ReviewState};
use crate::lifecycle::Shutdown;
use crate::store::InMemoryRepository;
use crate::upstream::http_client;

/// Which service this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    MoviesInfo,
    Reviews,
    Movies,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MoviesInfo => "movies-info",
            Role::Reviews => "reviews",
            Role::Movies => "movies",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

/// HTTP server for one service role.
pub struct HttpServer {
    router: Router,
    role: Role,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Build the role's routes and state from `config`.
    pub fn new(role: Role, config: &ServiceConfig, shutdown: Shutdown) -> Result<Self, ServerError> {
        let routes = match role {
            Role::MoviesInfo => movie_info::routes(MovieInfoState {
                repository: Arc::new(InMemoryRepository::new()),
                channel: BroadcastChannel::new(config.broadcast.channel_capacity),
                shutdown: shutdown.clone(),
            }),
            Role::Reviews => reviews::routes(ReviewState {
                repository: Arc::new(InMemoryRepository::new()),
            }),
            Role::Movies => {
                let http = http_client(&config.timeouts)?;
                let orchestrator = MoviesOrchestrator::new(
                    MoviesInfoClient::from_config(http.clone(), config)?,
                    ReviewsClient::from_config(http, config)?,
                );
                movies::routes(MoviesState {
                    orchestrator: Arc::new(orchestrator),
                    shutdown: shutdown.clone(),
                })
            }
        };

        let router = Self::build_router(config, role, routes);
        Ok(Self { router, role, shutdown })
    }

    /// Add the health route and the middleware stack.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, role: Role, routes: Router) -> Router {
        routes.route("/health", get(move || health(role))).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(inbound_timeout(config, role))),
        )
    }

    /// Serve on `listener` until shutdown is triggered.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, role = %self.role, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(self.shutdown.signalled())
            .await?;

        tracing::info!(role = %self.role, "HTTP server stopped");
        Ok(())
    }
}

/// Deadline for a whole inbound request.
///
/// The movies role waits on two dependencies in turn, each retried with its
/// own per-attempt timeout, so its deadline covers both retry budgets. Upstream
/// failures then surface as classified errors instead of an empty 408.
fn inbound_timeout(config: &ServiceConfig, role: Role) -> Duration {
    let request = Duration::from_secs(config.timeouts.request_secs);
    match role {
        Role::Movies => {
            let attempts = config.retries.max_attempts.max(1);
            // Backoff delays are capped at `max_delay_ms` plus up to 10% jitter.
            let backoff = Duration::from_millis(config.retries.max_delay_ms) * (attempts - 1) * 11 / 10;
            (request * attempts + backoff) * 2 + request
        }
        Role::MoviesInfo | Role::Reviews => request,
    }
}

async fn health(role: Role) -> Json<Value> {
    Json(json!({ "status": "ok", "service": role.as_str() }))
}
