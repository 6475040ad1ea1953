//! Movies (aggregator) service handlers (`/v1/movies`).

use std::future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::StreamExt;

use crate::aggregation::{MoviesInfoClient, MoviesOrchestrator, ReviewsClient};
use crate::domain::Movie;
use crate::http::response::{ndjson, ApiError};
use crate::lifecycle::Shutdown;

pub type Orchestrator = MoviesOrchestrator<MoviesInfoClient, ReviewsClient>;

#[derive(Clone)]
pub struct MoviesState {
    pub orchestrator: Arc<Orchestrator>,
    pub shutdown: Shutdown,
}

pub fn routes(state: MoviesState) -> Router {
    Router::new()
        .route("/v1/movies/stream", get(stream))
        .route("/v1/movies/{id}", get(composite))
        .with_state(state)
}

async fn composite(State(state): State<MoviesState>, Path(id): Path<String>) -> Result<Json<Movie>, ApiError> {
    Ok(Json(state.orchestrator.composite(&id).await?))
}

/// Movie-info live stream passed through; ends when the dependency gives up.
async fn stream(State(state): State<MoviesState>) -> Response {
    let infos = state.orchestrator.stream().scan((), |_, item| {
        future::ready(match item {
            Ok(info) => Some(info),
            Err(error) => {
                tracing::warn!(kind = error.kind(), error = %error, "Movie info stream ended");
                None
            }
        })
    });
    ndjson(infos, &state.shutdown)
}
