//! Reviews service handlers (`/v1/reviews`).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::domain::Review;
use crate::http::response::ApiError;
use crate::store::Repository;

#[derive(Clone)]
pub struct ReviewState {
    pub repository: Arc<dyn Repository<Review>>,
}

pub fn routes(state: ReviewState) -> Router {
    Router::new()
        .route("/v1/reviews", get(list).post(create))
        .route("/v1/reviews/{id}", put(update).delete(remove))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewFilter {
    movie_info_id: Option<String>,
}

/// Fields a review update may change.
#[derive(Debug, Deserialize)]
struct ReviewChanges {
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
}

async fn list(
    State(state): State<ReviewState>,
    Query(filter): Query<ReviewFilter>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = match filter.movie_info_id {
        Some(movie_info_id) => state
            .repository
            .find_by(&|review: &Review| review.movie_info_id == movie_info_id)?,
        None => state.repository.find_all()?,
    };
    Ok(Json(reviews))
}

async fn create(
    State(state): State<ReviewState>,
    Json(review): Json<Review>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    ApiError::check(review.violations())?;

    let saved = state.repository.save(review)?;
    tracing::info!(
        review_id = saved.review_id.as_deref(),
        movie_info_id = %saved.movie_info_id,
        "Review added"
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update(
    State(state): State<ReviewState>,
    Path(id): Path<String>,
    Json(changes): Json<ReviewChanges>,
) -> Result<Json<Review>, ApiError> {
    let mut review = state
        .repository
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("Review not found for the given Review id : {id}")))?;

    review.comment = changes.comment;
    review.rating = changes.rating;
    Ok(Json(state.repository.save(review)?))
}

async fn remove(State(state): State<ReviewState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.repository.delete_by_id(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
