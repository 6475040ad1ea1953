//! Movie-info service handlers (`/v1/movieinfos`).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::broadcast::BroadcastChannel;
use crate::domain::MovieInfo;
use crate::http::response::{ndjson, ApiError};
use crate::lifecycle::Shutdown;
use crate::store::Repository;

#[derive(Clone)]
pub struct MovieInfoState {
    pub repository: Arc<dyn Repository<MovieInfo>>,
    pub channel: BroadcastChannel<MovieInfo>,
    pub shutdown: Shutdown,
}

pub fn routes(state: MovieInfoState) -> Router {
    Router::new()
        .route("/v1/movieinfos", get(list).post(create))
        .route("/v1/movieinfos/stream", get(stream))
        .route("/v1/movieinfos/{id}", get(fetch).put(update).delete(remove))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct MovieInfoFilter {
    year: Option<i32>,
    name: Option<String>,
}

/// All movie infos; `year` wins over `name` when both are given.
async fn list(
    State(state): State<MovieInfoState>,
    Query(filter): Query<MovieInfoFilter>,
) -> Result<Json<Vec<MovieInfo>>, ApiError> {
    let infos = match (filter.year, filter.name) {
        (Some(year), _) => state.repository.find_by(&|info: &MovieInfo| info.year == Some(year))?,
        (None, Some(name)) => state.repository.find_by(&|info: &MovieInfo| info.name == name)?,
        (None, None) => state.repository.find_all()?,
    };
    Ok(Json(infos))
}

async fn fetch(State(state): State<MovieInfoState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    Ok(match state.repository.find_by_id(&id)? {
        Some(info) => Json(info).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// Live NDJSON feed: the latest movie info, then every later addition.
async fn stream(State(state): State<MovieInfoState>) -> Response {
    ndjson(state.channel.subscribe(), &state.shutdown)
}

/// Store a new movie info and publish it to live subscribers.
async fn create(
    State(state): State<MovieInfoState>,
    Json(info): Json<MovieInfo>,
) -> Result<(StatusCode, Json<MovieInfo>), ApiError> {
    ApiError::check(info.violations())?;

    let saved = state.repository.save(info)?;
    tracing::info!(movie_info_id = saved.movie_info_id.as_deref(), name = %saved.name, "Movie info added");
    state.channel.publish(saved.clone());

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update(
    State(state): State<MovieInfoState>,
    Path(id): Path<String>,
    Json(changes): Json<MovieInfo>,
) -> Result<Response, ApiError> {
    ApiError::check(changes.violations())?;

    let Some(mut existing) = state.repository.find_by_id(&id)? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    existing.apply(changes);
    let saved = state.repository.save(existing)?;
    Ok(Json(saved).into_response())
}

async fn remove(State(state): State<MovieInfoState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let removed = state.repository.delete_by_id(&id)?;
    tracing::debug!(movie_info_id = %id, removed, "Movie info delete");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRepository;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn state() -> MovieInfoState {
        MovieInfoState {
            repository: Arc::new(InMemoryRepository::new()),
            channel: BroadcastChannel::new(16),
            shutdown: Shutdown::new(),
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_publishes_saved_record() {
        let state = state();
        let app = routes(state.clone());

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/movieinfos",
                serde_json::json!({"name": "Batman Begins", "year": 2005, "cast": ["Christian Bale"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert!(created["movieInfoId"].is_string());

        let latest = state.channel.latest().unwrap();
        assert_eq!(latest.movie_info_id.as_deref(), created["movieInfoId"].as_str());
    }

    #[tokio::test]
    async fn test_invalid_body_rejected_without_publish() {
        let state = state();
        let response = routes(state.clone())
            .oneshot(json_request(
                "POST",
                "/v1/movieinfos",
                serde_json::json!({"name": "", "year": -2005, "cast": [""]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &bytes[..],
            b"movieInfo.cast must be present,movieInfo.name must be present,movieInfo.year must be a Positive value"
        );
        assert!(state.channel.latest().is_none());
    }

    #[tokio::test]
    async fn test_invalid_update_rejected() {
        let state = state();
        let saved = state.repository.save(MovieInfo::new("Batman Begins", 2005)).unwrap();
        let id = saved.movie_info_id.clone().unwrap();

        let response = routes(state.clone())
            .oneshot(json_request(
                "PUT",
                &format!("/v1/movieinfos/{id}"),
                serde_json::json!({"name": "", "year": -2005, "cast": [""]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &bytes[..],
            b"movieInfo.cast must be present,movieInfo.name must be present,movieInfo.year must be a Positive value"
        );
        assert_eq!(state.repository.find_by_id(&id).unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_missing_name_is_a_violation() {
        let state = state();
        let response = routes(state.clone())
            .oneshot(json_request("POST", "/v1/movieinfos", serde_json::json!({"year": 2005})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"movieInfo.name must be present");
        assert!(state.repository.find_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_year_filter_and_missing_id() {
        let state = state();
        state.repository.save(MovieInfo::new("Batman Begins", 2005)).unwrap();
        state.repository.save(MovieInfo::new("The Dark Knight", 2008)).unwrap();

        let response = routes(state.clone())
            .oneshot(Request::get("/v1/movieinfos?year=2008&name=Batman%20Begins").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let infos = body_json(response).await;
        assert_eq!(infos.as_array().unwrap().len(), 1);
        assert_eq!(infos[0]["name"], "The Dark Knight");

        let response = routes(state)
            .oneshot(Request::get("/v1/movieinfos/def").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_does_not_publish() {
        let state = state();
        let saved = state.repository.save(MovieInfo::new("Batman Begins", 2005)).unwrap();
        let id = saved.movie_info_id.unwrap();

        let response = routes(state.clone())
            .oneshot(json_request(
                "PUT",
                &format!("/v1/movieinfos/{id}"),
                serde_json::json!({"name": "Batman Begins 1", "year": 2005}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "Batman Begins 1");
        assert!(state.channel.latest().is_none());
    }
}
