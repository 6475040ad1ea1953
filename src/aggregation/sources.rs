//! Dependencies the orchestrator composes.

use std::future::Future;
use std::time::Duration;

use futures_util::stream::BoxStream;

use crate::config::ServiceConfig;
use crate::domain::{MovieInfo, Review};
use crate::resilience::RetryPolicy;
use crate::upstream::{Dependency, UpstreamClient, UpstreamOutcome};

/// Mandatory dependency: defines whether a movie exists.
pub trait MovieInfoSource: Send + Sync {
    fn movie_info(&self, movie_id: &str) -> impl Future<Output = UpstreamOutcome<MovieInfo>> + Send;

    /// Live feed of newly added movie infos.
    fn movie_info_stream(&self) -> BoxStream<'static, UpstreamOutcome<MovieInfo>>;
}

/// Enrichment dependency: reviews for a movie.
pub trait ReviewSource: Send + Sync {
    fn reviews(&self, movie_id: &str) -> impl Future<Output = UpstreamOutcome<Vec<Review>>> + Send;
}

fn client(http: reqwest::Client, dependency: Dependency, config: &ServiceConfig) -> UpstreamClient {
    UpstreamClient::new(http, dependency)
        .with_policy(RetryPolicy::from_config(&config.retries))
        .with_timeout(Duration::from_secs(config.timeouts.request_secs))
}

/// HTTP client for the movie-info service.
#[derive(Debug, Clone)]
pub struct MoviesInfoClient {
    client: UpstreamClient,
}

impl MoviesInfoClient {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub fn from_config(http: reqwest::Client, config: &ServiceConfig) -> Result<Self, url::ParseError> {
        let dependency = Dependency::new("MoviesInfoService", "movieInfo", &config.upstream.movies_info_url)?;
        Ok(Self::new(client(http, dependency, config)))
    }
}

impl MovieInfoSource for MoviesInfoClient {
    async fn movie_info(&self, movie_id: &str) -> UpstreamOutcome<MovieInfo> {
        self.client.fetch_by_id(movie_id).await
    }

    fn movie_info_stream(&self) -> BoxStream<'static, UpstreamOutcome<MovieInfo>> {
        self.client.fetch_stream()
    }
}

/// HTTP client for the reviews service.
#[derive(Debug, Clone)]
pub struct ReviewsClient {
    client: UpstreamClient,
}

impl ReviewsClient {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub fn from_config(http: reqwest::Client, config: &ServiceConfig) -> Result<Self, url::ParseError> {
        let dependency = Dependency::new("ReviewsService", "review", &config.upstream.reviews_url)?;
        Ok(Self::new(client(http, dependency, config)))
    }
}

impl ReviewSource for ReviewsClient {
    async fn reviews(&self, movie_id: &str) -> UpstreamOutcome<Vec<Review>> {
        self.client.fetch_by_query("movieInfoId", movie_id).await
    }
}
