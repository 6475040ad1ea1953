//! Composite movie reads.
//!
//! The primary dependency defines existence: its failure, of either kind,
//! fails the whole read and the secondary is never called. The secondary is
//! enrichment: any failure degrades to an empty review list.

use futures_util::stream::BoxStream;

use crate::aggregation::sources::{MovieInfoSource, ReviewSource};
use crate::domain::{Movie, MovieInfo};
use crate::upstream::UpstreamOutcome;

pub struct MoviesOrchestrator<I, R> {
    movies_info: I,
    reviews: R,
}

impl<I, R> MoviesOrchestrator<I, R>
where
    I: MovieInfoSource,
    R: ReviewSource,
{
    pub fn new(movies_info: I, reviews: R) -> Self {
        Self { movies_info, reviews }
    }

    /// Movie info for `movie_id` joined with its reviews.
    pub async fn composite(&self, movie_id: &str) -> UpstreamOutcome<Movie> {
        let movie_info = self.movies_info.movie_info(movie_id).await?;

        let review_list = match self.reviews.reviews(movie_id).await {
            Ok(reviews) => reviews,
            Err(error) => {
                tracing::warn!(
                    movie_id,
                    kind = error.kind(),
                    error = %error,
                    "Reviews unavailable, returning movie without reviews"
                );
                Vec::new()
            }
        };

        Ok(Movie {
            movie_info,
            review_list,
        })
    }

    /// Pass-through of the movie-info live stream.
    pub fn stream(&self) -> BoxStream<'static, UpstreamOutcome<MovieInfo>> {
        self.movies_info.movie_info_stream()
    }
}
