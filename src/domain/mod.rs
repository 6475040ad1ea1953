//! Records exchanged between the movie services.
//!
//! Field names follow the JSON the services speak (camelCase).

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Movie metadata owned by the movie-info service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_info_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub cast: Vec<String>,
    /// ISO-8601 date, e.g. "2005-06-15".
    #[serde(default, rename = "release_date")]
    pub release_date: Option<String>,
}

impl MovieInfo {
    pub fn new(name: &str, year: i32) -> Self {
        Self {
            movie_info_id: None,
            name: name.to_string(),
            year: Some(year),
            cast: Vec::new(),
            release_date: None,
        }
    }

    /// Constraint violations, sorted, empty when the record is acceptable.
    pub fn violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();
        if self.cast.iter().any(|member| member.trim().is_empty()) {
            violations.push("movieInfo.cast must be present");
        }
        if self.name.trim().is_empty() {
            violations.push("movieInfo.name must be present");
        }
        if !self.year.is_some_and(|year| year > 0) {
            violations.push("movieInfo.year must be a Positive value");
        }
        violations
    }

    /// Copy every field except the id from `other`.
    pub fn apply(&mut self, other: MovieInfo) {
        self.name = other.name;
        self.year = other.year;
        self.cast = other.cast;
        self.release_date = other.release_date;
    }
}

impl Document for MovieInfo {
    fn id(&self) -> Option<&str> {
        self.movie_info_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.movie_info_id = Some(id);
    }
}

/// A review of a movie, owned by the reviews service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(default)]
    pub movie_info_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Review {
    pub fn new(movie_info_id: &str, comment: &str, rating: f64) -> Self {
        Self {
            review_id: None,
            movie_info_id: movie_info_id.to_string(),
            comment: Some(comment.to_string()),
            rating: Some(rating),
        }
    }

    pub fn violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();
        if self.movie_info_id.trim().is_empty() {
            violations.push("review.movieInfoId must be present");
        }
        if self.rating.is_some_and(|rating| rating < 0.0) {
            violations.push("review.rating must be a non-negative value");
        }
        violations
    }
}

impl Document for Review {
    fn id(&self) -> Option<&str> {
        self.review_id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.review_id = Some(id);
    }
}

/// Composite resource: movie info plus whatever reviews could be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_info: MovieInfo,
    #[serde(default)]
    pub review_list: Vec<Review>,
}
