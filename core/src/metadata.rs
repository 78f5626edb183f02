//! Request builder and parser for the movie metadata provider.
//!
//! The provider is a TMDB-compatible REST API. Only the detail lookup is
//! needed: the detail screen shows it and derives the `MovieSummary` that a
//! save sends to the watchlist store.

use serde::{Deserialize, Serialize};

use crate::client::{check_status, decode};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{MovieId, MovieSummary};

#[derive(Debug, Clone)]
pub struct MovieClient {
    base_url: String,
    api_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionCompany {
    pub id: i64,
    pub name: String,
}

/// Full movie record as returned by `GET /movie/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub revenue: i64,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
}

impl MovieDetails {
    /// The subset of fields the watchlist store persists.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            vote_average: self.vote_average,
            release_date: self.release_date.clone(),
        }
    }

    /// Leading year of `release_date`, when the date is present.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }
}

impl MovieClient {
    pub fn new(base_url: &str, api_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// `GET {base}/movie/{id}` with a bearer token.
    pub fn build_movie_details(&self, movie_id: MovieId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/movie/{movie_id}", self.base_url),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                (
                    "authorization".to_string(),
                    format!("Bearer {}", self.api_token),
                ),
            ],
            body: None,
        }
    }

    pub fn parse_movie_details(&self, response: HttpResponse) -> Result<MovieDetails, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }
}
