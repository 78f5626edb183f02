//! Wire DTOs for the watchlist API.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently;
//! the integration tests catch drift between the two crates. Field names
//! follow the server's snake_case JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// TMDB movie identifier.
pub type MovieId = i64;

/// Opaque user identifier read from device storage by the host.
///
/// The core never inspects or validates the contents; it is only copied
/// into paths, query strings and request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit user context passed into every watchlist operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
        }
    }
}

/// One remote-persisted watchlist membership record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Denormalized movie summary carried by a save, since the watchlist
/// store holds no metadata of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: Option<String>,
}

/// Body of `POST /watchlist/save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveMovie {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: Option<String>,
}

impl SaveMovie {
    pub fn new(session: &Session, movie: &MovieSummary) -> Self {
        Self {
            user_id: session.user_id.clone(),
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
            release_date: movie.release_date.clone(),
        }
    }
}

/// Body of `DELETE /watchlist/remove`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveMovie {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

/// Response of `GET /watchlist/check`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipStatus {
    pub saved: bool,
}

/// Success body of the mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginUser {
    pub username: String,
}

/// Success body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}
