//! Stateless HTTP request builder and response parser for the watchlist API.
//!
//! # Design
//! `WatchlistClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.
//!
//! Every watchlist call takes a `Session` so the user identity is always
//! explicit at the call site.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    LoginRequest, LoginResponse, MembershipStatus, MessageResponse, MovieId, MovieSummary,
    RemoveMovie, SaveMovie, Session, WatchlistEntry,
};

/// Synchronous, stateless client for the watchlist API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct WatchlistClient {
    base_url: String,
}

impl WatchlistClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/watchlist/{user_id}`
    pub fn build_list_watchlist(&self, session: &Session) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!(
                "{}/watchlist/{}",
                self.base_url,
                urlencoding::encode(session.user_id.as_str())
            ),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET {base}/watchlist/check?user_id=..&movie_id=..`
    pub fn build_check_status(&self, session: &Session, movie_id: MovieId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!(
                "{}/watchlist/check?user_id={}&movie_id={movie_id}",
                self.base_url,
                urlencoding::encode(session.user_id.as_str())
            ),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `POST {base}/watchlist/save` carrying the full movie summary.
    pub fn build_save_movie(
        &self,
        session: &Session,
        movie: &MovieSummary,
    ) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Post,
            format!("{}/watchlist/save", self.base_url),
            &SaveMovie::new(session, movie),
        )
    }

    /// `DELETE {base}/watchlist/remove` keyed by `(user_id, movie_id)`.
    pub fn build_remove_movie(
        &self,
        session: &Session,
        movie_id: MovieId,
    ) -> Result<HttpRequest, ApiError> {
        let body = RemoveMovie {
            user_id: session.user_id.clone(),
            movie_id,
        };
        json_request(
            HttpMethod::Delete,
            format!("{}/watchlist/remove", self.base_url),
            &body,
        )
    }

    /// `POST {base}/auth/login`
    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, format!("{}/auth/login", self.base_url), input)
    }

    pub fn parse_list_watchlist(&self, response: HttpResponse) -> Result<Vec<WatchlistEntry>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_check_status(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        decode::<MembershipStatus>(&response.body).map(|s| s.saved)
    }

    /// Returns the server's human-readable confirmation.
    pub fn parse_save_movie(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        decode::<MessageResponse>(&response.body).map(|m| m.message)
    }

    /// Returns the server's human-readable confirmation.
    pub fn parse_remove_movie(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        decode::<MessageResponse>(&response.body).map(|m| m.message)
    }

    /// A successful login yields the session used for every later call.
    /// The username doubles as the user identifier.
    pub fn parse_login(&self, response: HttpResponse) -> Result<Session, ApiError> {
        check_status(&response)?;
        let login: LoginResponse = decode(&response.body)?;
        Ok(Session::new(login.user.username))
    }
}

pub(crate) fn json_request<T: Serialize>(
    method: HttpMethod,
    path: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Map a non-2xx status to `RemoteRejection`, lifting the JSON `message`
/// field out of the body when the server sent one.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .map(|b| b.message)
        .unwrap_or_else(|_| response.body.trim().to_string());
    tracing::warn!(status = response.status, %message, "request rejected");
    Err(ApiError::RemoteRejection {
        status: response.status,
        message,
    })
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}
