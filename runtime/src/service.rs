//! Remote operations as single async calls: build, execute, parse.

use std::sync::Arc;

use watchlist_core::{
    ApiError, LoginRequest, MovieClient, MovieDetails, MovieId, MovieSummary, Session,
    WatchlistClient, WatchlistEntry,
};

use crate::transport::Transport;

/// The watchlist API over a transport. Cheap to clone.
pub struct WatchlistService<T> {
    client: WatchlistClient,
    transport: Arc<T>,
}

impl<T> Clone for WatchlistService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> WatchlistService<T> {
    pub fn new(client: WatchlistClient, transport: Arc<T>) -> Self {
        Self { client, transport }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<WatchlistEntry>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_list_watchlist(session))
            .await?;
        self.client.parse_list_watchlist(response)
    }

    pub async fn check(&self, session: &Session, movie_id: MovieId) -> Result<bool, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_check_status(session, movie_id))
            .await?;
        self.client.parse_check_status(response)
    }

    pub async fn save(&self, session: &Session, movie: &MovieSummary) -> Result<String, ApiError> {
        let request = self.client.build_save_movie(session, movie)?;
        let response = self.transport.execute(request).await?;
        let message = self.client.parse_save_movie(response)?;
        tracing::info!(user_id = %session.user_id, movie_id = movie.id, "movie saved");
        Ok(message)
    }

    pub async fn remove(&self, session: &Session, movie_id: MovieId) -> Result<String, ApiError> {
        let request = self.client.build_remove_movie(session, movie_id)?;
        let response = self.transport.execute(request).await?;
        let message = self.client.parse_remove_movie(response)?;
        tracing::info!(user_id = %session.user_id, movie_id, "movie removed");
        Ok(message)
    }

    pub async fn login(&self, input: &LoginRequest) -> Result<Session, ApiError> {
        let request = self.client.build_login(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_login(response)
    }
}

/// The metadata provider over a transport. Cheap to clone.
pub struct MetadataService<T> {
    client: MovieClient,
    transport: Arc<T>,
}

impl<T> Clone for MetadataService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> MetadataService<T> {
    pub fn new(client: MovieClient, transport: Arc<T>) -> Self {
        Self { client, transport }
    }

    pub async fn movie_details(&self, movie_id: MovieId) -> Result<MovieDetails, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_movie_details(movie_id))
            .await?;
        self.client.parse_movie_details(response)
    }
}
