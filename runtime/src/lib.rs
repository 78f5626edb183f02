//! Async host for `watchlist-core`.
//!
//! # Overview
//! Executes the core's described requests over reqwest and drives its state
//! machines from async code: `Resource` for lazily loaded data, `SavedToggle`
//! for the save/remove button, and the two screens built from them.
//!
//! # Design
//! - `Transport` is the only I/O seam; tests substitute scripted transports.
//! - Drivers hold core state behind a `parking_lot::Mutex` that is never
//!   held across an `.await`, so transitions stay atomic while requests
//!   overlap.
//! - There is no shared client-side cache. Screens stay consistent with
//!   each other only by re-pulling from the server.

pub mod config;
pub mod logging;
pub mod resource;
pub mod screen;
pub mod service;
pub mod toggle;
pub mod transport;

use std::sync::Arc;

use watchlist_core::{ApiError, MovieClient, WatchlistClient};

pub use config::{ConfigError, RuntimeConfig};
pub use resource::Resource;
pub use screen::{DetailScreen, WatchlistScreen};
pub use service::{MetadataService, WatchlistService};
pub use toggle::SavedToggle;
pub use transport::{HttpTransport, Transport};

/// Both remote collaborators sharing one transport.
pub struct Services<T> {
    pub watchlist: WatchlistService<T>,
    pub metadata: MetadataService<T>,
}

impl<T> Clone for Services<T> {
    fn clone(&self) -> Self {
        Self {
            watchlist: self.watchlist.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<T: Transport> Services<T> {
    pub fn new(config: &RuntimeConfig, transport: Arc<T>) -> Self {
        Self {
            watchlist: WatchlistService::new(
                WatchlistClient::new(&config.api_base_url),
                Arc::clone(&transport),
            ),
            metadata: MetadataService::new(
                MovieClient::new(&config.metadata_base_url, &config.metadata_api_token),
                transport,
            ),
        }
    }
}

/// Build services over reqwest with the configured timeout.
pub fn connect(config: &RuntimeConfig) -> Result<Services<HttpTransport>, ApiError> {
    let transport = HttpTransport::new(config.request_timeout())?;
    tracing::info!(api = %config.api_base_url, "watchlist services ready");
    Ok(Services::new(config, Arc::new(transport)))
}
