//! Screen-level consumers of the drivers.
//!
//! Each screen owns its resources privately. The list screen learns about
//! saves made elsewhere only by refetching when it regains focus.

use watchlist_core::{
    CollectionView, Completion, MovieDetails, MovieId, Notification, Session, WatchlistEntry,
};

use crate::resource::Resource;
use crate::service::{MetadataService, WatchlistService};
use crate::toggle::SavedToggle;
use crate::transport::Transport;

/// The saved-movies grid.
pub struct WatchlistScreen {
    entries: Resource<Vec<WatchlistEntry>>,
}

impl WatchlistScreen {
    pub fn new<T: Transport + 'static>(service: WatchlistService<T>, session: Session) -> Self {
        let entries = Resource::new(move || {
            let service = service.clone();
            let session = session.clone();
            async move { service.list(&session).await }
        });
        Self { entries }
    }

    /// Pull the list again. Called on every focus, not only the first.
    pub async fn on_focus(&self) -> Completion {
        self.entries.refetch().await
    }

    pub fn view(&self) -> CollectionView {
        self.entries.with_state(CollectionView::from_resource)
    }

    pub fn entries(&self) -> &Resource<Vec<WatchlistEntry>> {
        &self.entries
    }

    pub fn unmount(&self) {
        self.entries.unmount();
    }
}

/// Movie detail with the save/remove button.
pub struct DetailScreen<T> {
    movie: Resource<MovieDetails>,
    saved: SavedToggle,
    watchlist: WatchlistService<T>,
    session: Session,
}

impl<T: Transport + 'static> DetailScreen<T> {
    pub fn new(
        metadata: MetadataService<T>,
        watchlist: WatchlistService<T>,
        session: Session,
        movie_id: MovieId,
    ) -> Self {
        let movie = Resource::new(move || {
            let metadata = metadata.clone();
            async move { metadata.movie_details(movie_id).await }
        });
        Self {
            movie,
            saved: SavedToggle::new(movie_id),
            watchlist,
            session,
        }
    }

    /// Load the movie, then seed the toggle with the server's answer.
    pub async fn mount(&self) {
        if self.movie.refetch().await != Completion::Applied {
            return;
        }
        if self.movie.with_state(|s| s.data().is_some()) {
            self.saved.check_status(&self.watchlist, &self.session).await;
        }
    }

    /// Handle a tap on the save/remove button. `None` when the movie is not
    /// loaded yet or a request is already in flight.
    pub async fn toggle(&self) -> Option<Notification> {
        let summary = self.movie.with_state(|s| s.data().map(MovieDetails::summary))?;
        self.saved.toggle(&self.watchlist, &self.session, &summary).await
    }

    pub fn movie(&self) -> Option<MovieDetails> {
        self.movie.data()
    }

    pub fn saved(&self) -> &SavedToggle {
        &self.saved
    }

    pub fn unmount(&self) {
        self.movie.unmount();
        self.saved.unmount();
    }
}
