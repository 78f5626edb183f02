//! Async driver around `MembershipToggle`.

use std::sync::Arc;

use parking_lot::Mutex;
use watchlist_core::{
    ApiError, CheckTicket, MembershipState, MembershipToggle, MovieId, MovieSummary, Mutation,
    Notification, Session,
};

use crate::service::WatchlistService;
use crate::transport::Transport;

/// Shared handle to one movie's membership toggle.
///
/// The lock is only taken for state transitions, never across a request,
/// so a second `toggle` issued while the first is in flight sees the
/// in-flight state and returns without touching the network. Dropping a
/// `check_status` or `toggle` future before it resolves abandons the
/// request and restores the state it started from.
#[derive(Clone)]
pub struct SavedToggle {
    movie_id: MovieId,
    state: Arc<Mutex<MembershipToggle>>,
}

impl SavedToggle {
    pub fn new(movie_id: MovieId) -> Self {
        Self {
            movie_id,
            state: Arc::new(Mutex::new(MembershipToggle::new(movie_id))),
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    /// Ask the server whether the movie is saved. Returns whether the
    /// answer was applied.
    pub async fn check_status<T: Transport>(
        &self,
        service: &WatchlistService<T>,
        session: &Session,
    ) -> bool {
        let ticket = self.state.lock().begin_check();
        let Some(ticket) = ticket else {
            return false;
        };
        let mut pending = InFlight {
            state: &self.state,
            abandon: Some(Abandon::Check(ticket)),
        };
        let result = service.check(session, self.movie_id).await;
        pending.abandon = None;
        self.state.lock().finish_check(ticket, result)
    }

    /// Save or remove depending on the confirmed state.
    ///
    /// Returns `None` without any request when a check or mutation is
    /// already in flight.
    pub async fn toggle<T: Transport>(
        &self,
        service: &WatchlistService<T>,
        session: &Session,
        movie: &MovieSummary,
    ) -> Option<Notification> {
        let mutation = self.state.lock().begin_toggle();
        let mutation = mutation?;
        let mut pending = InFlight {
            state: &self.state,
            abandon: Some(Abandon::Toggle(mutation)),
        };
        let result = match mutation {
            Mutation::Save => service.save(session, movie).await,
            Mutation::Remove => service.remove(session, movie.id).await,
        };
        pending.abandon = None;
        self.state.lock().finish_toggle(mutation, result)
    }

    pub fn is_saved(&self) -> bool {
        self.state.lock().is_saved()
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().is_saving()
    }

    /// The failure behind the current state, until the next success.
    pub fn last_error(&self) -> Option<ApiError> {
        self.state.lock().last_error().cloned()
    }

    pub fn state(&self) -> MembershipState {
        self.state.lock().state()
    }

    pub fn label(&self) -> &'static str {
        self.state.lock().label()
    }

    pub fn unmount(&self) {
        self.state.lock().unmount();
    }
}

enum Abandon {
    Check(CheckTicket),
    Toggle(Mutation),
}

/// Undoes the in-flight transition on drop unless the request finished.
struct InFlight<'a> {
    state: &'a Mutex<MembershipToggle>,
    abandon: Option<Abandon>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        match self.abandon.take() {
            Some(Abandon::Check(ticket)) => {
                self.state.lock().abandon_check(ticket);
            }
            Some(Abandon::Toggle(mutation)) => {
                self.state.lock().abandon_toggle(mutation);
            }
            None => {}
        }
    }
}
