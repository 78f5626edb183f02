//! Per-movie watchlist membership state machine.
//!
//! # Design
//! `MembershipToggle` records what the server last *confirmed* about one
//! movie. It never flips speculatively: a mutation moves it into `Saving`
//! or `Removing`, and only the matching success commits the new value.
//! A failure puts back the state the mutation started from.
//!
//! ```text
//! Unknown -> Checking -> Saved | NotSaved
//! NotSaved -> Saving   -> Saved    (ok) | NotSaved (err)
//! Saved    -> Removing -> NotSaved (ok) | Saved    (err)
//! ```
//!
//! While a check or mutation is outstanding `begin_toggle` returns `None`,
//! which is how repeated taps are collapsed into a single request. A host
//! that drops a request without a result calls `abandon_check` or
//! `abandon_toggle` so the toggle never stays busy.

use crate::error::ApiError;
use crate::notify::Notification;
use crate::types::MovieId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    Unknown,
    Checking,
    Saved,
    NotSaved,
    Saving,
    Removing,
}

/// The remote call a toggle requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Save,
    Remove,
}

/// Identifies one membership check; only the latest may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
    generation: u64,
}

impl CheckTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct MembershipToggle {
    movie_id: MovieId,
    state: MembershipState,
    check_generation: u64,
    last_error: Option<ApiError>,
    mounted: bool,
}

impl MembershipToggle {
    pub fn new(movie_id: MovieId) -> Self {
        Self {
            movie_id,
            state: MembershipState::Unknown,
            check_generation: 0,
            last_error: None,
            mounted: true,
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    pub fn state(&self) -> MembershipState {
        self.state
    }

    /// Last server-confirmed membership.
    pub fn is_saved(&self) -> bool {
        matches!(self.state, MembershipState::Saved | MembershipState::Removing)
    }

    /// True while a save or remove is in flight.
    pub fn is_saving(&self) -> bool {
        matches!(self.state, MembershipState::Saving | MembershipState::Removing)
    }

    /// The failure behind the current state, if any. Cleared by the next
    /// successful check or mutation.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Text for the toggle button.
    pub fn label(&self) -> &'static str {
        match self.state {
            MembershipState::Saving => "Saving...",
            MembershipState::Removing => "Removing...",
            MembershipState::Saved => "Remove",
            _ => "Save",
        }
    }

    /// Start a membership check. Returns `None` while a mutation is in
    /// flight or after unmount.
    pub fn begin_check(&mut self) -> Option<CheckTicket> {
        if !self.mounted || self.is_saving() {
            return None;
        }
        self.check_generation += 1;
        self.state = MembershipState::Checking;
        Some(CheckTicket {
            generation: self.check_generation,
        })
    }

    /// Apply a check result. Any failure lands in `NotSaved`: the toggle
    /// never reports "saved" on uncertain information.
    ///
    /// Returns whether the result was applied.
    pub fn finish_check(&mut self, ticket: CheckTicket, result: Result<bool, ApiError>) -> bool {
        if !self.mounted
            || self.state != MembershipState::Checking
            || ticket.generation != self.check_generation
        {
            tracing::debug!(movie_id = self.movie_id, "dropping stale membership check");
            return false;
        }
        if result.is_ok() {
            self.last_error = None;
        }
        self.state = match result {
            Ok(true) => MembershipState::Saved,
            Ok(false) => MembershipState::NotSaved,
            Err(err) => {
                tracing::warn!(movie_id = self.movie_id, error = %err, "membership check failed");
                self.last_error = Some(err);
                MembershipState::NotSaved
            }
        };
        true
    }

    /// Decide which mutation a tap requires and enter the matching
    /// in-flight state.
    ///
    /// `Unknown` is treated as not saved, matching what the screen shows
    /// before any check. Returns `None` while checking, while a mutation
    /// is already in flight, or after unmount.
    pub fn begin_toggle(&mut self) -> Option<Mutation> {
        if !self.mounted {
            return None;
        }
        let mutation = match self.state {
            MembershipState::Unknown | MembershipState::NotSaved => Mutation::Save,
            MembershipState::Saved => Mutation::Remove,
            MembershipState::Checking | MembershipState::Saving | MembershipState::Removing => {
                tracing::debug!(movie_id = self.movie_id, state = ?self.state, "toggle ignored");
                return None;
            }
        };
        self.state = match mutation {
            Mutation::Save => MembershipState::Saving,
            Mutation::Remove => MembershipState::Removing,
        };
        Some(mutation)
    }

    /// Resolve the mutation started by `begin_toggle`.
    ///
    /// Returns the notification to show, or `None` when the toggle was
    /// unmounted or `mutation` is not the one in flight.
    pub fn finish_toggle(
        &mut self,
        mutation: Mutation,
        result: Result<String, ApiError>,
    ) -> Option<Notification> {
        if !self.mounted {
            tracing::debug!(movie_id = self.movie_id, "mutation finished after unmount");
            return None;
        }
        let (next, notification) = match (mutation, self.state, result) {
            (Mutation::Save, MembershipState::Saving, Ok(message)) => {
                self.last_error = None;
                (MembershipState::Saved, Notification::saved(message))
            }
            (Mutation::Save, MembershipState::Saving, Err(err)) => {
                tracing::warn!(movie_id = self.movie_id, error = %err, "save failed");
                let notification = Notification::save_failed(&err);
                self.last_error = Some(err);
                (MembershipState::NotSaved, notification)
            }
            (Mutation::Remove, MembershipState::Removing, Ok(message)) => {
                self.last_error = None;
                (MembershipState::NotSaved, Notification::removed(message))
            }
            (Mutation::Remove, MembershipState::Removing, Err(err)) => {
                tracing::warn!(movie_id = self.movie_id, error = %err, "remove failed");
                let notification = Notification::remove_failed(&err);
                self.last_error = Some(err);
                (MembershipState::Saved, notification)
            }
            (mutation, state, _) => {
                tracing::debug!(movie_id = self.movie_id, ?mutation, ?state, "unexpected mutation result");
                return None;
            }
        };
        self.state = next;
        Some(notification)
    }

    /// Give up on a check whose result will never arrive. The state falls
    /// back to `NotSaved`, as for a failed check, if `ticket` is still the
    /// latest. Returns whether anything changed.
    pub fn abandon_check(&mut self, ticket: CheckTicket) -> bool {
        if self.state != MembershipState::Checking || ticket.generation != self.check_generation {
            return false;
        }
        tracing::debug!(movie_id = self.movie_id, "membership check abandoned");
        self.state = MembershipState::NotSaved;
        true
    }

    /// Give up on an in-flight mutation without a result. The state the
    /// mutation started from is restored and no notification is raised.
    /// Returns whether anything changed.
    pub fn abandon_toggle(&mut self, mutation: Mutation) -> bool {
        self.state = match (mutation, self.state) {
            (Mutation::Save, MembershipState::Saving) => MembershipState::NotSaved,
            (Mutation::Remove, MembershipState::Removing) => MembershipState::Saved,
            _ => return false,
        };
        tracing::debug!(movie_id = self.movie_id, ?mutation, "mutation abandoned");
        true
    }

    /// Detach from the owning screen. Later results change nothing.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}
