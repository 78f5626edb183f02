//! Loading lifecycle of one lazily fetched value.
//!
//! # Design
//! `ResourceState` is the I/O-free half of an async resource: the host calls
//! `begin` before issuing the fetch and `complete` with whatever came back.
//! Each `begin` hands out a `FetchTicket` tagged with a strictly increasing
//! generation. Only the ticket of the most recently *initiated* fetch may
//! write; anything older resolves as `Superseded` and is dropped, so a slow
//! early request can never overwrite a faster later one.
//!
//! After `unmount` the resource is detached from its screen and every
//! completion becomes a no-op.

use crate::error::ApiError;

/// Proof that a fetch was started. Pass it back to `ResourceState::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has arrived yet: never fetched, or every fetch so far was
    /// abandoned.
    Idle,
    Loading,
    /// The latest fetch succeeded.
    Ready,
    /// The latest fetch failed. Older data, if any, is still available.
    Failed,
}

/// What `complete` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer fetch was started after this one; the result was dropped.
    Superseded,
    /// The owner unmounted; the result was dropped.
    Detached,
}

/// Point-in-time copy of a resource for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub loading: bool,
}

#[derive(Debug)]
pub struct ResourceState<T> {
    data: Option<T>,
    error: Option<ApiError>,
    issued: u64,
    pending: Option<u64>,
    mounted: bool,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceState<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            error: None,
            issued: 0,
            pending: None,
            mounted: true,
        }
    }

    /// Start a fetch: marks the resource loading and clears the last error.
    /// Any fetch still in flight is superseded by this one.
    ///
    /// After `unmount` the ticket is issued but nothing changes, and its
    /// completion resolves as `Detached`. Hosts should check `is_mounted`
    /// first and skip the request.
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        if !self.mounted {
            return FetchTicket {
                generation: self.issued,
            };
        }
        if let Some(previous) = self.pending.replace(self.issued) {
            tracing::debug!(previous, current = self.issued, "fetch superseded");
        }
        self.error = None;
        FetchTicket {
            generation: self.issued,
        }
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// On failure the previous `data` is kept so a stale list stays on
    /// screen next to the error.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> Completion {
        if !self.mounted {
            tracing::debug!(generation = ticket.generation, "fetch finished after unmount");
            return Completion::Detached;
        }
        if self.pending != Some(ticket.generation) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.issued,
                "dropping superseded fetch result"
            );
            return Completion::Superseded;
        }
        self.pending = None;
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed");
                self.error = Some(err);
            }
        }
        Completion::Applied
    }

    /// Give up on the fetch behind `ticket` without a result, as when the
    /// host drops the request. Loading ends if it was the latest fetch;
    /// data and error are left as they were.
    ///
    /// Returns whether loading was cleared.
    pub fn abandon(&mut self, ticket: FetchTicket) -> bool {
        if self.pending != Some(ticket.generation) {
            return false;
        }
        tracing::debug!(generation = ticket.generation, "fetch abandoned");
        self.pending = None;
        true
    }

    /// Detach from the owning screen. Later completions change nothing.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

impl<T: Clone> ResourceState<T> {
    pub fn snapshot(&self) -> ResourceSnapshot<T> {
        ResourceSnapshot {
            data: self.data.clone(),
            error: self.error.clone(),
            loading: self.is_loading(),
        }
    }
}
