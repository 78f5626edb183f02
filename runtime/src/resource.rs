//! Async driver around `ResourceState`.
//!
//! # Design
//! `Resource` pairs a zero-argument fetcher with the core loading state.
//! `refetch` takes a ticket, awaits the fetcher with no lock held, then hands
//! the result back to the state, which drops it if a newer refetch started
//! in the meantime or the owner unmounted. Clones share one state, so a
//! screen can fire refetches from several event handlers.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use watchlist_core::{ApiError, Completion, FetchTicket, ResourceSnapshot, ResourceState};

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

pub struct Resource<T> {
    state: Arc<Mutex<ResourceState<T>>>,
    fetcher: Fetcher<T>,
    auto_fetch: bool,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fetcher: Arc::clone(&self.fetcher),
            auto_fetch: self.auto_fetch,
        }
    }
}

impl<T: Send + 'static> Resource<T> {
    pub fn new<F, Fut>(fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(ResourceState::new())),
            fetcher: Arc::new(move || fetcher().boxed()),
            auto_fetch: true,
        }
    }

    /// Whether `mount` should fetch. Defaults to true.
    pub fn with_auto_fetch(mut self, enabled: bool) -> Self {
        self.auto_fetch = enabled;
        self
    }

    /// Fetch once on mount if the trigger condition holds.
    pub async fn mount(&self) -> Option<Completion> {
        if self.auto_fetch {
            Some(self.refetch().await)
        } else {
            None
        }
    }

    /// Run the fetcher and apply its result if it is still the latest.
    ///
    /// Does nothing after `unmount`. Dropping the returned future before it
    /// resolves abandons the fetch, so loading never sticks.
    pub async fn refetch(&self) -> Completion {
        let ticket = {
            let mut state = self.state.lock();
            if !state.is_mounted() {
                return Completion::Detached;
            }
            state.begin()
        };
        let mut pending = PendingFetch {
            state: &self.state,
            ticket: Some(ticket),
        };
        let result = (self.fetcher)().await;
        pending.ticket = None;
        self.state.lock().complete(ticket, result)
    }

    pub fn unmount(&self) {
        self.state.lock().unmount();
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    /// Read the state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ResourceState<T>) -> R) -> R {
        f(&self.state.lock())
    }
}

/// Abandons its ticket on drop unless the fetch completed first.
struct PendingFetch<'a, T> {
    state: &'a Mutex<ResourceState<T>>,
    ticket: Option<FetchTicket>,
}

impl<T> Drop for PendingFetch<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.state.lock().abandon(ticket);
        }
    }
}

impl<T: Clone + Send + 'static> Resource<T> {
    pub fn snapshot(&self) -> ResourceSnapshot<T> {
        self.state.lock().snapshot()
    }

    pub fn data(&self) -> Option<T> {
        self.state.lock().data().cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use futures::poll;
    use tokio::sync::oneshot;

    use super::*;

    type Reply = oneshot::Sender<Result<&'static str, ApiError>>;

    /// A resource whose fetches resolve only when the test says so.
    fn scripted(count: usize) -> (Resource<&'static str>, Vec<Reply>) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let receivers = Arc::new(Mutex::new(receivers));
        let resource = Resource::new(move || {
            let rx = receivers.lock().pop_front();
            async move {
                match rx {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(ApiError::NetworkFailure("dropped".to_string()))),
                    None => Err(ApiError::NetworkFailure("no scripted reply".to_string())),
                }
            }
        });
        (resource, senders)
    }

    #[tokio::test]
    async fn refetch_applies_result() {
        let resource = Resource::new(|| async { Ok::<_, ApiError>(5) });
        assert_eq!(resource.refetch().await, Completion::Applied);
        assert_eq!(resource.data(), Some(5));
        assert!(!resource.is_loading());
    }

    #[tokio::test]
    async fn later_refetch_wins_when_earlier_resolves_first() {
        let (resource, mut replies) = scripted(2);
        let reply_b = replies.pop().unwrap();
        let reply_a = replies.pop().unwrap();

        let mut a = Box::pin(resource.refetch());
        assert!(poll!(&mut a).is_pending());
        let mut b = Box::pin(resource.refetch());
        assert!(poll!(&mut b).is_pending());

        reply_a.send(Ok("A")).unwrap();
        assert_eq!(a.await, Completion::Superseded);
        assert!(resource.is_loading());
        assert_eq!(resource.data(), None);

        reply_b.send(Ok("B")).unwrap();
        assert_eq!(b.await, Completion::Applied);
        assert_eq!(resource.data(), Some("B"));
    }

    #[tokio::test]
    async fn slow_earlier_refetch_cannot_overwrite() {
        let (resource, mut replies) = scripted(2);
        let reply_b = replies.pop().unwrap();
        let reply_a = replies.pop().unwrap();

        let mut a = Box::pin(resource.refetch());
        assert!(poll!(&mut a).is_pending());
        let mut b = Box::pin(resource.refetch());
        assert!(poll!(&mut b).is_pending());

        reply_b.send(Ok("B")).unwrap();
        assert_eq!(b.await, Completion::Applied);
        reply_a.send(Ok("A")).unwrap();
        assert_eq!(a.await, Completion::Superseded);
        assert_eq!(resource.data(), Some("B"));
    }

    #[tokio::test]
    async fn failure_keeps_previous_data() {
        let (resource, mut replies) = scripted(2);
        let second = replies.pop().unwrap();
        let first = replies.pop().unwrap();

        first.send(Ok("old")).unwrap();
        resource.refetch().await;
        second
            .send(Err(ApiError::RemoteRejection {
                status: 500,
                message: "db error".to_string(),
            }))
            .unwrap();
        resource.refetch().await;

        let snap = resource.snapshot();
        assert_eq!(snap.data, Some("old"));
        assert_eq!(snap.error.and_then(|e| e.status()), Some(500));
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn result_after_unmount_is_not_applied() {
        let (resource, mut replies) = scripted(1);
        let reply = replies.pop().unwrap();

        let mut fetch = Box::pin(resource.refetch());
        assert!(poll!(&mut fetch).is_pending());
        resource.unmount();
        reply.send(Ok("late")).unwrap();
        assert_eq!(fetch.await, Completion::Detached);
        assert_eq!(resource.data(), None);
    }

    #[tokio::test]
    async fn dropped_refetch_stops_loading() {
        let (resource, mut replies) = scripted(2);
        let second = replies.pop().unwrap();
        let _first = replies.pop().unwrap();

        let mut fetch = Box::pin(resource.refetch());
        assert!(poll!(&mut fetch).is_pending());
        assert!(resource.is_loading());
        drop(fetch);
        assert!(!resource.is_loading());

        second.send(Ok("retry")).unwrap();
        assert_eq!(resource.refetch().await, Completion::Applied);
        assert_eq!(resource.data(), Some("retry"));
    }

    #[tokio::test]
    async fn dropping_superseded_refetch_keeps_newer_loading() {
        let (resource, mut replies) = scripted(2);
        let reply_b = replies.pop().unwrap();
        let _reply_a = replies.pop().unwrap();

        let mut a = Box::pin(resource.refetch());
        assert!(poll!(&mut a).is_pending());
        let mut b = Box::pin(resource.refetch());
        assert!(poll!(&mut b).is_pending());
        drop(a);
        assert!(resource.is_loading());

        reply_b.send(Ok("B")).unwrap();
        assert_eq!(b.await, Completion::Applied);
    }

    #[tokio::test]
    async fn refetch_after_unmount_skips_fetcher() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let resource = Resource::new(move || {
            *counter.lock() += 1;
            async { Ok::<_, ApiError>(1) }
        });
        resource.unmount();
        assert_eq!(resource.refetch().await, Completion::Detached);
        assert_eq!(*calls.lock(), 0);
        assert!(!resource.is_loading());
    }

    #[tokio::test]
    async fn mount_respects_trigger() {
        let resource = Resource::new(|| async { Ok::<_, ApiError>(1) }).with_auto_fetch(false);
        assert_eq!(resource.mount().await, None);
        assert_eq!(resource.data(), None);

        let resource = Resource::new(|| async { Ok::<_, ApiError>(1) });
        assert_eq!(resource.mount().await, Some(Completion::Applied));
    }
}
