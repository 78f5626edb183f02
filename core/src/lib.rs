//! Synchronous client core for the movie watchlist.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and holds the two pieces of
//! client state the screens share a contract on: the loading lifecycle of a
//! fetch (`ResourceState`) and the saved/not-saved toggle of one movie
//! (`MembershipToggle`).
//!
//! # Design
//! - `WatchlistClient` and `MovieClient` are stateless; they hold only a
//!   base URL (and the provider token).
//! - Each remote operation is split into `build_*` and `parse_*`, so the
//!   I/O boundary is explicit and the host decides how to execute it.
//! - State machines take results, never futures: the async runtime crate
//!   and the C shell drive them the same way.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod collection;
pub mod error;
pub mod http;
pub mod membership;
pub mod metadata;
pub mod notify;
pub mod resource;
pub mod types;

pub use client::WatchlistClient;
pub use collection::CollectionView;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use membership::{CheckTicket, MembershipState, MembershipToggle, Mutation};
pub use metadata::{MovieClient, MovieDetails};
pub use notify::{Notification, NotificationKind};
pub use resource::{Completion, FetchTicket, Phase, ResourceSnapshot, ResourceState};
pub use types::{
    LoginRequest, MovieId, MovieSummary, RemoveMovie, SaveMovie, Session, UserId, WatchlistEntry,
};
