//! Drivers over reqwest against the mock backend on a random port.

use std::sync::Arc;
use std::time::Duration;

use mock_server::{AppState, Endpoint, Fault};
use watchlist_core::{
    ApiError, CollectionView, LoginRequest, MembershipState, MovieSummary, NotificationKind,
    Session, WatchlistClient,
};
use watchlist_runtime::{
    HttpTransport, RuntimeConfig, SavedToggle, WatchlistScreen, WatchlistService,
};

async fn start_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with_state(listener, state));
    format!("http://{addr}/api")
}

fn service(base: &str, timeout: Duration) -> WatchlistService<HttpTransport> {
    let transport = HttpTransport::new(timeout).unwrap();
    WatchlistService::new(WatchlistClient::new(base), Arc::new(transport))
}

fn movie(id: i64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: None,
        vote_average: 7.5,
        release_date: Some("1999-03-31".to_string()),
    }
}

#[tokio::test]
async fn save_shows_up_on_next_focus() {
    let base = start_server(AppState::default()).await;
    let service = service(&base, Duration::from_secs(5));
    let session = service
        .login(&LoginRequest {
            username: "demo".to_string(),
            password: "demo123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session, Session::new("demo"));

    let screen = WatchlistScreen::new(service.clone(), session.clone());
    screen.on_focus().await;
    assert_eq!(screen.view(), CollectionView::Empty);

    let toggle = SavedToggle::new(603);
    toggle.check_status(&service, &session).await;
    assert_eq!(toggle.state(), MembershipState::NotSaved);
    let notification = toggle
        .toggle(&service, &session, &movie(603, "The Matrix"))
        .await
        .unwrap();
    assert_eq!(notification.message, "Movie saved to watchlist");

    // Not visible until the list screen pulls again.
    assert_eq!(screen.view(), CollectionView::Empty);
    screen.on_focus().await;
    assert_eq!(screen.view().len(), 1);
    assert_eq!(screen.entries().data().unwrap()[0].movie_id, 603);
}

#[tokio::test]
async fn remove_then_refocus_leaves_empty_list() {
    let base = start_server(AppState::default()).await;
    let service = service(&base, Duration::from_secs(5));
    let session = Session::new("demo");
    let toggle = SavedToggle::new(27205);

    toggle
        .toggle(&service, &session, &movie(27205, "Inception"))
        .await
        .unwrap();
    assert!(toggle.is_saved());
    let notification = toggle
        .toggle(&service, &session, &movie(27205, "Inception"))
        .await
        .unwrap();
    assert_eq!(notification.kind, NotificationKind::Removed);

    let screen = WatchlistScreen::new(service, session);
    screen.on_focus().await;
    assert_eq!(screen.view(), CollectionView::Empty);
}

#[tokio::test]
async fn server_error_on_save_reverts() {
    let state = AppState::default();
    let base = start_server(state.clone()).await;
    let service = service(&base, Duration::from_secs(5));
    let session = Session::new("demo");
    state
        .faults
        .inject(
            Endpoint::Save,
            Fault::Reject {
                status: 500,
                message: "db error".to_string(),
            },
        )
        .await;

    let toggle = SavedToggle::new(603);
    let notification = toggle
        .toggle(&service, &session, &movie(603, "The Matrix"))
        .await
        .unwrap();
    assert_eq!(notification.kind, NotificationKind::SaveFailed);
    assert_eq!(notification.message, "Failed to save movie: HTTP 500: db error");
    assert!(!toggle.is_saved());
    assert!(!service.check(&session, 603).await.unwrap());
}

#[tokio::test]
async fn stalled_check_times_out_as_network_failure() {
    let state = AppState::default();
    let base = start_server(state.clone()).await;
    let service = service(&base, Duration::from_millis(200));
    let session = Session::new("demo");
    state
        .faults
        .inject(Endpoint::Check, Fault::Stall(Duration::from_secs(2)))
        .await;

    let err = service.check(&session, 603).await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkFailure(ref m) if m.contains("timed out")));

    state
        .faults
        .inject(Endpoint::Check, Fault::Stall(Duration::from_secs(2)))
        .await;
    let toggle = SavedToggle::new(603);
    assert!(toggle.check_status(&service, &session).await);
    assert_eq!(toggle.state(), MembershipState::NotSaved);
}

#[tokio::test]
async fn unreachable_backend_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = service(&format!("http://{addr}/api"), Duration::from_secs(2));
    let err = service.list(&Session::new("demo")).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn connect_builds_services_from_config() {
    let base = start_server(AppState::default()).await;
    let config = RuntimeConfig::default()
        .with_overrides(|key| (key == "WATCHLIST_API_URL").then(|| base.clone()))
        .unwrap();
    let services = watchlist_runtime::connect(&config).unwrap();
    let entries = services.watchlist.list(&Session::new("demo")).await.unwrap();
    assert!(entries.is_empty());
}
