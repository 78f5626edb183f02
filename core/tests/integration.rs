//! Watchlist flows against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the core client and
//! state machines over real HTTP using ureq, the way a blocking host would.

use mock_server::{AppState, Endpoint, Fault};
use watchlist_core::{
    ApiError, CollectionView, HttpMethod, HttpRequest, HttpResponse, LoginRequest,
    MembershipToggle, MovieSummary, Mutation, NotificationKind, ResourceState, Session,
    WatchlistClient,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Delete, Some(body)) => agent
            .delete(&req.path)
            .force_send_body()
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Delete, None) => agent.delete(&req.path).call(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse::new(status, body)
}

/// Start the mock server on a random port and return its API base URL.
fn start_server(state: AppState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

fn movie(id: i64) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {id}"),
        poster_path: Some(format!("/poster{id}.jpg")),
        vote_average: 6.5,
        release_date: Some("2020-01-01".to_string()),
    }
}

/// Check membership the way the detail screen does on mount.
fn check(client: &WatchlistClient, session: &Session, toggle: &mut MembershipToggle) {
    let ticket = toggle.begin_check().unwrap();
    let result = client.parse_check_status(execute(client.build_check_status(session, toggle.movie_id())));
    toggle.finish_check(ticket, result);
}

/// Tap the save/remove button once and wait for the outcome.
fn tap(
    client: &WatchlistClient,
    session: &Session,
    toggle: &mut MembershipToggle,
    movie: &MovieSummary,
) -> Option<watchlist_core::Notification> {
    let mutation = toggle.begin_toggle()?;
    let result = match mutation {
        Mutation::Save => client
            .build_save_movie(session, movie)
            .map(execute)
            .and_then(|r| client.parse_save_movie(r)),
        Mutation::Remove => client
            .build_remove_movie(session, movie.id)
            .map(execute)
            .and_then(|r| client.parse_remove_movie(r)),
    };
    toggle.finish_toggle(mutation, result)
}

/// Refetch the list the way the list screen does on focus.
fn focus(
    client: &WatchlistClient,
    session: &Session,
    list: &mut ResourceState<Vec<watchlist_core::WatchlistEntry>>,
) {
    let ticket = list.begin();
    let result = client.parse_list_watchlist(execute(client.build_list_watchlist(session)));
    list.complete(ticket, result);
}

#[test]
fn watchlist_lifecycle() {
    let client = WatchlistClient::new(&start_server(AppState::default()));

    // Step 1: log in.
    let req = client
        .build_login(&LoginRequest {
            username: "demo".to_string(),
            password: "demo123".to_string(),
        })
        .unwrap();
    let session = client.parse_login(execute(req)).unwrap();
    assert_eq!(session.user_id.as_str(), "demo");

    // Step 2: list, should be empty.
    let entries = client
        .parse_list_watchlist(execute(client.build_list_watchlist(&session)))
        .unwrap();
    assert!(entries.is_empty(), "expected empty list");

    // Step 3: save.
    let req = client.build_save_movie(&session, &movie(42)).unwrap();
    let message = client.parse_save_movie(execute(req)).unwrap();
    assert!(!message.is_empty());

    // Step 4: check reports saved.
    let saved = client
        .parse_check_status(execute(client.build_check_status(&session, 42)))
        .unwrap();
    assert!(saved);

    // Step 5: saving again is rejected, not duplicated.
    let req = client.build_save_movie(&session, &movie(42)).unwrap();
    let err = client.parse_save_movie(execute(req)).unwrap_err();
    assert_eq!(err.status(), Some(409));
    let entries = client
        .parse_list_watchlist(execute(client.build_list_watchlist(&session)))
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Movie 42");

    // Step 6: remove.
    let req = client.build_remove_movie(&session, 42).unwrap();
    client.parse_remove_movie(execute(req)).unwrap();

    // Step 7: remove again, rejected with the server's message.
    let req = client.build_remove_movie(&session, 42).unwrap();
    let err = client.parse_remove_movie(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::RemoteRejection { status: 404, .. }));

    // Step 8: list, empty again.
    let entries = client
        .parse_list_watchlist(execute(client.build_list_watchlist(&session)))
        .unwrap();
    assert!(entries.is_empty(), "expected empty list after remove");
}

#[test]
fn wrong_password_is_rejected() {
    let client = WatchlistClient::new(&start_server(AppState::default()));
    let req = client
        .build_login(&LoginRequest {
            username: "demo".to_string(),
            password: "wrong".to_string(),
        })
        .unwrap();
    let err = client.parse_login(execute(req)).unwrap_err();
    assert_eq!(
        err,
        ApiError::RemoteRejection {
            status: 401,
            message: "Invalid username or password".to_string()
        }
    );
}

#[test]
fn detail_screen_saves_unsaved_movie() {
    let client = WatchlistClient::new(&start_server(AppState::default()));
    let session = Session::new("1");
    let mut toggle = MembershipToggle::new(42);

    check(&client, &session, &mut toggle);
    assert!(!toggle.is_saved());
    assert_eq!(toggle.label(), "Save");

    let note = tap(&client, &session, &mut toggle, &movie(42)).unwrap();
    assert_eq!(note.kind, NotificationKind::Saved);
    assert!(toggle.is_saved());
    assert_eq!(toggle.label(), "Remove");

    // A fresh screen for the same movie sees the confirmed state.
    let mut reopened = MembershipToggle::new(42);
    check(&client, &session, &mut reopened);
    assert!(reopened.is_saved());
}

#[test]
fn save_then_remove_leaves_no_residue() {
    let client = WatchlistClient::new(&start_server(AppState::default()));
    let session = Session::new("1");
    let mut toggle = MembershipToggle::new(7);
    check(&client, &session, &mut toggle);

    tap(&client, &session, &mut toggle, &movie(7)).unwrap();
    tap(&client, &session, &mut toggle, &movie(7)).unwrap();
    assert!(!toggle.is_saved());

    let entries = client
        .parse_list_watchlist(execute(client.build_list_watchlist(&session)))
        .unwrap();
    assert!(entries.is_empty());
}

#[test]
fn list_screen_picks_up_save_on_refocus() {
    let client = WatchlistClient::new(&start_server(AppState::default()));
    let session = Session::new("1");

    for id in 1..=3 {
        let req = client.build_save_movie(&session, &movie(id)).unwrap();
        client.parse_save_movie(execute(req)).unwrap();
    }

    let mut list = ResourceState::new();
    focus(&client, &session, &mut list);
    assert_eq!(CollectionView::from_resource(&list).len(), 3);

    // Navigate to a detail screen and save a fourth movie.
    let mut toggle = MembershipToggle::new(4);
    check(&client, &session, &mut toggle);
    tap(&client, &session, &mut toggle, &movie(4)).unwrap();
    toggle.unmount();

    // Nothing is pushed to the list until it regains focus.
    assert_eq!(CollectionView::from_resource(&list).len(), 3);
    focus(&client, &session, &mut list);
    assert_eq!(CollectionView::from_resource(&list).len(), 4);
}

#[test]
fn server_error_on_save_keeps_movie_unsaved() {
    let state = AppState::default();
    let base = start_server(state.clone());
    let client = WatchlistClient::new(&base);
    let session = Session::new("1");

    let mut toggle = MembershipToggle::new(42);
    check(&client, &session, &mut toggle);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(state.faults.inject(
        Endpoint::Save,
        Fault::Reject {
            status: 500,
            message: "db error".to_string(),
        },
    ));

    let note = tap(&client, &session, &mut toggle, &movie(42)).unwrap();
    assert_eq!(note.kind, NotificationKind::SaveFailed);
    assert!(note.message.contains("db error"), "{}", note.message);
    assert!(!toggle.is_saved());

    let saved = client
        .parse_check_status(execute(client.build_check_status(&session, 42)))
        .unwrap();
    assert!(!saved, "no entry was created");
}

#[test]
fn failed_check_shows_not_saved() {
    let state = AppState::default();
    let client = WatchlistClient::new(&start_server(state.clone()));
    let session = Session::new("1");

    let req = client.build_save_movie(&session, &movie(42)).unwrap();
    client.parse_save_movie(execute(req)).unwrap();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(state.faults.inject(
        Endpoint::Check,
        Fault::Reject {
            status: 503,
            message: "unavailable".to_string(),
        },
    ));

    let mut toggle = MembershipToggle::new(42);
    check(&client, &session, &mut toggle);
    assert!(!toggle.is_saved(), "uncertain state never shows saved");
    assert_eq!(toggle.last_error().and_then(ApiError::status), Some(503));
}
