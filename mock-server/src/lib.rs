use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: String,
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub release_date: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveMovie {
    pub user_id: String,
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Deserialize)]
pub struct RemoveMovie {
    pub user_id: String,
    pub movie_id: i64,
}

#[derive(Deserialize)]
pub struct CheckQuery {
    pub user_id: String,
    pub movie_id: i64,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Saved {
    pub saved: bool,
}

/// Endpoints that can be told to misbehave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    List,
    Check,
    Save,
    Remove,
}

#[derive(Clone, Debug)]
pub enum Fault {
    /// Answer the next call with this status and `{"message": ..}` body.
    Reject { status: u16, message: String },
    /// Sleep before handling the next call.
    Stall(Duration),
}

/// One-shot fault injection shared between a test and the running server.
#[derive(Clone, Default)]
pub struct Faults(Arc<Mutex<HashMap<Endpoint, Fault>>>);

impl Faults {
    pub async fn inject(&self, endpoint: Endpoint, fault: Fault) {
        self.0.lock().await.insert(endpoint, fault);
    }

    async fn take(&self, endpoint: Endpoint) -> Option<Fault> {
        self.0.lock().await.remove(&endpoint)
    }
}

pub type Db = Arc<RwLock<Vec<WatchlistEntry>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub faults: Faults,
    pub users: Arc<HashMap<String, String>>,
}

impl Default for AppState {
    fn default() -> Self {
        let users = HashMap::from([("demo".to_string(), "demo123".to_string())]);
        Self {
            db: Db::default(),
            faults: Faults::default(),
            users: Arc::new(users),
        }
    }
}

type Failure = (StatusCode, Json<Message>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(Message {
            message: message.into(),
        }),
    )
}

/// Apply a pending fault for `endpoint`, if any.
async fn trip(state: &AppState, endpoint: Endpoint) -> Result<(), Failure> {
    match state.faults.take(endpoint).await {
        Some(Fault::Reject { status, message }) => {
            tracing::info!(?endpoint, status, "injected rejection");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err(failure(status, message))
        }
        Some(Fault::Stall(delay)) => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        None => Ok(()),
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/watchlist/check", get(check_watchlist))
        .route("/watchlist/save", post(save_movie))
        .route("/watchlist/remove", delete(remove_movie))
        .route("/watchlist/{user_id}", get(list_watchlist));
    Router::new().nest("/api", api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn list_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WatchlistEntry>>, Failure> {
    trip(&state, Endpoint::List).await?;
    let entries = state.db.read().await;
    Ok(Json(
        entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect(),
    ))
}

async fn check_watchlist(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<Saved>, Failure> {
    trip(&state, Endpoint::Check).await?;
    let entries = state.db.read().await;
    let saved = entries
        .iter()
        .any(|e| e.user_id == query.user_id && e.movie_id == query.movie_id);
    Ok(Json(Saved { saved }))
}

async fn save_movie(
    State(state): State<AppState>,
    Json(input): Json<SaveMovie>,
) -> Result<(StatusCode, Json<Message>), Failure> {
    trip(&state, Endpoint::Save).await?;
    let mut entries = state.db.write().await;
    if entries
        .iter()
        .any(|e| e.user_id == input.user_id && e.movie_id == input.movie_id)
    {
        return Err(failure(StatusCode::CONFLICT, "Movie is already in the watchlist"));
    }
    tracing::info!(user_id = %input.user_id, movie_id = input.movie_id, "movie saved");
    entries.push(WatchlistEntry {
        user_id: input.user_id,
        movie_id: input.movie_id,
        title: input.title,
        poster_path: input.poster_path,
        vote_average: input.vote_average,
        release_date: input.release_date,
    });
    Ok((
        StatusCode::CREATED,
        Json(Message {
            message: "Movie saved to watchlist".to_string(),
        }),
    ))
}

async fn remove_movie(
    State(state): State<AppState>,
    Json(input): Json<RemoveMovie>,
) -> Result<Json<Message>, Failure> {
    trip(&state, Endpoint::Remove).await?;
    let mut entries = state.db.write().await;
    let before = entries.len();
    entries.retain(|e| !(e.user_id == input.user_id && e.movie_id == input.movie_id));
    if entries.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "Movie is not in the watchlist"));
    }
    tracing::info!(user_id = %input.user_id, movie_id = input.movie_id, "movie removed");
    Ok(Json(Message {
        message: "Movie removed from watchlist".to_string(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<serde_json::Value>, Failure> {
    if input.username.trim().is_empty() || input.password.trim().is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Username and password must not be empty",
        ));
    }
    match state.users.get(&input.username) {
        Some(password) if *password == input.password => Ok(Json(serde_json::json!({
            "message": "Login successful",
            "user": { "username": input.username },
        }))),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Invalid username or password")),
    }
}
