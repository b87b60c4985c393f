//! Obiex Web API
//!
//! Serves one puzzle session over JSON. All requests share the session, so
//! it sits behind a mutex and every handler runs a whole engine operation
//! while holding the lock.

use std::env;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use obiex_core::{Board, Direction, Encoding, Location, Map, Session, Status};

const DEFAULT_ADDR: &str = "0.0.0.0:8000";

// =============================================================================
// State
// =============================================================================

struct AppStateInner {
    session: Mutex<Session>,
}

type AppState = Arc<AppStateInner>;

impl AppStateInner {
    fn session(&self) -> MutexGuard<'_, Session> {
        // A poisoned lock still holds a consistent session.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Debug, Serialize)]
struct GameStateModel {
    target: [i64; 2],
    /// `null` for obstacles that fell off the board
    obstacles: Vec<Option<[i64; 2]>>,
    status: Status,
    render: String,
    /// Move history in `0L,2U` form
    moves: String,
    can_undo: bool,
    /// Base64 session string accepted by `/load`
    encoding: String,
}

#[derive(Deserialize)]
struct MoveRequest {
    index: usize,
    direction: String,
}

#[derive(Deserialize)]
struct LoadRequest {
    data: String,
    #[serde(default)]
    encoding: Encoding,
}

#[derive(Deserialize)]
struct MapRequest {
    target: Vec<i64>,
    obstacles: Vec<Vec<i64>>,
}

#[derive(Debug, Serialize)]
struct ExportModel {
    data: String,
}

#[derive(Debug, Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Debug, Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn bad_request(e: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorModel { detail: e.to_string() }))
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn session_to_model(session: &Session) -> GameStateModel {
    let state = session.state();
    let target = state.target();
    GameStateModel {
        target: [target.x, target.y],
        obstacles: state
            .obstacles()
            .iter()
            .map(|ob| match ob {
                Location::OnBoard(c) => Some([c.x, c.y]),
                Location::OffBoard => None,
            })
            .collect(),
        status: state.status(),
        render: state.render(),
        moves: session.serialize_moves(Encoding::Raw),
        can_undo: session.can_undo(),
        encoding: session.serialize(Encoding::Base64),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(session_to_model(&session))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let direction = req.direction.parse::<Direction>().map_err(bad_request)?;
    let mut session = state.session();
    let to = session.move_obstacle(req.index, direction).map_err(bad_request)?;
    info!(index = req.index, %direction, to = %to, "move");
    Ok(Json(session_to_model(&session)))
}

async fn undo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.undo().map_err(bad_request)?;
    Ok(Json(session_to_model(&session)))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset();
    Json(session_to_model(&session))
}

async fn load_game(
    State(state): State<AppState>,
    Json(req): Json<LoadRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.load(&req.data, req.encoding).map_err(bad_request)?;
    info!(moves = session.moves().len(), "session loaded");
    Ok(Json(session_to_model(&session)))
}

async fn load_board(
    State(state): State<AppState>,
    Json(req): Json<MapRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let map = Map::from_components(&req.target, &req.obstacles).map_err(bad_request)?;
    let board = Board::new(map).map_err(bad_request)?;
    let mut session = state.session();
    *session = Session::from_board(board);
    Ok(Json(session_to_model(&session)))
}

async fn export_game(State(state): State<AppState>) -> Json<ExportModel> {
    let session = state.session();
    Json(ExportModel { data: session.serialize(Encoding::Base64) })
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel { status: "ok".to_string() })
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/move", post(make_move))
        .route("/undo", post(undo))
        .route("/reset", post(reset_game))
        .route("/load", post(load_game))
        .route("/board", post(load_board))
        .route("/export", get(export_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = env::var("OBIEX_API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(Session::new()),
    });

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "failed to bind: {e}");
            std::process::exit(1);
        }
    };
    info!("Obiex API running on http://{addr}");
    if let Err(e) = axum::serve(listener, app(state)).await {
        error!("server error: {e}");
    }
}
