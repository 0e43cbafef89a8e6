//! Request Handlers
//!
//! Thin adapters between HTTP and the settlement engine.

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
    monitoring::MetricsRegistry,
    websocket::WebSocketManager,
};
use crate::{
    config::RouletteConfig,
    errors::{GameError, SessionError},
    games::{
        neighbors::neighbors_within,
        rng::{OsRngSource, SpinSource},
        session::{InMemorySessionStore, SessionLimits, SessionSnapshot, SessionStore},
        settlement::{total_stake, SettlementConfig, SettlementEngine},
        Bet, SpinRequest, SpinResult,
    },
};
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;

/// Shared application state
pub struct AppState {
    pub engine: SettlementEngine,
    pub sessions: Arc<dyn SessionStore>,
    pub config: RouletteConfig,
    pub version: String,
    pub websocket_manager: Arc<WebSocketManager>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(config: RouletteConfig) -> Self {
        Self::with_spin_source(config, Arc::new(OsRngSource))
    }

    /// Build state around a specific draw source (fixed sequences in tests)
    pub fn with_spin_source(config: RouletteConfig, source: Arc<dyn SpinSource>) -> Self {
        let engine = SettlementEngine::with_source(
            SettlementConfig {
                strict_bet_types: config.game.strict_bet_types,
            },
            source,
        );
        let sessions = Arc::new(InMemorySessionStore::with_limits(
            config.game.starting_balance,
            config.game.history_capacity,
            SessionLimits {
                max_sessions: config.game.max_sessions,
                idle_timeout: config.session_idle_timeout(),
            },
        ));
        let metrics = Arc::new(MetricsRegistry::new());
        let websocket_manager = Arc::new(WebSocketManager::new(metrics.clone()));

        Self {
            engine,
            sessions,
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
            websocket_manager,
            metrics,
        }
    }

    /// Stateless spin: the caller supplies and keeps the balance
    pub fn spin(&self, bets: &[Bet], balance: f64) -> Result<SpinResult, GameError> {
        let outcome = check_not_empty(bets).and_then(|_| self.engine.settle(bets, balance));
        match outcome {
            Ok(result) => {
                self.after_spin(bets, &result);
                Ok(result)
            }
            Err(e) => {
                self.metrics.record_rejection();
                debug!("Spin rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Spin against a stored session balance
    pub async fn spin_session(
        &self,
        session_id: &str,
        bets: &[Bet],
    ) -> Result<(SpinResult, SessionSnapshot), SessionError> {
        if let Err(e) = check_not_empty(bets) {
            self.metrics.record_rejection();
            return Err(e.into());
        }

        match self.sessions.spin(session_id, bets, &self.engine).await {
            Ok((result, snapshot)) => {
                self.after_spin(bets, &result);
                Ok((result, snapshot))
            }
            Err(e) => {
                if matches!(e, SessionError::Game(_)) {
                    self.metrics.record_rejection();
                }
                debug!("Session {} spin rejected: {}", session_id, e);
                Err(e)
            }
        }
    }

    fn after_spin(&self, bets: &[Bet], result: &SpinResult) {
        self.metrics.record_spin(
            bets.len(),
            result.winning_bets.len(),
            total_stake(bets),
            result.payout,
        );
        self.websocket_manager.broadcast_spin(result);
    }

    fn health(&self) -> HealthResponse {
        HealthResponse {
            name: "Roulette API".to_string(),
            status: "running".to_string(),
            version: self.version.clone(),
        }
    }
}

fn check_not_empty(bets: &[Bet]) -> Result<(), GameError> {
    if bets.is_empty() {
        Err(GameError::EmptyBets)
    } else {
        Ok(())
    }
}

/// Service identity
/// GET / and GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(state.health())
}

/// GET /ping
pub async fn ping_handler() -> &'static str {
    "pong"
}

/// POST /spin
pub async fn spin_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpinRequest>, JsonRejection>,
) -> Result<Json<SpinResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_payload(request_id.0.clone(), e))?;

    state
        .spin(&request.bets, request.balance)
        .map(Json)
        .map_err(|e| ApiError::from_game(request_id.0, e))
}

/// GET /numbers/{number}/neighbors?radius={k}
pub async fn neighbors_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
    query: Result<Query<NeighborsQuery>, QueryRejection>,
) -> Result<Json<NeighborsResponse>, ApiError> {
    let number: i64 = number.parse().map_err(|_| {
        ApiError::bad_request(
            request_id.0.clone(),
            format!("Invalid number: '{}' (must be 0-36)", number),
        )
    })?;
    let Query(query) = query.map_err(|e| ApiError::invalid_payload(request_id.0.clone(), e))?;

    let neighbors = neighbors_within(number, query.radius, state.config.game.max_neighbor_radius)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    // Both values were range-checked above
    Ok(Json(NeighborsResponse {
        number: number as u8,
        neighbors,
        radius: query.radius as u8,
    }))
}

/// POST /sessions
///
/// The body is optional; an empty one opens a session at the starting
/// balance. A body that is present must parse.
pub async fn create_session_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice::<CreateSessionRequest>(&body)
            .map_err(|e| ApiError::invalid_payload(request_id.0.clone(), e))?
    };

    state
        .sessions
        .create(request.balance)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_session(request_id.0, e))
}

/// GET /sessions/{id}
pub async fn get_session_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .sessions
        .get(&session_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_session(request_id.0, e))
}

/// DELETE /sessions/{id}
pub async fn delete_session_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    state
        .sessions
        .remove(&session_id)
        .await
        .map(|_| axum::http::StatusCode::NO_CONTENT)
        .map_err(|e| ApiError::from_session(request_id.0, e))
}

/// GET /sessions/{id}/balance
pub async fn get_balance_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let snapshot = state
        .sessions
        .get(&session_id)
        .await
        .map_err(|e| ApiError::from_session(request_id.0, e))?;

    Ok(Json(BalanceResponse {
        session_id: snapshot.session_id,
        balance: snapshot.balance,
    }))
}

/// POST /sessions/{id}/balance
pub async fn set_balance_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_payload(request_id.0.clone(), e))?;

    let snapshot = state
        .sessions
        .set_balance(&session_id, request.balance)
        .await
        .map_err(|e| ApiError::from_session(request_id.0, e))?;

    Ok(Json(BalanceResponse {
        session_id: snapshot.session_id,
        balance: snapshot.balance,
    }))
}

/// GET /sessions/{id}/history
pub async fn history_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let snapshot = state
        .sessions
        .get(&session_id)
        .await
        .map_err(|e| ApiError::from_session(request_id.0, e))?;

    Ok(Json(HistoryResponse {
        session_id: snapshot.session_id,
        history: snapshot.history,
        last_spin: snapshot.last_spin,
    }))
}

/// POST /sessions/{id}/spin
pub async fn session_spin_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<SessionSpinRequest>, JsonRejection>,
) -> Result<Json<SessionSpinResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_payload(request_id.0.clone(), e))?;

    let (result, session) = state
        .spin_session(&session_id, &request.bets)
        .await
        .map_err(|e| ApiError::from_session(request_id.0, e))?;

    Ok(Json(SessionSpinResponse { result, session }))
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.to_prometheus_format(),
    )
}
