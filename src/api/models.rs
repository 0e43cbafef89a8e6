//! API Request/Response Models

use crate::games::{session::SessionSnapshot, Bet, SpinResult};
use serde::{Deserialize, Serialize};

/// Service identity, returned by `/` and `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub status: String,
    pub version: String,
}

/// Neighbor lookup query; `count` is accepted for older clients
#[derive(Debug, Deserialize)]
pub struct NeighborsQuery {
    #[serde(default = "default_radius", alias = "count")]
    pub radius: i64,
}

fn default_radius() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborsResponse {
    pub number: u8,
    pub neighbors: Vec<u8>,
    pub radius: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub session_id: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<u8>,
    pub last_spin: Option<u8>,
}

/// Spin against a session; the balance comes from the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpinRequest {
    pub bets: Vec<Bet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpinResponse {
    #[serde(flatten)]
    pub result: SpinResult,
    pub session: SessionSnapshot,
}
