//! WebSocket Support for Live Tables
//!
//! Each connection gets two streams:
//! - direct replies to its own messages (`pong`, `spin_result`, `error`)
//! - a table-wide `spin_settled` event for every spin settled anywhere

use super::{handlers::AppState, monitoring::MetricsRegistry};
use crate::{
    errors::SessionError,
    games::{Bet, Color, SpinResult},
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Events sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Greeting sent once per connection
    Connected { client_id: String, timestamp: i64 },

    Pong { timestamp: i64 },

    /// Outcome of this client's own spin request
    SpinResult {
        #[serde(flatten)]
        result: SpinResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },

    /// A spin was settled somewhere on the table
    SpinSettled {
        winning_number: u8,
        winning_color: Color,
        timestamp: i64,
    },

    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

/// Messages accepted from clients
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    Ping,
    SpinRequest {
        bets: Vec<Bet>,
        #[serde(default)]
        balance: Option<f64>,
        #[serde(default)]
        session_id: Option<String>,
    },
}

/// WebSocket connection manager
#[derive(Clone)]
pub struct WebSocketManager {
    tx: broadcast::Sender<WsEvent>,
    client_count: Arc<AtomicU64>,
    metrics: Arc<MetricsRegistry>,
}

impl WebSocketManager {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        let (tx, _rx) = broadcast::channel(256);

        Self {
            tx,
            client_count: Arc::new(AtomicU64::new(0)),
            metrics,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.tx.subscribe()
    }

    /// Announce a settled spin to every connected client
    pub fn broadcast_spin(&self, result: &SpinResult) {
        let event = WsEvent::SpinSettled {
            winning_number: result.winning_number,
            winning_color: result.winning_color,
            timestamp: current_timestamp(),
        };

        if let Err(e) = self.tx.send(event) {
            debug!("No WebSocket clients to receive spin event: {}", e);
        }
    }

    pub fn client_count(&self) -> u64 {
        self.client_count.load(Ordering::SeqCst)
    }

    fn client_connected(&self) -> u64 {
        self.metrics.websocket_connected();
        self.client_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn client_disconnected(&self) -> u64 {
        self.metrics.websocket_disconnected();
        self.client_count.fetch_sub(1, Ordering::SeqCst).saturating_sub(1)
    }
}

/// GET /ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let manager = state.websocket_manager.clone();
    let client_id = generate_client_id();
    let total = manager.client_connected();
    info!("WebSocket client {} connected (total: {})", client_id, total);

    let (mut sender, mut receiver) = socket.split();
    let mut events = manager.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<WsEvent>(32);

    let greeting = WsEvent::Connected {
        client_id: client_id.clone(),
        timestamp: current_timestamp(),
    };
    if reply_tx.send(greeting).await.is_err() {
        manager.client_disconnected();
        return;
    }

    let client_for_recv = client_id.clone();
    let recv_state = state.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    debug!("Received message from client {}: {}", client_for_recv, text);
                    let reply = handle_client_message(&recv_state, &text).await;
                    if reply_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Client {} requested close", client_for_recv);
                    break;
                }
                Err(e) => {
                    warn!("WebSocket error from client {}: {}", client_for_recv, e);
                    break;
                }
                _ => {}
            }
        }
    });

    let client_for_send = client_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                reply = reply_rx.recv() => match reply {
                    Some(event) => event,
                    None => break,
                },
                broadcast = events.recv() => match broadcast {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Client {} lagged, skipped {} events", client_for_send, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let message = match serde_json::to_string(&event) {
                Ok(text) => Message::Text(text),
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if sender.send(message).await.is_err() {
                debug!("Client {} disconnected", client_for_send);
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut receive_task => send_task.abort(),
        _ = &mut send_task => receive_task.abort(),
    }

    let remaining = manager.client_disconnected();
    info!("WebSocket client {} disconnected (remaining: {})", client_id, remaining);
}

/// Turn one inbound text frame into the reply for that client
pub async fn handle_client_message(state: &AppState, text: &str) -> WsEvent {
    let message: WsClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            return WsEvent::Error {
                message: format!("Invalid message: {}", e),
                code: Some("INVALID_PAYLOAD".to_string()),
            }
        }
    };

    match message {
        WsClientMessage::Ping => WsEvent::Pong {
            timestamp: current_timestamp(),
        },
        WsClientMessage::SpinRequest {
            bets,
            balance,
            session_id: Some(session_id),
        } => {
            if balance.is_some() {
                debug!("Ignoring client balance for session {}", session_id);
            }
            match state.spin_session(&session_id, &bets).await {
                Ok((result, _)) => WsEvent::SpinResult {
                    result,
                    session_id: Some(session_id),
                },
                Err(e) => session_error_event(e),
            }
        }
        WsClientMessage::SpinRequest {
            bets,
            balance,
            session_id: None,
        } => {
            let balance = balance.unwrap_or(state.config.game.starting_balance);
            match state.spin(&bets, balance) {
                Ok(result) => WsEvent::SpinResult {
                    result,
                    session_id: None,
                },
                Err(e) => session_error_event(e.into()),
            }
        }
    }
}

fn session_error_event(err: SessionError) -> WsEvent {
    let code = match &err {
        SessionError::NotFound(_) => "NOT_FOUND",
        SessionError::LimitReached(_) => "SESSION_LIMIT",
        SessionError::Game(game) => game.code(),
    };
    WsEvent::Error {
        message: err.to_string(),
        code: Some(code.to_string()),
    }
}

fn generate_client_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("ws_{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
