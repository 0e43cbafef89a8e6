//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use crate::errors::{GameError, SessionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use tracing::{error, warn};

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (NOT_FOUND, INSUFFICIENT_BALANCE, INTERNAL_ERROR, etc.)
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest { code: &'static str, message: String },
    /// Temporarily out of capacity; retrying later may succeed
    Unavailable { code: &'static str, message: String },
    InternalError(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest {
                code: "BAD_REQUEST",
                message,
            },
            request_id,
        }
    }

    /// Malformed body or query. Logged, but still a client fault.
    pub fn invalid_payload(request_id: String, detail: impl fmt::Display) -> Self {
        warn!("[{}] Rejected malformed request: {}", request_id, detail);
        Self {
            kind: ApiErrorKind::BadRequest {
                code: "INVALID_PAYLOAD",
                message: detail.to_string(),
            },
            request_id,
        }
    }

    /// Internal fault. Full context goes to the log, the caller gets an
    /// opaque message.
    pub fn internal_error(request_id: String, context: String) -> Self {
        error!("[{}] Internal error: {}", request_id, context);
        Self {
            kind: ApiErrorKind::InternalError("Internal server error".to_string()),
            request_id,
        }
    }

    pub fn from_game(request_id: String, err: GameError) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest {
                code: err.code(),
                message: err.to_string(),
            },
            request_id,
        }
    }

    pub fn from_session(request_id: String, err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::not_found(request_id, err.to_string()),
            SessionError::LimitReached(_) => Self {
                kind: ApiErrorKind::Unavailable {
                    code: "SESSION_LIMIT",
                    message: err.to_string(),
                },
                request_id,
            },
            SessionError::Game(game) => Self::from_game(request_id, game),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiErrorKind::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest { code, message } => {
                write!(f, "[{}] Bad Request ({}): {}", self.request_id, code, message)
            }
            ApiErrorKind::Unavailable { code, message } => {
                write!(f, "[{}] Unavailable ({}): {}", self.request_id, code, message)
            }
            ApiErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self.kind {
            ApiErrorKind::NotFound(msg) => ("NOT_FOUND", msg),
            ApiErrorKind::BadRequest { code, message } => (code, message),
            ApiErrorKind::Unavailable { code, message } => (code, message),
            ApiErrorKind::InternalError(msg) => ("INTERNAL_ERROR", msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

/// Turns a handler panic into an opaque 500 so the server keeps running
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal_error("unknown".to_string(), format!("handler panicked: {}", detail))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_errors_map_to_bad_request() {
        let err = ApiError::from_game(
            "req-1".to_string(),
            GameError::InsufficientBalance {
                staked: 150.0,
                balance: 100.0,
            },
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            err.kind,
            ApiErrorKind::BadRequest {
                code: "INSUFFICIENT_BALANCE",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_session_maps_to_not_found() {
        let err = ApiError::from_session(
            "req-2".to_string(),
            SessionError::NotFound("abc".to_string()),
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_session_limit_maps_to_unavailable() {
        let err = ApiError::from_session("req-4".to_string(), SessionError::LimitReached(2));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(
            err.kind,
            ApiErrorKind::Unavailable {
                code: "SESSION_LIMIT",
                ..
            }
        ));
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let err = ApiError::internal_error("req-3".to_string(), "secret detail".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("secret detail"));
    }

    #[test]
    fn test_panic_response_is_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
