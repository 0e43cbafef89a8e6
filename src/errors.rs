//! Error types for the roulette engine and its service layer
//!
//! Validation failures are client faults and carry enough context to be
//! reported back verbatim. Nothing in here is retried.

/// Failures raised by bet validation, neighbor lookups and settlement
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Insufficient balance: {staked} staked against a balance of {balance}")]
    InsufficientBalance { staked: f64, balance: f64 },

    #[error("Invalid balance: {0}")]
    InvalidBalance(f64),

    #[error("Invalid number: {0} (must be 0-36)")]
    InvalidNumber(i64),

    #[error("Radius must be 1-{max}, got {radius}")]
    InvalidRadius { radius: i64, max: u8 },

    #[error("Invalid bet at position {index}: {reason}")]
    InvalidBet { index: usize, reason: String },

    #[error("Unknown bet type: {0}")]
    UnknownBetType(String),

    #[error("No bets placed")]
    EmptyBets,
}

impl GameError {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            GameError::InvalidBalance(_) => "INVALID_BALANCE",
            GameError::InvalidNumber(_) => "INVALID_NUMBER",
            GameError::InvalidRadius { .. } => "INVALID_RADIUS",
            GameError::InvalidBet { .. } => "INVALID_BET",
            GameError::UnknownBetType(_) => "UNKNOWN_BET_TYPE",
            GameError::EmptyBets => "EMPTY_BETS",
        }
    }
}

/// Session lookup and mutation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error("Session limit of {0} reached")]
    LimitReached(usize),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let err = GameError::InsufficientBalance {
            staked: 150.0,
            balance: 100.0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 150 staked against a balance of 100"
        );
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn test_session_error_wraps_game_error() {
        let err: SessionError = GameError::EmptyBets.into();
        assert_eq!(err.to_string(), "No bets placed");
        assert!(matches!(err, SessionError::Game(GameError::EmptyBets)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigurationError::InvalidValue {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Port cannot be zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for server.port: '0' (Port cannot be zero)"
        );
    }
}
