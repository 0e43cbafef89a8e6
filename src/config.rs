//! Configuration management with validation and defaults
//!
//! Values come from defaults, an optional TOML file, then `ROULETTE_*`
//! environment variables, in that order.

use crate::errors::ConfigurationError;
use crate::games::neighbors::MAX_RADIUS;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level service configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteConfig {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Table rules
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Balance given to a freshly opened session
    pub starting_balance: f64,
    /// Recent winning numbers kept per session
    pub history_capacity: usize,
    pub max_neighbor_radius: u8,
    /// Reject unknown bet types instead of settling them at 0:1
    pub strict_bet_types: bool,
    /// Live sessions kept before new ones are refused
    pub max_sessions: usize,
    /// Sessions untouched for this long are evicted
    pub session_idle_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000.0,
            history_capacity: 20,
            max_neighbor_radius: MAX_RADIUS,
            strict_bet_types: false,
            max_sessions: 10_000,
            session_idle_timeout_secs: 3600,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins if set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "roulette=info,roulette_api=info,tower_http=info".to_string(),
        }
    }
}

impl RouletteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.game.session_idle_timeout_secs)
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "0", "Port cannot be zero"));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(invalid(
                "server.request_timeout_secs",
                "0",
                "Timeout must be > 0",
            ));
        }

        let balance = self.game.starting_balance;
        if !balance.is_finite() || balance < 0.0 {
            return Err(invalid(
                "game.starting_balance",
                &balance.to_string(),
                "Balance must be a non-negative number",
            ));
        }

        if self.game.history_capacity == 0 {
            return Err(invalid(
                "game.history_capacity",
                "0",
                "History must hold at least one spin",
            ));
        }

        if self.game.max_sessions == 0 {
            return Err(invalid(
                "game.max_sessions",
                "0",
                "At least one session must be allowed",
            ));
        }

        if self.game.session_idle_timeout_secs == 0 {
            return Err(invalid(
                "game.session_idle_timeout_secs",
                "0",
                "Idle timeout must be > 0",
            ));
        }

        if self.game.max_neighbor_radius == 0 || self.game.max_neighbor_radius > 18 {
            return Err(invalid(
                "game.max_neighbor_radius",
                &self.game.max_neighbor_radius.to_string(),
                "Radius must be 1-18",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, reason: &str) -> Result<Option<T>, ConfigurationError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, &raw, reason)),
        Err(_) => Ok(None),
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> Result<RouletteConfig, ConfigurationError> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => RouletteConfig::default(),
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<RouletteConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(config: &mut RouletteConfig) -> Result<(), ConfigurationError> {
        if let Ok(host) = env::var("ROULETTE_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_env("ROULETTE_PORT", "Invalid port number")? {
            config.server.port = port;
        }
        if let Ok(origins) = env::var("ROULETTE_CORS_ORIGINS") {
            config.server.allowed_origins = split_origins(&origins);
        }
        if let Some(balance) = parse_env("ROULETTE_STARTING_BALANCE", "Invalid balance")? {
            config.game.starting_balance = balance;
        }
        if let Some(max) = parse_env("ROULETTE_MAX_SESSIONS", "Invalid session count")? {
            config.game.max_sessions = max;
        }
        if let Some(strict) = parse_env("ROULETTE_STRICT_BET_TYPES", "Invalid boolean value")? {
            config.game.strict_bet_types = strict;
        }

        Ok(())
    }
}

/// Parse a comma-separated origin list
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
