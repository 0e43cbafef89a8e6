//! Roulette - European Roulette Settlement Service
//!
//! Single-zero wheel model, bet settlement, racetrack neighbor lookups and
//! an HTTP/WebSocket API around them. Winning numbers are drawn server-side;
//! clients only ever send bets.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;

pub use config::{ConfigLoader, RouletteConfig};
pub use errors::{ConfigurationError, GameError, SessionError};
