//! Roulette HTTP API
//!
//! Stateless spins, session-backed play, wheel lookups and a WebSocket feed
//! of settled spins.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod routes;
pub mod server;
pub mod websocket;

pub use handlers::AppState;
pub use server::{build_app, ApiServer};
