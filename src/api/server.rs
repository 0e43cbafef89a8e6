//! API Server
//!
//! Listener setup, middleware stack and graceful shutdown.

use super::{
    errors::panic_response,
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::RouletteConfig;
use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{signal, time::interval};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Roulette API server
pub struct ApiServer {
    config: RouletteConfig,
}

impl ApiServer {
    pub fn new(config: RouletteConfig) -> Self {
        Self { config }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| self.config.logging.filter.clone().into()),
            )
            .init();

        info!("Starting Roulette API Server");

        let state = Arc::new(AppState::new(self.config.clone()));
        spawn_session_sweeper(state.clone());
        let app = build_app(state, &self.config);
        let addr = self.get_socket_addr()?;

        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API Server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API Server stopped gracefully");
        Ok(())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        let server = &self.config.server;
        let game = &self.config.game;

        info!("Server Configuration:");
        info!("   CORS: {:?}", server.allowed_origins);
        info!("   Request timeout: {}s", server.request_timeout_secs);
        info!("   Starting balance: {}", game.starting_balance);
        info!("   History capacity: {}", game.history_capacity);
        info!("   Max neighbor radius: {}", game.max_neighbor_radius);

        info!(
            "   Sessions: up to {}, evicted after {}s idle",
            game.max_sessions, game.session_idle_timeout_secs
        );

        if game.strict_bet_types {
            info!("   Unknown bet types: rejected");
        } else {
            info!("   Unknown bet types: settled at 0:1 (stake back on a hit)");
        }

        info!("Available endpoints:");
        info!("   GET  /health                       - Service identity");
        info!("   POST /spin                         - Stateless spin");
        info!("   GET  /numbers/:n/neighbors         - Wheel neighbors");
        info!("   POST /sessions                     - Open a session");
        info!("   POST /sessions/:id/spin            - Spin against a session");
        info!("   GET  /ws                           - Live table events");
        info!("   GET  /metrics                      - Prometheus metrics");
    }
}

/// Assemble the router and middleware stack around shared state
pub fn build_app(state: Arc<AppState>, config: &RouletteConfig) -> Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))

        // CORS layer (before timeout to handle preflight)
        .layer(create_cors_layer(config.server.allowed_origins.clone()))

        .layer(TimeoutLayer::new(config.request_timeout()))

        // Handler panics become opaque 500s
        .layer(CatchPanicLayer::custom(panic_response))

        // Tracing layer (last for complete request tracing)
        .layer(TraceLayer::new_for_http())
}

/// Periodically evict idle sessions
fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = SWEEP_INTERVAL.min(state.config.session_idle_timeout());

    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            state.sessions.purge_idle().await;
        }
    });
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
