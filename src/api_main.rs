//! Roulette API Server Binary
//!
//! Loads configuration (file, environment, then command line) and serves
//! the table over HTTP and WebSocket.

use clap::Parser;
use roulette::api::ApiServer;
use roulette::config::{split_origins, ConfigLoader};

#[derive(Parser, Debug)]
#[command(name = "roulette-api")]
#[command(about = "European Roulette API Server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Balance for newly opened sessions
    #[arg(long)]
    starting_balance: Option<f64>,

    /// Reject unknown bet types instead of settling them at 0:1
    #[arg(long)]
    strict_bet_types: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = split_origins(&origins);
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_secs = timeout;
    }
    if let Some(balance) = args.starting_balance {
        config.game.starting_balance = balance;
    }
    if args.strict_bet_types {
        config.game.strict_bet_types = true;
    }
    config.validate()?;

    let server = ApiServer::new(config);
    server.run().await?;

    Ok(())
}
