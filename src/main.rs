//! Reactive movie services.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!   Client ─────────▶│ movies service (/v1/movies)                  │
//!                    │   orchestrator ─┬─▶ upstream client (retry) ─┼──▶ movie-info service
//!                    │                 └─▶ upstream client (retry) ─┼──▶ reviews service
//!                    └──────────────────────────────────────────────┘
//!
//!   movie-info service: store + broadcast channel (replay latest, NDJSON)
//!   reviews service:    store
//! ```
//!
//! One binary runs one role, selected on the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use reactive_movies::config::{load_config, ServiceConfig};
use reactive_movies::lifecycle::signals::spawn_signal_handler;
use reactive_movies::observability::{logging, metrics};
use reactive_movies::{HttpServer, Role, Shutdown};

#[derive(Parser)]
#[command(name = "reactive-movies")]
#[command(about = "Movie-info, reviews and movies services", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    role: RoleCommand,
}

#[derive(Subcommand, Clone, Copy)]
enum RoleCommand {
    /// Movie info records and their live stream
    MoviesInfo,
    /// Reviews of movies
    Reviews,
    /// Composite movies over the other two services
    Movies,
}

impl From<RoleCommand> for Role {
    fn from(command: RoleCommand) -> Self {
        match command {
            RoleCommand::MoviesInfo => Role::MoviesInfo,
            RoleCommand::Reviews => Role::Reviews,
            RoleCommand::Movies => Role::Movies,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let role = Role::from(cli.role);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(role = %role, "reactive-movies v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(role, &config, shutdown)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
