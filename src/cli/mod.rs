//! CLI module for the Teams API
//!
//! Provides subcommands for running the service and for talking to a
//! running instance:
//! - `serve`: HTTP API, optionally with the embedded operator
//! - `operator`: reconciler against a remote API
//! - `health`, `create`, `list`, `get`, `delete`: client calls

pub mod client;
pub mod operator;
pub mod serve;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::init_tracing;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Teams API - team registry service, operator and client
#[derive(Debug, Parser)]
#[command(name = "teams-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Teams API for client and operator commands
    #[arg(long, global = true, env = "TEAMS_API_URL", default_value = DEFAULT_API_URL)]
    pub url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Reconcile the API at --url against the configured desired teams
    Operator,

    /// Check API health
    Health,

    /// Create a new team
    Create {
        /// Team name
        name: String,
    },

    /// List all teams
    List,

    /// Get a specific team
    Get {
        /// Team ID
        id: String,
    },

    /// Delete a team
    Delete {
        /// Team ID
        id: String,
    },
}

fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    Ok(AppConfig::load()?)
}

fn init_observability(config: &AppConfig) {
    init_tracing(
        &LoggingConfig::from(&config.logging),
        &config.observability.tracing,
    );
}

/// Completes on Ctrl+C or SIGTERM
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
