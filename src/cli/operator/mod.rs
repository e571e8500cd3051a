//! Operator command - reconciles a remote Teams API

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::infrastructure::client::HttpTeamsClient;
use crate::infrastructure::observability::shutdown_tracing;
use crate::infrastructure::reconcile::Reconciler;

/// Run the reconciler against `url` until Ctrl+C or SIGTERM
pub async fn run(url: &str) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_observability(&config);

    let client = HttpTeamsClient::new(url)?;
    let reconciler = Reconciler::new(
        config.operator.source()?,
        Arc::new(client),
        config.reconciler_settings(),
    );

    info!(url = %url, "Starting Teams operator");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        super::shutdown_signal().await;
        signal_token.cancel();
    });

    reconciler.run(shutdown).await;

    shutdown_tracing();
    info!("Teams operator shutdown complete");

    Ok(())
}
