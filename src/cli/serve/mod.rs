//! Serve command - runs the HTTP API, optionally with the embedded operator

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::domain::reconcile::TeamsBackend;
use crate::infrastructure::observability::{init_metrics, shutdown_tracing};
use crate::infrastructure::reconcile::Reconciler;

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_observability(&config);

    let state = crate::create_app_state(&config);
    let metrics = init_metrics(&config.observability.metrics);
    let app = create_router(state.clone(), metrics);

    let shutdown = CancellationToken::new();
    let operator = spawn_operator(&config, &state, shutdown.child_token())?;

    let addr = build_socket_addr(&config)?;
    info!("Starting Teams API on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            super::shutdown_signal().await;
            signal_token.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = operator {
        if let Err(e) = handle.await {
            warn!(error = %e, "Embedded operator task ended abnormally");
        }
    }

    shutdown_tracing();
    info!("Teams API shutdown complete");

    Ok(())
}

/// Start the reconciler against the in-process service when enabled
fn spawn_operator(
    config: &AppConfig,
    state: &AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    if !config.operator.enabled {
        return Ok(None);
    }

    let backend: Arc<dyn TeamsBackend> = state.team_service.clone();
    let reconciler = Arc::new(Reconciler::new(
        config.operator.source()?,
        backend,
        config.reconciler_settings(),
    ));

    info!("Embedded operator enabled");

    Ok(Some(reconciler.spawn(shutdown)))
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
