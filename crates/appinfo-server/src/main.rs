//! appinfo server
//!
//! - `GET /info`: runtime / OS / server versions
//! - `GET /metrics`: registry populated at startup, detached at shutdown
//! - Graceful shutdown on Ctrl-C

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use appinfo_core::error::{AppInfoError, Result};
use appinfo_server::{
    app_state::AppState, config, context::ServerContext, lifecycle::MetricsLifecycle, obs,
    obs::metrics::MetricsHub, router,
};

#[tokio::main]
async fn main() -> ExitCode {
    obs::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "appinfo-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = config::resolve_path(std::env::args().nth(1));
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| AppInfoError::BadRequest(format!("server.listen: {e}")))?;

    let hub = Arc::new(MetricsHub::new());
    let mut ctx = ServerContext::from_config(&cfg);
    let lifecycle = MetricsLifecycle::new(cfg.metrics);
    lifecycle.context_initialized(&mut ctx, &hub).await;

    let state = AppState::new(&ctx, Arc::clone(&hub));
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "appinfo-server starting");
    let served = match tokio::net::TcpListener::bind(listen).await {
        Ok(listener) => axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(state))
            .await
            .map_err(|e| AppInfoError::Internal(format!("server failed: {e}"))),
        Err(e) => Err(AppInfoError::Internal(format!("bind {listen} failed: {e}"))),
    };

    lifecycle.context_destroyed(&mut ctx, &hub);
    served
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}
