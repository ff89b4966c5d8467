//! Presence Relay: live online/offline relay for one messaging account.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tracing_subscriber::{EnvFilter, fmt};

use relay_core::config::AppConfig;
use relay_core::error::AppError;
use relay_core::traits::AccountSession;
use relay_realtime::server::RealtimeEngine;

const ENV_VAR: &str = "RELAY_ENV";

#[tokio::main]
async fn main() {
    let env = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(kind = %e.kind, "Relay stopped: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Account session backing the tracker.
#[cfg(not(feature = "mock"))]
fn build_session(config: &AppConfig) -> Result<Arc<dyn AccountSession>, AppError> {
    tracing::info!(base_url = %config.gateway.base_url, "Using account gateway");
    let session = relay_gateway::GatewaySession::new(&config.gateway)?;
    Ok(Arc::new(session))
}

/// Account session backing the tracker.
#[cfg(feature = "mock")]
fn build_session(config: &AppConfig) -> Result<Arc<dyn AccountSession>, AppError> {
    use relay_core::events::AccountStatus;
    use relay_core::types::Identity;

    tracing::warn!("Using in-memory account session (mock feature enabled)");
    let session = relay_gateway::MemorySession::new().with_contact(
        &config.target.identifier,
        Identity::new(1).with_display_name(config.target.name.clone()),
        AccountStatus::offline_unknown(),
    );
    Ok(Arc::new(session))
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Presence Relay v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(config);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    // ── Step 1: Engine and tracker worker ────────────────────────
    let engine = Arc::new(RealtimeEngine::new(Arc::clone(&config)));
    let session = build_session(&config)?;
    let mut tracker = engine.spawn_tracker(session);
    tracing::info!(identifier = %config.target.identifier, "Tracker worker started");

    // ── Step 2: HTTP server ──────────────────────────────────────
    let app_state = relay_api::AppState::new(Arc::clone(&config), Arc::clone(&engine));
    let app = relay_api::build_router(app_state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Presence Relay listening on {}", addr);

    // ── Step 3: Graceful shutdown ────────────────────────────────
    let shutdown_engine = Arc::clone(&engine);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_engine.shutdown();
        })
        .into_future();
    tokio::pin!(server);

    let tracker_finished = tokio::select! {
        result = &mut server => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
            false
        }
        outcome = &mut tracker => {
            if let Err(e) = worker_outcome(outcome) {
                engine.shutdown();
                return Err(e);
            }
            (&mut server)
                .await
                .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
            true
        }
    };

    // ── Step 4: Wait for the tracker ─────────────────────────────
    if !tracker_finished {
        engine.shutdown();
        match tokio::time::timeout(grace, tracker).await {
            Ok(outcome) => worker_outcome(outcome)?,
            Err(_) => tracing::warn!("Tracker worker did not stop within the grace period"),
        }
    }

    tracing::info!("Presence Relay shut down gracefully");
    Ok(())
}

/// A failed or panicked tracker worker is fatal.
fn worker_outcome(outcome: Result<Result<(), AppError>, JoinError>) -> Result<(), AppError> {
    match outcome {
        Ok(result) => result,
        Err(e) => Err(AppError::internal(format!("Tracker worker panicked: {}", e))),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
