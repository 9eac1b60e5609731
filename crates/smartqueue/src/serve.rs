// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smartqueue serve` command implementation.
//!
//! Wires configuration -> storage -> predictor -> engine -> gateway, then
//! serves until SIGINT/SIGTERM, closing storage on the way out. The
//! predictor is optional: with no API key configured the engine runs
//! entirely on local estimation heuristics.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use smartqueue_config::SmartqueueConfig;
use smartqueue_core::{PredictorAdapter, SmartqueueError};
use smartqueue_engine::{CanteenRegistry, ChangeSignal, QueueEngine};
use smartqueue_gateway::GatewayState;
use smartqueue_gemini::GeminiPredictor;
use smartqueue_storage::Database;

/// Initialize the tracing subscriber from config, honoring `RUST_LOG`.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Runs the `smartqueue serve` command.
pub async fn run_serve(config: SmartqueueConfig) -> Result<(), SmartqueueError> {
    init_tracing(&config.service.log_level);

    info!(service = config.service.name.as_str(), "starting smartqueue serve");

    // Open storage (runs migrations).
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    info!(path = config.storage.database_path.as_str(), "storage opened");

    // Construct the predictor when a key is configured; absence is a
    // supported mode, not an error.
    let predictor: Option<Arc<dyn PredictorAdapter>> =
        match GeminiPredictor::from_config(&config.predictor) {
            Ok(Some(predictor)) => {
                info!(model = config.predictor.model.as_str(), "predictor enabled");
                Some(Arc::new(predictor))
            }
            Ok(None) => {
                info!("no predictor API key configured, using local estimation only");
                None
            }
            Err(e) => {
                return Err(SmartqueueError::Config(format!(
                    "predictor configuration rejected: {e}"
                )));
            }
        };

    // Engine, registry, and gateway share one change signal.
    let signal = ChangeSignal::new();
    let registry = CanteenRegistry::new(Arc::clone(&db), signal.clone());
    let engine = Arc::new(QueueEngine::new(
        Arc::clone(&db),
        predictor,
        signal.clone(),
        config.engine.clone(),
    ));

    let state = GatewayState {
        engine,
        registry,
        signal,
    };

    // Serve until a shutdown signal arrives.
    let shutdown = install_signal_handler();
    smartqueue_gateway::start_server(&config.service.bind_address, state, shutdown).await?;

    // Flush storage on the way out.
    db.close().await?;
    info!("smartqueue stopped");
    Ok(())
}
