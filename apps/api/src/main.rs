//! # relist API
//!
//! HTTP server for the resale profit calculator.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        relist API Server                                │
//! │                                                                         │
//! │  Client ───► HTTP (8080) ───► CalculationEngine ───► SQLite            │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                            policy resolution                            │
//! │                         (fx / fees / tax fan-out)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use relist_db::{Database, DbConfig};
use relist_engine::{
    CalculationEngine, EngineConfig, LogBackedCounter, SqliteGateway, SqlitePolicySource,
};

use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub engine: CalculationEngine,
    pub db: Database,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting relist API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite, migrations complete");

    // Wire the engine
    let engine = CalculationEngine::new(
        Arc::new(SqlitePolicySource::new(db.clone())),
        Arc::new(LogBackedCounter::new(db.clone())),
        Arc::new(SqliteGateway::new(db.clone())),
        EngineConfig {
            rate_limit_window_secs: config.rate_limit_window_secs,
            rate_limit_ceiling: config.rate_limit_ceiling,
        },
    );

    let state = Arc::new(AppState { engine, db });
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
