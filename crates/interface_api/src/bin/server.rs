//! Claims Adjudication - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_DATABASE_URL` or `DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Database pool size (default: 40)
//! * `API_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! * `API_DB_ACQUIRE_TIMEOUT_MS` - Wait for a pooled connection (default: 30000)
//! * `API_DB_IDLE_TIMEOUT_SECS` - Idle connection lifetime, 0 disables (default: 300)
//! * `API_DB_MAX_LIFETIME_SECS` - Connection recycle age, 0 disables (default: 1800)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_FRAUD_MULTIPLIER` - Fraud flag threshold ratio (default: 2.0)
//! * `API_SUBMIT_TIMEOUT_MS` - Per-submission deadline (default: 10000)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ClaimAdjudicationEngine;
use infra_db::{create_pool, run_migrations, PostgresLedger};
use interface_api::{config::ApiConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        fraud_multiplier = %config.fraud_multiplier,
        submit_timeout_ms = config.submit_timeout_ms,
        "Starting claims adjudication API server"
    );

    let pool = create_pool(config.database())
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool).await.context("failed to apply migrations")?;

    let ledger = Arc::new(PostgresLedger::new(pool));
    let engine = Arc::new(ClaimAdjudicationEngine::new(ledger, config.adjudication()));
    let app = create_router(engine, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads `API_*` configuration; a bare `DATABASE_URL` wins over the default
fn load_config() -> anyhow::Result<ApiConfig> {
    let mut config = ApiConfig::from_env().context("invalid API_* configuration")?;
    if std::env::var_os("API_DATABASE_URL").is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
    }
    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight submissions finish (commit or roll back) before the process
/// exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
