//! Forgeline API Server
//!
//! Main entry point for the Forgeline ledger service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forgeline_api::{AppState, create_router};
use forgeline_core::ledger::seed_chart;
use forgeline_db::{PgAccountRegistry, PgJournalStore, connect};
use forgeline_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgeline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let state = match config.database.url.as_deref() {
        Some(url) => {
            let db = connect(url, &config.database).await?;
            info!(
                max_connections = config.database.max_connections,
                "Connected to database"
            );
            AppState::new(
                Arc::new(PgAccountRegistry::new(db.clone())),
                Arc::new(PgJournalStore::new(db)),
                config.ledger.clone(),
            )
        }
        None => {
            warn!("No database URL configured, using in-memory stores");
            AppState::in_memory(config.ledger.clone())
        }
    };

    if config.ledger.seed_default_chart {
        let created = seed_chart(state.accounts.as_ref()).await?;
        info!(created, "Default chart of accounts ready");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
