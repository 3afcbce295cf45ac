//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for postings, journal reads and balances
//! - Request extractors
//! - Response types

pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use forgeline_core::ledger::{
    AccountRegistry, BalanceSynchronizer, InMemoryAccountRegistry, InMemoryJournalStore,
    JournalStore, PostingOrchestrator,
};
use forgeline_shared::LedgerConfig;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chart of accounts.
    pub accounts: Arc<dyn AccountRegistry>,
    /// Append-only journal.
    pub journal: Arc<dyn JournalStore>,
    /// Balance recomputation.
    pub synchronizer: Arc<BalanceSynchronizer>,
    /// Posting entry point.
    pub orchestrator: Arc<PostingOrchestrator>,
    /// Ledger behaviour switches.
    pub config: Arc<LedgerConfig>,
}

impl AppState {
    /// Wires the ledger services over the given stores.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRegistry>,
        journal: Arc<dyn JournalStore>,
        config: LedgerConfig,
    ) -> Self {
        let synchronizer = Arc::new(BalanceSynchronizer::new(
            Arc::clone(&accounts),
            Arc::clone(&journal),
        ));
        let orchestrator = Arc::new(PostingOrchestrator::new(
            Arc::clone(&accounts),
            Arc::clone(&journal),
            Arc::clone(&synchronizer),
            config.reject_unknown_accounts,
        ));
        Self {
            accounts,
            journal,
            synchronizer,
            orchestrator,
            config: Arc::new(config),
        }
    }

    /// State over fresh in-memory stores.
    #[must_use]
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            Arc::new(InMemoryAccountRegistry::new()),
            Arc::new(InMemoryJournalStore::new()),
            config,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
