//! Balance read and synchronization routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use forgeline_core::ledger::{AccountType, SyncReport};
use forgeline_shared::types::AccountCode;

use super::{bad_request, error_response};
use crate::{AppState, extractors::ApiJson};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balances", get(list_balances))
        .route("/sync-balances", post(sync_balances))
}

/// Request body for `POST /sync-balances`.
///
/// Exactly one of `accountIds` or `syncAll: true` must be given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBalancesRequest {
    /// Accounts to recompute.
    pub account_ids: Option<Vec<AccountCode>>,
    /// Recompute every account.
    #[serde(default)]
    pub sync_all: bool,
}

/// Response for `POST /sync-balances`.
#[derive(Debug, Serialize)]
pub struct SyncBalancesResponse {
    /// Balance per account; failed accounts read as zero.
    pub results: BTreeMap<AccountCode, Decimal>,
    /// Error note per failed account.
    pub errors: BTreeMap<AccountCode, String>,
}

impl From<SyncReport> for SyncBalancesResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            results: report.results,
            errors: report.errors,
        }
    }
}

/// One row of `GET /balances`.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Account code.
    pub id: AccountCode,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Cached balance as of the last sync.
    pub balance: Decimal,
}

/// GET `/balances` - Every account with its cached balance.
async fn list_balances(State(state): State<AppState>) -> Response {
    match state.accounts.list().await {
        Ok(accounts) => {
            let response: Vec<BalanceResponse> = accounts
                .into_iter()
                .map(|a| BalanceResponse {
                    id: a.id,
                    name: a.name,
                    account_type: a.account_type,
                    balance: a.balance,
                })
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/sync-balances` - Recompute balances from the journal.
async fn sync_balances(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SyncBalancesRequest>,
) -> Response {
    let report = match (payload.account_ids, payload.sync_all) {
        (Some(ids), false) => state.synchronizer.sync_many(&ids).await,
        (None, true) => match state.synchronizer.sync_all().await {
            Ok(report) => report,
            Err(e) => return error_response(&e),
        },
        _ => return bad_request("Provide exactly one of accountIds or syncAll"),
    };

    info!(
        synced = report.results.len(),
        failed = report.errors.len(),
        "Balances synchronized"
    );
    (StatusCode::OK, Json(SyncBalancesResponse::from(report))).into_response()
}
