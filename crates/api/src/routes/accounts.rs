//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use forgeline_core::ledger::{LedgerError, NewAccount};
use forgeline_shared::types::AccountCode;

use super::error_response;
use crate::{AppState, extractors::ApiJson};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Account code, e.g. `CASH`.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Account type: asset, liability, equity, revenue, expense.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Parent account code for hierarchical grouping.
    pub parent_id: Option<String>,
}

/// POST `/accounts` - Create an account with a zero balance.
async fn create_account(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateAccountRequest>,
) -> Response {
    let input = match NewAccount::parse(
        &payload.id,
        &payload.name,
        &payload.account_type,
        payload.parent_id.as_deref(),
    ) {
        Ok(input) => input,
        Err(e) => return error_response(&e),
    };

    match state.accounts.create(input).await {
        Ok(account) => {
            info!(account = %account.id, account_type = %account.account_type, "Account created");
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/accounts/{account_id}` - One account with its cached balance.
async fn get_account(State(state): State<AppState>, Path(account_id): Path<String>) -> Response {
    let id = match AccountCode::new(&account_id) {
        Ok(id) => id,
        Err(e) => return error_response(&LedgerError::from(e)),
    };

    match state.accounts.get(&id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => error_response(&e),
    }
}
