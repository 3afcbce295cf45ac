//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use forgeline_core::ledger::LedgerError;

use crate::AppState;

pub mod accounts;
pub mod balances;
pub mod health;
pub mod journal_entries;
pub mod postings;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(journal_entries::routes())
        .merge(balances::routes())
        .merge(accounts::routes())
        .merge(postings::routes())
}

/// Renders a ledger error as `{"error", "message"}` with its status code.
pub(crate) fn error_response(err: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "Ledger operation failed");
    }

    let mut body = json!({
        "error": err.error_code().to_ascii_lowercase(),
        "message": err.to_string(),
    });
    if let LedgerError::DuplicatePosting { existing, .. } = err {
        body["journalEntryId"] = json!(existing);
    }

    (status, Json(body)).into_response()
}

/// Renders a `400` for a request the handler rejects itself.
pub(crate) fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_request",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgeline_shared::types::{AccountCode, JournalEntryId};
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[case(LedgerError::EmptyEntry, StatusCode::BAD_REQUEST, "empty_entry")]
    #[case(
        LedgerError::AccountNotFound(AccountCode::from_static("CASH")),
        StatusCode::NOT_FOUND,
        "account_not_found"
    )]
    #[case(
        LedgerError::DuplicateAccount(AccountCode::from_static("CASH")),
        StatusCode::CONFLICT,
        "duplicate_account"
    )]
    #[case(
        LedgerError::Storage("disk full".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_failure"
    )]
    #[tokio::test]
    async fn test_error_response_shape(
        #[case] err: LedgerError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = error_response(&err);
        assert_eq!(response.status(), status);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], code);
        assert_eq!(body["message"], err.to_string());
    }

    #[test]
    fn test_duplicate_posting_is_conflict() {
        let err = LedgerError::DuplicatePosting {
            key: "k".into(),
            existing: JournalEntryId::new(),
        };
        assert_eq!(error_response(&err).status(), StatusCode::CONFLICT);
    }
}
