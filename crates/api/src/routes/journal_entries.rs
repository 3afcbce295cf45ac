//! Journal entry routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use forgeline_core::ledger::{JournalEntry, JournalLine, PostingOutcome, PostingRequest};
use forgeline_shared::types::{AccountCode, JournalEntryId};

use super::error_response;
use crate::{AppState, extractors::ApiJson};

/// Upper bound on `GET /journal-entries?limit=`.
pub const MAX_RECENT_ENTRIES: usize = 500;

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/journal-entries",
        get(list_journal_entries).post(create_journal_entry),
    )
}

/// Request body for posting a journal entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalEntryRequest {
    /// Lines of the entry.
    pub entries: Vec<JournalLine>,
    /// Business document reference.
    pub linked_doc: Option<String>,
    /// Entry-level description.
    pub description: Option<String>,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Response for a successful posting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingResponse {
    /// Id of the appended entry.
    pub journal_entry_id: JournalEntryId,
    /// Lines as stored.
    pub entries: Vec<JournalLine>,
    /// Accounts whose balance could not be refreshed.
    pub sync_errors: BTreeMap<AccountCode, String>,
}

impl From<PostingOutcome> for PostingResponse {
    fn from(outcome: PostingOutcome) -> Self {
        Self {
            journal_entry_id: outcome.entry.id,
            entries: outcome.entry.lines,
            sync_errors: outcome.sync.errors,
        }
    }
}

/// Query parameters for listing journal entries.
#[derive(Debug, Deserialize)]
pub struct ListJournalEntriesQuery {
    /// Number of entries (default from config, max 500).
    pub limit: Option<usize>,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Business date.
    pub date: DateTime<Utc>,
    /// Lines of the entry.
    pub entries: Vec<JournalLine>,
    /// Business document reference.
    pub linked_doc: Option<String>,
    /// Entry-level description.
    pub description: Option<String>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            entries: entry.lines,
            linked_doc: entry.linked_doc,
            description: entry.description,
            created_at: entry.created_at,
        }
    }
}

/// Posts a request through the orchestrator and renders `201` or the error.
pub(crate) async fn post_and_respond(state: &AppState, request: PostingRequest) -> Response {
    match state.orchestrator.post(request).await {
        Ok(outcome) => {
            info!(
                entry_id = %outcome.entry.id,
                sync_errors = outcome.sync.errors.len(),
                "Posting recorded"
            );
            (StatusCode::CREATED, Json(PostingResponse::from(outcome))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/journal-entries` - Validate, append and sync a journal entry.
async fn create_journal_entry(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateJournalEntryRequest>,
) -> Response {
    let request = PostingRequest {
        lines: payload.entries,
        linked_doc: payload.linked_doc,
        description: payload.description,
        idempotency_key: payload.idempotency_key,
    };
    post_and_respond(&state, request).await
}

/// GET `/journal-entries` - Most recent entries, newest first.
async fn list_journal_entries(
    State(state): State<AppState>,
    Query(query): Query<ListJournalEntriesQuery>,
) -> Response {
    let default_limit = usize::try_from(state.config.recent_entries_limit).unwrap_or(MAX_RECENT_ENTRIES);
    let limit = query.limit.unwrap_or(default_limit).min(MAX_RECENT_ENTRIES);

    match state.journal.recent(limit).await {
        Ok(entries) => {
            let response: Vec<JournalEntryResponse> =
                entries.into_iter().map(JournalEntryResponse::from).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}
