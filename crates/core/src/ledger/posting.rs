//! The single entry point for recording money movement.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::balance::BalanceSynchronizer;
use super::entry::NewJournalEntry;
use super::error::LedgerError;
use super::journal::JournalStore;
use super::registry::AccountRegistry;
use super::types::{PostingOutcome, PostingRequest};
use super::validation::LedgerValidator;

/// Validates, appends and then refreshes the touched balances.
pub struct PostingOrchestrator {
    accounts: Arc<dyn AccountRegistry>,
    journal: Arc<dyn JournalStore>,
    synchronizer: Arc<BalanceSynchronizer>,
    reject_unknown_accounts: bool,
}

impl PostingOrchestrator {
    /// Creates an orchestrator.
    ///
    /// With `reject_unknown_accounts`, lines naming an account missing from
    /// the registry fail with `AccountNotFound` before anything is written.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRegistry>,
        journal: Arc<dyn JournalStore>,
        synchronizer: Arc<BalanceSynchronizer>,
        reject_unknown_accounts: bool,
    ) -> Self {
        Self {
            accounts,
            journal,
            synchronizer,
            reject_unknown_accounts,
        }
    }

    /// Records a posting.
    ///
    /// The entry is durable once appended: balance refresh failures are
    /// reported in the outcome's sync report and never roll the entry back.
    ///
    /// # Errors
    ///
    /// - `EmptyEntry` / `UnbalancedEntry` if the lines do not balance
    /// - `AccountNotFound` for unknown accounts when configured to reject them
    /// - `DuplicatePosting` if the idempotency key was already used
    /// - `Storage` if the append fails
    #[instrument(skip(self, request), fields(
        lines = request.lines.len(),
        linked_doc = request.linked_doc.as_deref(),
    ))]
    pub async fn post(&self, request: PostingRequest) -> Result<PostingOutcome, LedgerError> {
        let totals = LedgerValidator::validate(&request.lines)?;
        if self.reject_unknown_accounts {
            LedgerValidator::validate_accounts(&request.lines, self.accounts.as_ref()).await?;
        }

        let affected = request.affected_accounts();
        let now = Utc::now();
        let entry = self
            .journal
            .append(NewJournalEntry {
                date: now,
                linked_doc: request.linked_doc,
                description: request.description,
                idempotency_key: request.idempotency_key,
                lines: request.lines,
            })
            .await?;

        info!(entry_id = %entry.id, debits = %totals.debits, "Journal entry appended");

        let sync = self.synchronizer.sync_many(&affected).await;
        if !sync.is_clean() {
            warn!(
                entry_id = %entry.id,
                failed = sync.errors.len(),
                "Posting recorded with stale balances"
            );
        }

        Ok(PostingOutcome {
            entry,
            totals,
            sync,
        })
    }
}
