//! Append-only journal store.
//!
//! The journal is the sole source of truth for financial history. There is
//! no update or delete; corrections are posted as offsetting entries.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use forgeline_shared::types::{AccountCode, JournalEntryId};

use super::entry::{JournalEntry, JournalLine, NewJournalEntry};
use super::error::LedgerError;

/// Append-only store of journal entries.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Appends a validated entry and returns it with its assigned id.
    ///
    /// The append is atomic: readers see all of the entry's lines or none.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePosting` if the idempotency key was already used,
    /// `Storage` if the write fails.
    async fn append(&self, entry: NewJournalEntry) -> Result<JournalEntry, LedgerError>;

    /// Full scan ordered by `created_at` ascending.
    async fn all(&self) -> Result<Vec<JournalEntry>, LedgerError>;

    /// Every line, across all entries, that posts to `account_id`.
    async fn lines_for(&self, account_id: &AccountCode) -> Result<Vec<JournalLine>, LedgerError>;

    /// The `limit` most recent entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>, LedgerError>;

    /// Looks up the entry recorded under an idempotency key.
    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<JournalEntry>, LedgerError>;
}

#[derive(Debug, Default)]
struct JournalLog {
    entries: Vec<JournalEntry>,
    /// account → (entry index, line index) for every line of that account.
    by_account: HashMap<AccountCode, Vec<(usize, usize)>>,
    by_idempotency_key: HashMap<String, usize>,
}

/// In-memory journal with a per-account line index.
///
/// Log and index are updated under one write lock, so an entry is never
/// partially visible and `lines_for` costs O(lines of that account).
#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    log: RwLock<JournalLog>,
}

impl InMemoryJournalStore {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for InMemoryJournalStore {
    async fn append(&self, entry: NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        let mut log = self.log.write().await;

        if let Some(key) = &entry.idempotency_key {
            if let Some(&index) = log.by_idempotency_key.get(key) {
                return Err(LedgerError::DuplicatePosting {
                    key: key.clone(),
                    existing: log.entries[index].id,
                });
            }
        }

        let entry = entry.into_entry(JournalEntryId::new(), Utc::now());
        let entry_index = log.entries.len();

        for (line_index, line) in entry.lines.iter().enumerate() {
            log.by_account
                .entry(line.account_id().clone())
                .or_default()
                .push((entry_index, line_index));
        }
        if let Some(key) = &entry.idempotency_key {
            log.by_idempotency_key.insert(key.clone(), entry_index);
        }
        log.entries.push(entry.clone());

        Ok(entry)
    }

    async fn all(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(self.log.read().await.entries.clone())
    }

    async fn lines_for(&self, account_id: &AccountCode) -> Result<Vec<JournalLine>, LedgerError> {
        let log = self.log.read().await;
        let lines = log
            .by_account
            .get(account_id)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&(entry, line)| log.entries[entry].lines[line].clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(lines)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>, LedgerError> {
        let log = self.log.read().await;
        Ok(log.entries.iter().rev().take(limit).cloned().collect())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let log = self.log.read().await;
        Ok(log
            .by_idempotency_key
            .get(key)
            .map(|&index| log.entries[index].clone()))
    }
}
