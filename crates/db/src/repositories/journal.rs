//! Journal repository backed by `journal_entries` and `journal_lines`.
//!
//! An entry row and its line rows are inserted in one database transaction,
//! so a failed append leaves nothing visible.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};

use forgeline_core::ledger::{JournalEntry, JournalLine, JournalStore, LedgerError, NewJournalEntry};
use forgeline_shared::types::{AccountCode, JournalEntryId};

use super::{is_unique_violation, storage};
use crate::entities::{journal_entries, journal_lines};

/// Append-only journal stored in Postgres.
#[derive(Debug, Clone)]
pub struct PgJournalStore {
    db: DatabaseConnection,
}

impl PgJournalStore {
    /// Creates a new journal store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_entry(
        txn: &DatabaseTransaction,
        entry: &JournalEntry,
    ) -> Result<(), sea_orm::DbErr> {
        let lines = serde_json::to_value(&entry.lines)
            .map_err(|e| sea_orm::DbErr::Custom(format!("failed to encode lines: {e}")))?;

        journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            entry_date: Set(entry.date.fixed_offset()),
            created_at: Set(entry.created_at.fixed_offset()),
            linked_doc: Set(entry.linked_doc.clone()),
            description: Set(entry.description.clone()),
            idempotency_key: Set(entry.idempotency_key.clone()),
            lines: Set(lines),
        }
        .insert(txn)
        .await?;

        let rows = entry
            .lines
            .iter()
            .zip(0i32..)
            .map(|(line, line_no)| journal_lines::ActiveModel {
                entry_id: Set(entry.id.into_inner()),
                line_no: Set(line_no),
                account_id: Set(line.account_id().as_str().to_owned()),
                debit: Set(line.debit_amount()),
                credit: Set(line.credit_amount()),
                description: Set(line.description().to_owned()),
                ..Default::default()
            });
        journal_lines::Entity::insert_many(rows).exec(txn).await?;

        Ok(())
    }

    async fn duplicate_of(&self, key: &str) -> Result<LedgerError, LedgerError> {
        let existing = self.find_by_idempotency_key(key).await?.ok_or_else(|| {
            LedgerError::Storage(format!("idempotency key '{key}' conflicted but was not found"))
        })?;
        Ok(LedgerError::DuplicatePosting {
            key: key.to_owned(),
            existing: existing.id,
        })
    }
}

/// Converts a stored row into the domain entry.
///
/// # Errors
///
/// Returns `Storage` if the JSONB lines no longer decode.
pub fn entry_from_model(model: journal_entries::Model) -> Result<JournalEntry, LedgerError> {
    let lines: Vec<JournalLine> = serde_json::from_value(model.lines).map_err(|e| {
        LedgerError::Storage(format!("corrupt lines on journal entry {}: {e}", model.id))
    })?;

    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        date: model.entry_date.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        linked_doc: model.linked_doc,
        description: model.description,
        idempotency_key: model.idempotency_key,
        lines,
    })
}

fn line_from_model(model: journal_lines::Model) -> Result<JournalLine, LedgerError> {
    let account_id = AccountCode::new(&model.account_id)
        .map_err(|e| LedgerError::Storage(format!("corrupt journal line {}: {e}", model.id)))?;
    JournalLine::from_columns(account_id, model.debit, model.credit, model.description)
        .map_err(|e| LedgerError::Storage(format!("corrupt journal line {}: {e}", model.id)))
}

#[async_trait]
impl JournalStore for PgJournalStore {
    #[instrument(skip(self, entry), fields(lines = entry.lines.len()))]
    async fn append(&self, entry: NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        if let Some(key) = &entry.idempotency_key {
            if self.find_by_idempotency_key(key).await?.is_some() {
                return Err(self.duplicate_of(key).await?);
            }
        }

        let entry = entry.into_entry(JournalEntryId::new(), Utc::now());

        let txn = self.db.begin().await.map_err(storage)?;
        if let Err(e) = Self::insert_entry(&txn, &entry).await {
            // Dropping the transaction rolls it back.
            drop(txn);
            return match &entry.idempotency_key {
                Some(key) if is_unique_violation(&e) => Err(self.duplicate_of(key).await?),
                _ => Err(storage(e)),
            };
        }
        txn.commit().await.map_err(storage)?;

        info!(entry_id = %entry.id, "Journal entry persisted");
        Ok(entry)
    }

    async fn all(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        journal_entries::Entity::find()
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(entry_from_model)
            .collect()
    }

    async fn lines_for(&self, account_id: &AccountCode) -> Result<Vec<JournalLine>, LedgerError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(account_id.as_str()))
            .order_by_asc(journal_lines::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(line_from_model)
            .collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>, LedgerError> {
        journal_entries::Entity::find()
            .order_by_desc(journal_entries::Column::CreatedAt)
            .order_by_desc(journal_entries::Column::Id)
            .limit(u64::try_from(limit).unwrap_or(u64::MAX))
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(entry_from_model)
            .collect()
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::IdempotencyKey.eq(key))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(entry_from_model)
            .transpose()
    }
}
