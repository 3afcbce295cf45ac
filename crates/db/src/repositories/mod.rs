//! Postgres implementations of the ledger repository traits.

pub mod account;
pub mod journal;

pub use account::PgAccountRegistry;
pub use journal::PgJournalStore;

use forgeline_core::ledger::LedgerError;
use sea_orm::{DbErr, SqlErr};

/// Maps a database error to a ledger storage failure.
pub(crate) fn storage(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

/// Returns true if the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
