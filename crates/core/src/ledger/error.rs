//! Ledger error types.
//!
//! Validation errors are raised before anything is written. Storage errors
//! are fatal for the operation in progress. Account errors raised while
//! synchronizing balances are absorbed per account by the synchronizer
//! and never fail a posting.

use rust_decimal::Decimal;
use thiserror::Error;

use forgeline_shared::types::{AccountCode, AccountCodeError, JournalEntryId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal entry has no lines.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Debits and credits differ by more than the balance tolerance.
    #[error("Debits ({}) do not equal Credits ({})", .debits.normalize(), .credits.normalize())]
    UnbalancedEntry {
        /// Sum of all debit amounts.
        debits: Decimal,
        /// Sum of all credit amounts.
        credits: Decimal,
    },

    /// A journal line is malformed (negative, both sides, or no side set).
    #[error("Invalid journal line: {0}")]
    InvalidLine(String),

    /// A debit or credit total, or an account balance, exceeds the decimal range.
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Account code failed to parse.
    #[error("Invalid account code: {0}")]
    InvalidAccountCode(String),

    /// Account type is not one of the five supported kinds.
    #[error("Invalid account type '{0}'. Must be one of: asset, liability, equity, revenue, expense")]
    InvalidAccountType(String),

    // ========== Account Errors ==========
    /// Account not found in the chart of accounts.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountCode),

    /// Account code already exists.
    #[error("Account '{0}' already exists")]
    DuplicateAccount(AccountCode),

    /// Parent account referenced at creation does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountCode),

    // ========== Posting Errors ==========
    /// A posting with the same idempotency key was already recorded.
    #[error("Posting with idempotency key '{key}' already recorded as entry {existing}")]
    DuplicatePosting {
        /// The repeated idempotency key.
        key: String,
        /// The entry recorded by the first submission.
        existing: JournalEntryId,
    },

    // ========== Storage Errors ==========
    /// Read or append against the backing store failed.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InvalidLine(_) => "INVALID_LINE",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::InvalidAccountType(_) => "INVALID_ACCOUNT_TYPE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DuplicatePosting { .. } => "DUPLICATE_POSTING",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyEntry
            | Self::UnbalancedEntry { .. }
            | Self::InvalidLine(_)
            | Self::AmountOverflow(_)
            | Self::InvalidAccountCode(_)
            | Self::InvalidAccountType(_)
            | Self::ParentNotFound(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateAccount(_) | Self::DuplicatePosting { .. } => 409,

            // 500 Internal Server Error
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if the failed operation may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<AccountCodeError> for LedgerError {
    fn from(err: AccountCodeError) -> Self {
        Self::InvalidAccountCode(err.to_string())
    }
}

impl From<LedgerError> for forgeline_shared::AppError {
    fn from(err: LedgerError) -> Self {
        use forgeline_shared::AppError;

        let message = err.to_string();
        match err.http_status_code() {
            404 => AppError::NotFound(message),
            409 => AppError::Conflict(message),
            400 => AppError::Validation(message),
            _ => AppError::Database(message),
        }
    }
}
