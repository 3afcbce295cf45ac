//! Input and result types for postings and balance synchronization.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use forgeline_shared::types::AccountCode;

use super::entry::{JournalEntry, JournalLine};
use super::error::LedgerError;

/// Debit and credit totals of a line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryTotals {
    /// Sum of debit amounts.
    pub debits: Decimal,
    /// Sum of credit amounts.
    pub credits: Decimal,
}

impl EntryTotals {
    /// Sums the debit and credit sides of `lines`.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if either side exceeds the decimal range.
    pub fn of(lines: &[JournalLine]) -> Result<Self, LedgerError> {
        Ok(Self {
            debits: checked_total(lines.iter().map(JournalLine::debit_amount), "debits")?,
            credits: checked_total(lines.iter().map(JournalLine::credit_amount), "credits")?,
        })
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debits - self.credits
    }
}

fn checked_total(
    amounts: impl Iterator<Item = Decimal>,
    side: &str,
) -> Result<Decimal, LedgerError> {
    amounts.fold(Ok(Decimal::ZERO), |total, amount| {
        total?
            .checked_add(amount)
            .ok_or_else(|| LedgerError::AmountOverflow(format!("total {side} exceed {}", Decimal::MAX)))
    })
}

/// A request to record money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingRequest {
    /// Lines of the entry; must balance.
    pub lines: Vec<JournalLine>,
    /// Business document that caused the posting (invoice, work order, ...).
    pub linked_doc: Option<String>,
    /// Optional entry-level description.
    pub description: Option<String>,
    /// Caller-generated token; a second posting with the same key is rejected.
    pub idempotency_key: Option<String>,
}

impl PostingRequest {
    /// Creates a request with no references attached.
    #[must_use]
    pub fn new(lines: Vec<JournalLine>) -> Self {
        Self {
            lines,
            linked_doc: None,
            description: None,
            idempotency_key: None,
        }
    }

    /// Attaches the business document reference.
    #[must_use]
    pub fn with_linked_doc(mut self, linked_doc: impl Into<String>) -> Self {
        self.linked_doc = Some(linked_doc.into());
        self
    }

    /// Attaches an entry-level description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches an idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Distinct accounts touched by the lines, in first-seen order.
    #[must_use]
    pub fn affected_accounts(&self) -> Vec<AccountCode> {
        let mut seen = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !seen.contains(line.account_id()) {
                seen.push(line.account_id().clone());
            }
        }
        seen
    }
}

/// Result of a successful posting.
///
/// The entry is durable even when `sync` reports failures; those balances
/// are repaired by a later full reconciliation.
#[derive(Debug, Clone)]
pub struct PostingOutcome {
    /// The appended entry.
    pub entry: JournalEntry,
    /// Validated totals of the entry.
    pub totals: EntryTotals,
    /// Balance refresh of the touched accounts.
    pub sync: SyncReport,
}

/// Outcome of a batch balance synchronization.
///
/// Failures are per account: a failed account is reported with a zero
/// balance in `results` and a note in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Computed balance per account.
    pub results: BTreeMap<AccountCode, Decimal>,
    /// Error note per failed account.
    pub errors: BTreeMap<AccountCode, String>,
    /// False when a reconciliation was cancelled before reaching the end.
    pub completed: bool,
    /// Last account processed before cancellation; pass it back to resume.
    pub resume_after: Option<AccountCode>,
}

impl SyncReport {
    /// Creates an empty, completed report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            completed: true,
            ..Self::default()
        }
    }

    /// Records a successfully synchronized account.
    pub fn record_balance(&mut self, account: AccountCode, balance: Decimal) {
        self.results.insert(account, balance);
    }

    /// Records a failed account as zero with an error note.
    pub fn record_failure(&mut self, account: AccountCode, error: impl ToString) {
        self.results.insert(account.clone(), Decimal::ZERO);
        self.errors.insert(account, error.to_string());
    }

    /// Returns true if every account synchronized.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
