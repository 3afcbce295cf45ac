//! Journal line and journal entry domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgeline_shared::types::{AccountCode, JournalEntryId};

use super::error::LedgerError;

/// Amount of a journal line: exactly one side, strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAmount {
    /// Debit amount.
    Debit(Decimal),
    /// Credit amount.
    Credit(Decimal),
}

/// One line of a journal entry.
///
/// On the wire a line is `{account_id, debit, credit, description}` with
/// missing amounts read as zero. Exactly one of `debit`/`credit` must be
/// non-zero and neither may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JournalLineWire", into = "JournalLineWire")]
pub struct JournalLine {
    account_id: AccountCode,
    amount: LineAmount,
    description: String,
}

impl JournalLine {
    /// Creates a debit line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLine` if `amount` is not strictly positive.
    pub fn debit(
        account_id: AccountCode,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        ensure_positive(&account_id, amount)?;
        Ok(Self {
            account_id,
            amount: LineAmount::Debit(amount),
            description: description.into(),
        })
    }

    /// Creates a credit line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLine` if `amount` is not strictly positive.
    pub fn credit(
        account_id: AccountCode,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        ensure_positive(&account_id, amount)?;
        Ok(Self {
            account_id,
            amount: LineAmount::Credit(amount),
            description: description.into(),
        })
    }

    /// Builds a line from loose debit/credit columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLine` if either column is negative, or if both or
    /// neither are non-zero.
    pub fn from_columns(
        account_id: AccountCode,
        debit: Decimal,
        credit: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if debit < Decimal::ZERO || credit < Decimal::ZERO {
            return Err(LedgerError::InvalidLine(format!(
                "line for {account_id} has a negative amount"
            )));
        }
        match (debit.is_zero(), credit.is_zero()) {
            (false, true) => Self::debit(account_id, debit, description),
            (true, false) => Self::credit(account_id, credit, description),
            (false, false) => Err(LedgerError::InvalidLine(format!(
                "line for {account_id} sets both debit and credit"
            ))),
            (true, true) => Err(LedgerError::InvalidLine(format!(
                "line for {account_id} has neither debit nor credit"
            ))),
        }
    }

    /// The account this line posts to.
    #[must_use]
    pub fn account_id(&self) -> &AccountCode {
        &self.account_id
    }

    /// The tagged amount.
    #[must_use]
    pub fn amount(&self) -> LineAmount {
        self.amount
    }

    /// Debit amount, zero for credit lines.
    #[must_use]
    pub fn debit_amount(&self) -> Decimal {
        match self.amount {
            LineAmount::Debit(amount) => amount,
            LineAmount::Credit(_) => Decimal::ZERO,
        }
    }

    /// Credit amount, zero for debit lines.
    #[must_use]
    pub fn credit_amount(&self) -> Decimal {
        match self.amount {
            LineAmount::Credit(amount) => amount,
            LineAmount::Debit(_) => Decimal::ZERO,
        }
    }

    /// Free-text line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

fn ensure_positive(account_id: &AccountCode, amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidLine(format!(
            "line for {account_id} must have a positive amount, got {amount}"
        )));
    }
    Ok(())
}

/// Wire shape of a journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalLineWire {
    account_id: AccountCode,
    #[serde(default)]
    debit: Decimal,
    #[serde(default)]
    credit: Decimal,
    #[serde(default)]
    description: String,
}

impl TryFrom<JournalLineWire> for JournalLine {
    type Error = LedgerError;

    fn try_from(wire: JournalLineWire) -> Result<Self, Self::Error> {
        Self::from_columns(wire.account_id, wire.debit, wire.credit, wire.description)
    }
}

impl From<JournalLine> for JournalLineWire {
    fn from(line: JournalLine) -> Self {
        Self {
            debit: line.debit_amount(),
            credit: line.credit_amount(),
            account_id: line.account_id,
            description: line.description,
        }
    }
}

/// An appended, immutable journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry identifier (UUID v7, time-ordered).
    pub id: JournalEntryId,
    /// Business date of the entry.
    pub date: DateTime<Utc>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
    /// Reference to the business document that caused the posting.
    pub linked_doc: Option<String>,
    /// Optional entry-level description.
    pub description: Option<String>,
    /// Caller-supplied token that makes retries safe.
    pub idempotency_key: Option<String>,
    /// Balanced set of lines.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Lines that post to `account_id`.
    pub fn lines_for<'a>(
        &'a self,
        account_id: &'a AccountCode,
    ) -> impl Iterator<Item = &'a JournalLine> + 'a {
        self.lines
            .iter()
            .filter(move |line| line.account_id() == account_id)
    }
}

/// A validated entry waiting to be appended.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    /// Business date of the entry.
    pub date: DateTime<Utc>,
    /// Reference to the business document that caused the posting.
    pub linked_doc: Option<String>,
    /// Optional entry-level description.
    pub description: Option<String>,
    /// Caller-supplied token that makes retries safe.
    pub idempotency_key: Option<String>,
    /// Balanced set of lines.
    pub lines: Vec<JournalLine>,
}

impl NewJournalEntry {
    /// Stamps the entry with its identity, producing the stored form.
    #[must_use]
    pub fn into_entry(self, id: JournalEntryId, created_at: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id,
            date: self.date,
            created_at,
            linked_doc: self.linked_doc,
            description: self.description,
            idempotency_key: self.idempotency_key,
            lines: self.lines,
        }
    }
}
