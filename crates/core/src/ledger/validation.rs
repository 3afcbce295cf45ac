//! Business rule validation for journal entries.

use rust_decimal::Decimal;

use super::entry::JournalLine;
use super::error::LedgerError;
use super::registry::AccountRegistry;
use super::types::EntryTotals;

/// Largest accepted gap between total debits and total credits (0.01).
///
/// Absorbs rounding in upstream calculations; not a business rule.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Stateless validation of a proposed entry's line set.
pub struct LedgerValidator;

impl LedgerValidator {
    /// Checks the double-entry invariant on `lines`.
    ///
    /// Per-line shape (one positive side) is already guaranteed by
    /// [`JournalLine`]; account existence is not checked here.
    ///
    /// # Errors
    ///
    /// Returns `EmptyEntry` for an empty set, `AmountOverflow` when a side's
    /// total leaves the decimal range, `UnbalancedEntry` when
    /// `|debits - credits| > 0.01`.
    pub fn validate(lines: &[JournalLine]) -> Result<EntryTotals, LedgerError> {
        if lines.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        let totals = EntryTotals::of(lines)?;
        if totals.difference().abs() > BALANCE_TOLERANCE {
            return Err(LedgerError::UnbalancedEntry {
                debits: totals.debits,
                credits: totals.credits,
            });
        }

        Ok(totals)
    }

    /// Checks every referenced account exists in the chart of accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for the first missing account, or a storage error.
    pub async fn validate_accounts(
        lines: &[JournalLine],
        registry: &dyn AccountRegistry,
    ) -> Result<(), LedgerError> {
        for line in lines {
            registry.get(line.account_id()).await?;
        }
        Ok(())
    }
}
