//! Property-based tests for the posting path.
//!
//! - Double-entry invariant: no stored entry is off by more than 0.01
//! - Validation outcome agrees with the tolerance for any line set

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use forgeline_shared::types::AccountCode;

use super::balance::BalanceSynchronizer;
use super::entry::JournalLine;
use super::error::LedgerError;
use super::journal::{InMemoryJournalStore, JournalStore};
use super::posting::PostingOrchestrator;
use super::registry::InMemoryAccountRegistry;
use super::types::{EntryTotals, PostingRequest};
use super::validation::{BALANCE_TOLERANCE, LedgerValidator};

const CODES: [&str; 4] = ["CASH", "INVENTORY", "ACCOUNTS_PAYABLE", "SALES_REVENUE"];

/// Strategy to generate amounts with up to three decimal places.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|mils| Decimal::new(mils, 3))
}

/// Strategy to generate one arbitrary line.
fn line() -> impl Strategy<Value = JournalLine> {
    (0..CODES.len(), amount(), any::<bool>()).prop_map(|(index, amount, is_debit)| {
        let code = AccountCode::from_static(CODES[index]);
        if is_debit {
            JournalLine::debit(code, amount, "").unwrap()
        } else {
            JournalLine::credit(code, amount, "").unwrap()
        }
    })
}

/// Strategy to generate a line set that is balanced up to a small skew.
fn nearly_balanced() -> impl Strategy<Value = Vec<JournalLine>> {
    (amount(), -20i64..=20i64).prop_map(|(amount, skew)| {
        let credit = amount + Decimal::new(skew, 3);
        let mut lines = vec![JournalLine::debit(AccountCode::from_static("CASH"), amount, "").unwrap()];
        if credit > Decimal::ZERO {
            lines.push(JournalLine::credit(AccountCode::from_static("SALES_REVENUE"), credit, "").unwrap());
        }
        lines
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Validation accepts exactly the line sets within tolerance.
    #[test]
    fn prop_validation_matches_tolerance(
        lines in prop::collection::vec(line(), 1..8),
    ) {
        let totals = EntryTotals::of(&lines).unwrap();
        let within = totals.difference().abs() <= BALANCE_TOLERANCE;
        match LedgerValidator::validate(&lines) {
            Ok(validated) => {
                prop_assert!(within);
                prop_assert_eq!(validated, totals);
            }
            Err(LedgerError::UnbalancedEntry { debits, credits }) => {
                prop_assert!(!within);
                prop_assert_eq!(debits, totals.debits);
                prop_assert_eq!(credits, totals.credits);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Whatever is submitted, every stored entry respects the tolerance.
    #[test]
    fn prop_journal_never_holds_unbalanced_entry(
        requests in prop::collection::vec(
            prop_oneof![prop::collection::vec(line(), 1..5), nearly_balanced()],
            1..10,
        ),
    ) {
        runtime().block_on(async {
            let registry = Arc::new(InMemoryAccountRegistry::new());
            let journal = Arc::new(InMemoryJournalStore::new());
            let synchronizer = Arc::new(BalanceSynchronizer::new(registry.clone(), journal.clone()));
            let orchestrator =
                PostingOrchestrator::new(registry, journal.clone(), synchronizer, false);

            let mut accepted = 0usize;
            for lines in requests {
                if orchestrator.post(PostingRequest::new(lines)).await.is_ok() {
                    accepted += 1;
                }
            }

            let stored = journal.all().await.unwrap();
            assert_eq!(stored.len(), accepted);
            for entry in stored {
                let totals = EntryTotals::of(&entry.lines).unwrap();
                assert!(totals.difference().abs() <= BALANCE_TOLERANCE);
            }
        });
    }
}
