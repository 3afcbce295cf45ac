//! Property-based tests for balance derivation.
//!
//! - Balance invariant: a synchronized balance equals the fold of the
//!   account's journal lines under its sign convention
//! - Commutativity: the order in which entries were posted does not matter
//! - Idempotence: repeated synchronization yields the same balance

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use forgeline_shared::types::{AccountCode, JournalEntryId};

use super::account::{AccountType, NewAccount};
use super::balance::{BalanceSynchronizer, balance_from_entries, fold_balance};
use super::entry::{JournalEntry, JournalLine, NewJournalEntry};
use super::journal::{InMemoryJournalStore, JournalStore};
use super::registry::{AccountRegistry, InMemoryAccountRegistry};

const ACCOUNTS: [(&str, AccountType); 5] = [
    ("CASH", AccountType::Asset),
    ("ACCOUNTS_PAYABLE", AccountType::Liability),
    ("OWNER_EQUITY", AccountType::Equity),
    ("SALES_REVENUE", AccountType::Revenue),
    ("GENERAL_EXPENSES", AccountType::Expense),
];

/// Strategy to generate positive amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_index() -> impl Strategy<Value = usize> {
    0..ACCOUNTS.len()
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop::sample::select(AccountType::ALL.to_vec())
}

/// Strategy to generate a balanced two-line entry between distinct accounts.
fn balanced_entry() -> impl Strategy<Value = Vec<JournalLine>> {
    (account_index(), account_index(), positive_amount())
        .prop_filter("distinct accounts", |(d, c, _)| d != c)
        .prop_map(|(d, c, amount)| {
            vec![
                JournalLine::debit(AccountCode::from_static(ACCOUNTS[d].0), amount, "").unwrap(),
                JournalLine::credit(AccountCode::from_static(ACCOUNTS[c].0), amount, "").unwrap(),
            ]
        })
}

fn new_entry(lines: Vec<JournalLine>) -> NewJournalEntry {
    NewJournalEntry {
        date: Utc::now(),
        linked_doc: None,
        description: None,
        idempotency_key: None,
        lines,
    }
}

fn stamp(lines: Vec<JournalLine>) -> JournalEntry {
    new_entry(lines).into_entry(JournalEntryId::new(), Utc::now())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn synced_ledger(
    entries: &[Vec<JournalLine>],
) -> (Arc<InMemoryAccountRegistry>, BalanceSynchronizer) {
    let registry = Arc::new(InMemoryAccountRegistry::new());
    for (raw, account_type) in ACCOUNTS {
        registry
            .create(NewAccount::new(AccountCode::from_static(raw), raw, account_type))
            .await
            .unwrap();
    }
    let journal = Arc::new(InMemoryJournalStore::new());
    for lines in entries {
        journal.append(new_entry(lines.clone())).await.unwrap();
    }
    let sync = BalanceSynchronizer::new(registry.clone(), journal);
    sync.sync_all().await.unwrap();
    (registry, sync)
}

async fn balances(registry: &InMemoryAccountRegistry) -> Vec<(AccountCode, Decimal)> {
    registry
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| (a.id, a.balance))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Folding is order-independent.
    #[test]
    fn prop_fold_is_order_independent(
        account_type in account_type_strategy(),
        amounts in prop::collection::vec((positive_amount(), any::<bool>()), 0..20),
    ) {
        let lines: Vec<JournalLine> = amounts
            .iter()
            .map(|&(amount, is_debit)| {
                let code = AccountCode::from_static("X");
                if is_debit {
                    JournalLine::debit(code, amount, "").unwrap()
                } else {
                    JournalLine::credit(code, amount, "").unwrap()
                }
            })
            .collect();

        let forward = fold_balance(account_type, &lines);
        let backward = fold_balance(account_type, lines.iter().rev());
        prop_assert_eq!(forward, backward);
    }

    /// Debit-normal and credit-normal folds of the same lines are opposite.
    #[test]
    fn prop_normal_sides_are_mirrored(
        entries in prop::collection::vec(balanced_entry(), 1..10),
    ) {
        let entries: Vec<JournalEntry> = entries.into_iter().map(stamp).collect();
        let cash = AccountCode::from_static("CASH");
        prop_assert_eq!(
            balance_from_entries(&cash, AccountType::Asset, &entries).unwrap(),
            -balance_from_entries(&cash, AccountType::Liability, &entries).unwrap()
        );
    }

    /// Sum of debit-normal balances equals sum of credit-normal balances.
    #[test]
    fn prop_trial_balance_holds(
        entries in prop::collection::vec(balanced_entry(), 0..15),
    ) {
        let entries: Vec<JournalEntry> = entries.into_iter().map(stamp).collect();
        let mut debit_normal = Decimal::ZERO;
        let mut credit_normal = Decimal::ZERO;
        for (raw, account_type) in ACCOUNTS {
            let balance =
                balance_from_entries(&AccountCode::from_static(raw), account_type, &entries).unwrap();
            match account_type {
                AccountType::Asset | AccountType::Expense => debit_normal += balance,
                _ => credit_normal += balance,
            }
        }
        prop_assert_eq!(debit_normal, credit_normal);
    }

    /// After a full sync every cached balance equals the fold of its lines.
    #[test]
    fn prop_synced_balance_equals_fold(
        entries in prop::collection::vec(balanced_entry(), 0..12),
    ) {
        runtime().block_on(async {
            let (registry, _) = synced_ledger(&entries).await;
            let stamped: Vec<JournalEntry> = entries.iter().cloned().map(stamp).collect();
            for account in registry.list().await.unwrap() {
                let expected =
                    balance_from_entries(&account.id, account.account_type, &stamped).unwrap();
                assert_eq!(account.balance, expected, "account {}", account.id);
            }
        });
    }

    /// Posting order does not change final balances.
    #[test]
    fn prop_posting_order_commutes(
        entries in prop::collection::vec(balanced_entry(), 2..8),
    ) {
        runtime().block_on(async {
            let mut reversed = entries.clone();
            reversed.reverse();

            let (forward, _) = synced_ledger(&entries).await;
            let (backward, _) = synced_ledger(&reversed).await;

            assert_eq!(balances(&forward).await, balances(&backward).await);
        });
    }

    /// Syncing twice with no postings in between yields the same balance.
    #[test]
    fn prop_sync_is_idempotent(
        entries in prop::collection::vec(balanced_entry(), 0..8),
        index in account_index(),
    ) {
        runtime().block_on(async {
            let (_, sync) = synced_ledger(&entries).await;
            let id = AccountCode::from_static(ACCOUNTS[index].0);
            let first = sync.sync_one(&id).await.unwrap();
            let second = sync.sync_one(&id).await.unwrap();
            assert_eq!(first, second);
        });
    }
}
