//! End-to-end ledger scenarios over the in-memory stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use forgeline_shared::types::AccountCode;

use super::account::{Account, AccountType, NewAccount};
use super::balance::BalanceSynchronizer;
use super::chart::seed_chart;
use super::entry::{JournalEntry, JournalLine, NewJournalEntry};
use super::error::LedgerError;
use super::journal::{InMemoryJournalStore, JournalStore};
use super::posting::PostingOrchestrator;
use super::registry::{AccountRegistry, InMemoryAccountRegistry};
use super::types::PostingRequest;

fn code(raw: &'static str) -> AccountCode {
    AccountCode::from_static(raw)
}

fn debit(account: &'static str, amount: Decimal) -> JournalLine {
    JournalLine::debit(code(account), amount, "").unwrap()
}

fn credit(account: &'static str, amount: Decimal) -> JournalLine {
    JournalLine::credit(code(account), amount, "").unwrap()
}

struct Ledger {
    registry: Arc<dyn AccountRegistry>,
    journal: Arc<InMemoryJournalStore>,
    synchronizer: Arc<BalanceSynchronizer>,
    orchestrator: PostingOrchestrator,
}

impl Ledger {
    fn over(registry: Arc<dyn AccountRegistry>) -> Self {
        let journal = Arc::new(InMemoryJournalStore::new());
        let synchronizer = Arc::new(BalanceSynchronizer::new(registry.clone(), journal.clone()));
        let orchestrator =
            PostingOrchestrator::new(registry.clone(), journal.clone(), synchronizer.clone(), false);
        Self {
            registry,
            journal,
            synchronizer,
            orchestrator,
        }
    }

    async fn seeded() -> Self {
        let registry = Arc::new(InMemoryAccountRegistry::new());
        seed_chart(registry.as_ref()).await.unwrap();
        Self::over(registry)
    }

    async fn balance(&self, raw: &'static str) -> Decimal {
        self.registry.get(&code(raw)).await.unwrap().balance
    }
}

/// Registry whose reads fail for one account, simulating a storage outage.
struct FlakyRegistry {
    inner: InMemoryAccountRegistry,
    broken: AccountCode,
}

#[async_trait]
impl AccountRegistry for FlakyRegistry {
    async fn get(&self, id: &AccountCode) -> Result<Account, LedgerError> {
        if *id == self.broken {
            return Err(LedgerError::Storage("connection reset".into()));
        }
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        self.inner.list().await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, LedgerError> {
        self.inner.create(account).await
    }

    async fn set_balance(
        &self,
        id: &AccountCode,
        balance: Decimal,
        synced_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.inner.set_balance(id, balance, synced_at).await
    }
}

/// Journal whose writes fail, simulating a database outage on append.
struct FailingJournal;

#[async_trait]
impl JournalStore for FailingJournal {
    async fn append(&self, _entry: NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        Err(LedgerError::Storage("write rejected".into()))
    }

    async fn all(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(Vec::new())
    }

    async fn lines_for(&self, _account_id: &AccountCode) -> Result<Vec<JournalLine>, LedgerError> {
        Ok(Vec::new())
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(Vec::new())
    }

    async fn find_by_idempotency_key(
        &self,
        _key: &str,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        Ok(None)
    }
}

#[tokio::test]
async fn scenario_balanced_sale_updates_both_accounts() {
    let ledger = Ledger::seeded().await;

    let outcome = ledger
        .orchestrator
        .post(PostingRequest::new(vec![
            debit("CASH", dec!(1000)),
            credit("SALES_REVENUE", dec!(1000)),
        ]))
        .await
        .unwrap();

    assert!(outcome.sync.is_clean());
    assert_eq!(ledger.balance("CASH").await, dec!(1000));
    assert_eq!(ledger.balance("SALES_REVENUE").await, dec!(1000));
}

#[tokio::test]
async fn scenario_unbalanced_expense_is_rejected() {
    let ledger = Ledger::seeded().await;

    let err = ledger
        .orchestrator
        .post(PostingRequest::new(vec![
            debit("GENERAL_EXPENSES", dec!(500)),
            credit("CASH", dec!(499)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Debits (500) do not equal Credits (499)");
    assert_eq!(err.http_status_code(), 400);
    assert!(ledger.journal.all().await.unwrap().is_empty());
    assert_eq!(ledger.balance("GENERAL_EXPENSES").await, Decimal::ZERO);
    assert_eq!(ledger.balance("CASH").await, Decimal::ZERO);
}

#[tokio::test]
async fn scenario_sync_all_on_empty_journal_zeroes_everything() {
    let ledger = Ledger::seeded().await;
    for raw in ["CASH", "INVENTORY", "LONG_TERM_DEBT"] {
        ledger
            .registry
            .set_balance(&code(raw), dec!(123.45), Utc::now())
            .await
            .unwrap();
    }

    let report = ledger.synchronizer.sync_all().await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.results.len(), 16);
    for account in ledger.registry.list().await.unwrap() {
        assert_eq!(account.balance, Decimal::ZERO, "account {}", account.id);
    }
}

#[tokio::test]
async fn scenario_liability_grows_with_credits() {
    let ledger = Ledger::seeded().await;

    for amount in [dec!(2000), dec!(3000)] {
        ledger
            .orchestrator
            .post(PostingRequest::new(vec![
                debit("CASH", amount),
                credit("LONG_TERM_DEBT", amount),
            ]))
            .await
            .unwrap();
    }

    assert_eq!(ledger.balance("LONG_TERM_DEBT").await, dec!(5000));
    assert_eq!(ledger.balance("CASH").await, dec!(5000));
}

#[tokio::test]
async fn scenario_unknown_account_is_zeroed_and_batch_continues() {
    let ledger = Ledger::seeded().await;
    ledger
        .journal
        .append(NewJournalEntry {
            date: Utc::now(),
            linked_doc: None,
            description: None,
            idempotency_key: None,
            lines: vec![debit("CASH", dec!(250)), credit("MISSING_ACCOUNT", dec!(250))],
        })
        .await
        .unwrap();

    let report = ledger
        .synchronizer
        .sync_many(&[code("CASH"), code("MISSING_ACCOUNT")])
        .await;

    assert_eq!(report.results[&code("MISSING_ACCOUNT")], Decimal::ZERO);
    assert!(report.errors[&code("MISSING_ACCOUNT")].contains("not found"));
    assert_eq!(report.results[&code("CASH")], dec!(250));
    assert_eq!(ledger.balance("CASH").await, dec!(250));
}

#[tokio::test]
async fn scenario_storage_failure_during_sync_keeps_entry() {
    let inner = InMemoryAccountRegistry::new();
    seed_chart(&inner).await.unwrap();
    let ledger = Ledger::over(Arc::new(FlakyRegistry {
        inner,
        broken: code("SALES_REVENUE"),
    }));

    let outcome = ledger
        .orchestrator
        .post(PostingRequest::new(vec![
            debit("CASH", dec!(40)),
            credit("SALES_REVENUE", dec!(40)),
        ]))
        .await
        .unwrap();

    assert_eq!(ledger.journal.all().await.unwrap().len(), 1);
    assert_eq!(outcome.sync.results[&code("CASH")], dec!(40));
    assert_eq!(outcome.sync.results[&code("SALES_REVENUE")], Decimal::ZERO);
    assert!(outcome.sync.errors[&code("SALES_REVENUE")].contains("connection reset"));
}

#[tokio::test]
async fn scenario_concurrent_postings_converge() {
    let ledger = Arc::new(Ledger::seeded().await);
    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .orchestrator
                .post(PostingRequest::new(vec![
                    debit("INVENTORY", dec!(10)),
                    credit("ACCOUNTS_PAYABLE", dec!(10)),
                ]))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    ledger.synchronizer.sync_all().await.unwrap();
    assert_eq!(ledger.balance("INVENTORY").await, dec!(200));
    assert_eq!(ledger.balance("ACCOUNTS_PAYABLE").await, dec!(200));
}

#[tokio::test]
async fn scenario_new_account_participates_after_creation() {
    let ledger = Ledger::seeded().await;
    ledger
        .registry
        .create(NewAccount::new(code("PETTY_CASH"), "Petty Cash", AccountType::Asset).with_parent(code("CASH")))
        .await
        .unwrap();

    ledger
        .orchestrator
        .post(PostingRequest::new(vec![
            debit("PETTY_CASH", dec!(15.5)),
            credit("CASH", dec!(15.5)),
        ]))
        .await
        .unwrap();

    assert_eq!(ledger.balance("PETTY_CASH").await, dec!(15.5));
    assert_eq!(ledger.balance("CASH").await, dec!(-15.5));
}

#[tokio::test]
async fn scenario_append_failure_is_fatal_and_skips_sync() {
    let registry = Arc::new(InMemoryAccountRegistry::new());
    seed_chart(registry.as_ref()).await.unwrap();
    let journal: Arc<dyn JournalStore> = Arc::new(FailingJournal);
    let synchronizer = Arc::new(BalanceSynchronizer::new(registry.clone(), journal.clone()));
    let orchestrator = PostingOrchestrator::new(registry.clone(), journal, synchronizer, false);

    let err = orchestrator
        .post(PostingRequest::new(vec![
            debit("CASH", dec!(75)),
            credit("SALES_REVENUE", dec!(75)),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::Storage("write rejected".into()));
    assert_eq!(err.http_status_code(), 500);
    // A sync would have stamped `last_updated` even with no journal lines.
    for raw in ["CASH", "SALES_REVENUE"] {
        let account = registry.get(&code(raw)).await.unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.last_updated.is_none(), "account {raw} was synced");
    }
}

#[tokio::test]
async fn scenario_balances_beyond_decimal_range_stay_recoverable() {
    let ledger = Ledger::seeded().await;
    let huge = || {
        PostingRequest::new(vec![
            debit("CASH", Decimal::MAX),
            credit("SALES_REVENUE", Decimal::MAX),
        ])
    };

    let first = ledger.orchestrator.post(huge()).await.unwrap();
    assert!(first.sync.is_clean());

    let second = ledger.orchestrator.post(huge()).await.unwrap();
    assert_eq!(ledger.journal.all().await.unwrap().len(), 2);
    assert!(second.sync.errors[&code("CASH")].starts_with("Amount overflow"));
    assert!(second.sync.errors[&code("SALES_REVENUE")].starts_with("Amount overflow"));

    let report = ledger.synchronizer.sync_all().await.unwrap();
    assert!(report.completed);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.results.len(), 16);
}
