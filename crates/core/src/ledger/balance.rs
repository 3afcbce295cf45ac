//! Account balance derivation.
//!
//! A balance is always rebuilt from the full journal history of the account,
//! never adjusted by a delta. Rebuilding is idempotent, so repeated or
//! concurrent syncs converge on the same value.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use forgeline_shared::types::AccountCode;

use super::account::AccountType;
use super::entry::{JournalEntry, JournalLine};
use super::error::LedgerError;
use super::journal::JournalStore;
use super::registry::AccountRegistry;
use super::types::SyncReport;

/// Folds `lines` into a balance using the sign convention of `account_type`.
///
/// Lines are summed regardless of order; the caller filters by account.
///
/// # Errors
///
/// Returns `AmountOverflow` if the running balance leaves the decimal range.
pub fn fold_balance<'a, I>(account_type: AccountType, lines: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = &'a JournalLine>,
{
    lines.into_iter().try_fold(Decimal::ZERO, |balance, line| {
        let change = account_type.balance_change(line.debit_amount(), line.credit_amount());
        balance.checked_add(change).ok_or_else(|| {
            LedgerError::AmountOverflow(format!(
                "balance of {} exceeds {}",
                line.account_id(),
                Decimal::MAX
            ))
        })
    })
}

/// Balance of one account computed from a slice of journal entries.
///
/// # Errors
///
/// Returns `AmountOverflow` if the balance leaves the decimal range.
pub fn balance_from_entries(
    account_id: &AccountCode,
    account_type: AccountType,
    entries: &[JournalEntry],
) -> Result<Decimal, LedgerError> {
    fold_balance(
        account_type,
        entries.iter().flat_map(|entry| entry.lines_for(account_id)),
    )
}

/// Recomputes cached account balances from the journal.
pub struct BalanceSynchronizer {
    accounts: Arc<dyn AccountRegistry>,
    journal: Arc<dyn JournalStore>,
    locks: DashMap<AccountCode, Arc<Mutex<()>>>,
}

impl BalanceSynchronizer {
    /// Creates a synchronizer over the given stores.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountRegistry>, journal: Arc<dyn JournalStore>) -> Self {
        Self {
            accounts,
            journal,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, id: &AccountCode) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(id.clone()).or_default().value())
    }

    /// Rebuilds one account's balance from its journal lines and stores it.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account, `AmountOverflow` when
    /// the balance leaves the decimal range, or the storage error of the
    /// registry or journal.
    #[instrument(skip(self, id), fields(account = %id))]
    pub async fn sync_one(&self, id: &AccountCode) -> Result<Decimal, LedgerError> {
        let account = self.accounts.get(id).await?;

        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let lines = self.journal.lines_for(id).await?;
        let balance = fold_balance(account.account_type, &lines)?;
        self.accounts.set_balance(id, balance, Utc::now()).await?;

        debug!(lines = lines.len(), %balance, "Account balance synchronized");
        Ok(balance)
    }

    /// Synchronizes a batch of accounts.
    ///
    /// Failures do not stop the batch: the failed account is reported as zero
    /// with an error note. Repeated ids are synchronized once.
    pub async fn sync_many(&self, ids: &[AccountCode]) -> SyncReport {
        let mut report = SyncReport::new();
        let mut seen = HashSet::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            self.sync_into(id, &mut report).await;
        }

        report
    }

    /// Full reconciliation over every account in the registry.
    ///
    /// # Errors
    ///
    /// Only a failure to list the accounts is fatal.
    pub async fn sync_all(&self) -> Result<SyncReport, LedgerError> {
        self.sync_all_with(&CancellationToken::new(), None).await
    }

    /// Cancellable full reconciliation.
    ///
    /// Accounts are processed in code order, starting after `resume_after`
    /// when given. If `cancel` fires, the report is returned with
    /// `completed = false` and `resume_after` set to the last account
    /// processed; pass that back to continue.
    ///
    /// # Errors
    ///
    /// Only a failure to list the accounts is fatal.
    #[instrument(skip(self, cancel))]
    pub async fn sync_all_with(
        &self,
        cancel: &CancellationToken,
        resume_after: Option<&AccountCode>,
    ) -> Result<SyncReport, LedgerError> {
        let mut accounts = self.accounts.list().await?;
        accounts.sort_by(|a, b| a.id.cmp(&b.id));

        let mut report = SyncReport::new();
        let mut last_done: Option<AccountCode> = resume_after.cloned();

        for account in accounts
            .iter()
            .filter(|a| resume_after.is_none_or(|cursor| &a.id > cursor))
        {
            if cancel.is_cancelled() {
                info!(resume_after = ?last_done, "Reconciliation cancelled");
                report.completed = false;
                report.resume_after = last_done;
                return Ok(report);
            }
            self.sync_into(&account.id, &mut report).await;
            last_done = Some(account.id.clone());
        }

        info!(
            synced = report.results.len(),
            failed = report.errors.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    async fn sync_into(&self, id: &AccountCode, report: &mut SyncReport) {
        match self.sync_one(id).await {
            Ok(balance) => report.record_balance(id.clone(), balance),
            Err(e) => {
                warn!(account = %id, error = %e, "Failed to synchronize account balance");
                report.record_failure(id.clone(), e);
            }
        }
    }
}
