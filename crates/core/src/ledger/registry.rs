//! Chart of accounts repository.
//!
//! The registry is injected wherever accounts are read or written; the
//! in-memory implementation backs tests and database-less deployments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use forgeline_shared::types::AccountCode;

use super::account::{Account, NewAccount};
use super::error::LedgerError;

/// Account id → {name, type, balance, last_updated} lookup.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// Returns one account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is not in the chart.
    async fn get(&self, id: &AccountCode) -> Result<Account, LedgerError>;

    /// Returns every account ordered by code.
    async fn list(&self) -> Result<Vec<Account>, LedgerError>;

    /// Creates an account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccount` if the code exists, `ParentNotFound` if
    /// the parent is missing.
    async fn create(&self, account: NewAccount) -> Result<Account, LedgerError>;

    /// Overwrites the cached balance. Only the balance synchronizer calls this.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is not in the chart.
    async fn set_balance(
        &self,
        id: &AccountCode,
        balance: Decimal,
        synced_at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;
}

/// In-memory chart of accounts.
#[derive(Debug, Default)]
pub struct InMemoryAccountRegistry {
    accounts: RwLock<BTreeMap<AccountCode, Account>>,
}

impl InMemoryAccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRegistry for InMemoryAccountRegistry {
    async fn get(&self, id: &AccountCode) -> Result<Account, LedgerError> {
        self.accounts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, LedgerError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&account.id) {
            return Err(LedgerError::DuplicateAccount(account.id));
        }
        if let Some(parent) = &account.parent_id {
            if !accounts.contains_key(parent) {
                return Err(LedgerError::ParentNotFound(parent.clone()));
            }
        }

        let account = account.into_account();
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn set_balance(
        &self,
        id: &AccountCode,
        balance: Decimal,
        synced_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))?;
        account.balance = balance;
        account.last_updated = Some(synced_at);
        Ok(())
    }
}
