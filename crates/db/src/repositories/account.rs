//! Account repository for chart of accounts database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, instrument};

use forgeline_core::ledger::{Account, AccountRegistry, LedgerError, NewAccount};
use forgeline_shared::types::AccountCode;

use super::{is_unique_violation, storage};
use crate::entities::accounts;

/// Chart of accounts stored in the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountRegistry {
    db: DatabaseConnection,
}

impl PgAccountRegistry {
    /// Creates a new account registry.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Converts a stored row into the domain account.
///
/// # Errors
///
/// Returns `Storage` if the row holds a code or type the domain rejects.
pub fn account_from_model(model: accounts::Model) -> Result<Account, LedgerError> {
    let corrupt = |e: LedgerError| LedgerError::Storage(format!("corrupt account row: {e}"));

    let id = AccountCode::new(&model.id).map_err(|e| corrupt(e.into()))?;
    let parent_id = model
        .parent_id
        .as_deref()
        .map(AccountCode::new)
        .transpose()
        .map_err(|e| corrupt(e.into()))?;

    Ok(Account {
        id,
        name: model.name,
        account_type: model.account_type.parse().map_err(corrupt)?,
        balance: model.balance,
        parent_id,
        last_updated: model.last_updated.map(|t| t.with_timezone(&Utc)),
    })
}

#[async_trait]
impl AccountRegistry for PgAccountRegistry {
    async fn get(&self, id: &AccountCode) -> Result<Account, LedgerError> {
        accounts::Entity::find_by_id(id.as_str().to_owned())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))
            .and_then(account_from_model)
    }

    async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    #[instrument(skip(self, account), fields(account = %account.id))]
    async fn create(&self, account: NewAccount) -> Result<Account, LedgerError> {
        if let Some(parent) = &account.parent_id {
            let exists = accounts::Entity::find_by_id(parent.as_str().to_owned())
                .one(&self.db)
                .await
                .map_err(storage)?
                .is_some();
            if !exists {
                return Err(LedgerError::ParentNotFound(parent.clone()));
            }
        }

        let row = accounts::ActiveModel {
            id: Set(account.id.as_str().to_owned()),
            name: Set(account.name.clone()),
            account_type: Set(account.account_type.as_str().to_owned()),
            balance: Set(Decimal::ZERO),
            parent_id: Set(account.parent_id.as_ref().map(|p| p.as_str().to_owned())),
            last_updated: Set(None),
            created_at: Set(Utc::now().into()),
        };

        match row.insert(&self.db).await {
            Ok(model) => {
                debug!("Account created");
                account_from_model(model)
            }
            Err(e) if is_unique_violation(&e) => Err(LedgerError::DuplicateAccount(account.id)),
            Err(e) => Err(storage(e)),
        }
    }

    async fn set_balance(
        &self,
        id: &AccountCode,
        balance: Decimal,
        synced_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(balance))
            .col_expr(
                accounts::Column::LastUpdated,
                Expr::value(synced_at.fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(id.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(id.clone()));
        }
        Ok(())
    }
}
