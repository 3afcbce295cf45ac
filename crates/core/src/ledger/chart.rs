//! Standard chart of accounts.

use tracing::{debug, info};

use forgeline_shared::types::AccountCode;

use super::account::{AccountType, NewAccount};
use super::error::LedgerError;
use super::registry::AccountRegistry;

/// Codes of the standard accounts.
pub mod codes {
    /// Cash on hand and in bank.
    pub const CASH: &str = "CASH";
    /// Amounts owed by customers.
    pub const ACCOUNTS_RECEIVABLE: &str = "ACCOUNTS_RECEIVABLE";
    /// Raw materials.
    pub const INVENTORY: &str = "INVENTORY";
    /// Materials issued to open work orders.
    pub const WORK_IN_PROGRESS: &str = "WORK_IN_PROGRESS";
    /// Goods ready for sale.
    pub const FINISHED_GOODS: &str = "FINISHED_GOODS";
    /// Machinery and tools.
    pub const EQUIPMENT: &str = "EQUIPMENT";
    /// Amounts owed to suppliers.
    pub const ACCOUNTS_PAYABLE: &str = "ACCOUNTS_PAYABLE";
    /// Loans and other long-term borrowing.
    pub const LONG_TERM_DEBT: &str = "LONG_TERM_DEBT";
    /// Capital contributed by the owner.
    pub const OWNER_EQUITY: &str = "OWNER_EQUITY";
    /// Accumulated profit.
    pub const RETAINED_EARNINGS: &str = "RETAINED_EARNINGS";
    /// Income from product sales.
    pub const SALES_REVENUE: &str = "SALES_REVENUE";
    /// Income outside of sales.
    pub const OTHER_INCOME: &str = "OTHER_INCOME";
    /// Cost of the goods that were sold.
    pub const COST_OF_GOODS_SOLD: &str = "COST_OF_GOODS_SOLD";
    /// Operating expenses.
    pub const GENERAL_EXPENSES: &str = "GENERAL_EXPENSES";
    /// Payroll.
    pub const WAGES_EXPENSE: &str = "WAGES_EXPENSE";
    /// Interest on borrowing.
    pub const INTEREST_EXPENSE: &str = "INTEREST_EXPENSE";
}

const STANDARD_ACCOUNTS: [(&str, &str, AccountType); 16] = [
    (codes::CASH, "Cash", AccountType::Asset),
    (codes::ACCOUNTS_RECEIVABLE, "Accounts Receivable", AccountType::Asset),
    (codes::INVENTORY, "Inventory", AccountType::Asset),
    (codes::WORK_IN_PROGRESS, "Work in Progress", AccountType::Asset),
    (codes::FINISHED_GOODS, "Finished Goods", AccountType::Asset),
    (codes::EQUIPMENT, "Equipment", AccountType::Asset),
    (codes::ACCOUNTS_PAYABLE, "Accounts Payable", AccountType::Liability),
    (codes::LONG_TERM_DEBT, "Long-term Debt", AccountType::Liability),
    (codes::OWNER_EQUITY, "Owner's Equity", AccountType::Equity),
    (codes::RETAINED_EARNINGS, "Retained Earnings", AccountType::Equity),
    (codes::SALES_REVENUE, "Sales Revenue", AccountType::Revenue),
    (codes::OTHER_INCOME, "Other Income", AccountType::Revenue),
    (codes::COST_OF_GOODS_SOLD, "Cost of Goods Sold", AccountType::Expense),
    (codes::GENERAL_EXPENSES, "General Expenses", AccountType::Expense),
    (codes::WAGES_EXPENSE, "Wages Expense", AccountType::Expense),
    (codes::INTEREST_EXPENSE, "Interest Expense", AccountType::Expense),
];

/// The standard accounts created at initialization.
#[must_use]
pub fn default_chart() -> Vec<NewAccount> {
    STANDARD_ACCOUNTS
        .iter()
        .map(|&(code, name, account_type)| {
            NewAccount::new(AccountCode::from_static(code), name, account_type)
        })
        .collect()
}

/// Creates the standard accounts that are missing; existing codes are skipped.
///
/// Returns the number of accounts created.
///
/// # Errors
///
/// Returns the registry's storage error.
pub async fn seed_chart(registry: &dyn AccountRegistry) -> Result<usize, LedgerError> {
    let mut created = 0;
    for account in default_chart() {
        let id = account.id.clone();
        match registry.create(account).await {
            Ok(_) => created += 1,
            Err(LedgerError::DuplicateAccount(_)) => {
                debug!(account = %id, "Account already exists, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    info!(created, "Chart of accounts seeded");
    Ok(created)
}
