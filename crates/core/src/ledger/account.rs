//! Chart of accounts types and the per-type sign convention.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgeline_shared::types::AccountCode;

use super::error::LedgerError;

/// Which side increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Balance grows with debits (assets, expenses).
    Debit,
    /// Balance grows with credits (liabilities, equity, revenue).
    Credit,
}

/// Account type. Fixed at creation; drives the sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Things the business owns.
    Asset,
    /// Things the business owes.
    Liability,
    /// Owner's stake.
    Equity,
    /// Income from operations.
    Revenue,
    /// Costs of operations.
    Expense,
}

impl AccountType {
    /// Every account type, in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the side that increases this account type.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Calculates the balance contribution of one line.
    ///
    /// - Asset/Expense: `debit - credit`
    /// - Liability/Equity/Revenue: `credit - debit`
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_side() {
            NormalSide::Debit => debit - credit,
            NormalSide::Credit => credit - debit,
        }
    }

    /// Lower-case name used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(LedgerError::InvalidAccountType(s.to_string())),
        }
    }
}

/// A chart of accounts entry with its cached balance.
///
/// `balance` is a materialized view over the journal; only the balance
/// synchronizer writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable account code.
    pub id: AccountCode,
    /// Display label.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Cached balance, reproducible from the journal.
    pub balance: Decimal,
    /// Optional parent for hierarchical grouping.
    pub parent_id: Option<AccountCode>,
    /// Time of the most recent synchronization.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account code (must be unique).
    pub id: AccountCode,
    /// Display label.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional parent account code.
    pub parent_id: Option<AccountCode>,
}

impl NewAccount {
    /// Creates an account input with no parent.
    #[must_use]
    pub fn new(id: AccountCode, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id,
            name: name.into(),
            account_type,
            parent_id: None,
        }
    }

    /// Parses raw request fields into an account input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountCode` or `InvalidAccountType` when a field fails to parse.
    pub fn parse(
        id: &str,
        name: &str,
        account_type: &str,
        parent_id: Option<&str>,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            id: AccountCode::new(id)?,
            name: name.trim().to_string(),
            account_type: account_type.parse()?,
            parent_id: parent_id.map(AccountCode::new).transpose()?,
        })
    }

    /// Sets the parent account.
    #[must_use]
    pub fn with_parent(mut self, parent: AccountCode) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Converts the input into an account with a zero, never-synced balance.
    #[must_use]
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            account_type: self.account_type,
            balance: Decimal::ZERO,
            parent_id: self.parent_id,
            last_updated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, dec!(100), dec!(30), dec!(70))]
    #[case(AccountType::Expense, dec!(0), dec!(50), dec!(-50))]
    #[case(AccountType::Liability, dec!(30), dec!(100), dec!(70))]
    #[case(AccountType::Equity, dec!(50), dec!(0), dec!(-50))]
    #[case(AccountType::Revenue, dec!(0), dec!(1000), dec!(1000))]
    fn test_sign_convention(
        #[case] account_type: AccountType,
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(account_type.balance_change(debit, credit), expected);
    }

    #[test]
    fn test_normal_side() {
        assert_eq!(AccountType::Asset.normal_side(), NormalSide::Debit);
        assert_eq!(AccountType::Expense.normal_side(), NormalSide::Debit);
        assert_eq!(AccountType::Liability.normal_side(), NormalSide::Credit);
        assert_eq!(AccountType::Equity.normal_side(), NormalSide::Credit);
        assert_eq!(AccountType::Revenue.normal_side(), NormalSide::Credit);
    }

    #[test]
    fn test_account_type_from_string() {
        for account_type in AccountType::ALL {
            assert_eq!(account_type.as_str().parse::<AccountType>().unwrap(), account_type);
        }
        // Case insensitive
        assert_eq!("ASSET".parse::<AccountType>().unwrap(), AccountType::Asset);
        assert_eq!(" Revenue ".parse::<AccountType>().unwrap(), AccountType::Revenue);

        assert_eq!(
            "cash".parse::<AccountType>().unwrap_err(),
            LedgerError::InvalidAccountType("cash".into())
        );
    }

    #[test]
    fn test_new_account_parse() {
        let input = NewAccount::parse("petty_cash", " Petty Cash ", "asset", Some("cash")).unwrap();
        assert_eq!(input.id.as_str(), "PETTY_CASH");
        assert_eq!(input.name, "Petty Cash");
        assert_eq!(input.parent_id, Some(AccountCode::from_static("CASH")));

        assert!(matches!(
            NewAccount::parse("x", "X", "income", None),
            Err(LedgerError::InvalidAccountType(_))
        ));
        assert!(matches!(
            NewAccount::parse("", "X", "asset", None),
            Err(LedgerError::InvalidAccountCode(_))
        ));
    }

    #[test]
    fn test_account_serializes_type_field() {
        let account = NewAccount::new(AccountCode::from_static("CASH"), "Cash", AccountType::Asset)
            .into_account();
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["type"], "asset");
        assert_eq!(json["balance"], "0");
        assert!(json["last_updated"].is_null());
    }
}
