//! Chart of accounts codes.
//!
//! Accounts are keyed by a stable, human-readable code such as `CASH` or
//! `ACCOUNTS_PAYABLE` rather than a UUID, so business call sites can name the
//! accounts they post to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an account code.
pub const MAX_ACCOUNT_CODE_LEN: usize = 64;

/// Reasons an account code is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountCodeError {
    /// Code is empty after trimming.
    #[error("account code cannot be empty")]
    Empty,

    /// Code exceeds [`MAX_ACCOUNT_CODE_LEN`].
    #[error("account code '{0}' is longer than {MAX_ACCOUNT_CODE_LEN} characters")]
    TooLong(String),

    /// Code contains a character outside `A-Z`, `0-9`, `_`, `-`.
    #[error("account code '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

/// Stable identifier of a chart of accounts entry.
///
/// Always upper case; construction trims and upper-cases the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountCode(String);

impl AccountCode {
    /// Parses and normalizes an account code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty, too long, or contains characters
    /// other than ASCII letters, digits, `_` and `-`.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountCodeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountCodeError::Empty);
        }
        if trimmed.len() > MAX_ACCOUNT_CODE_LEN {
            return Err(AccountCodeError::TooLong(trimmed.to_string()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AccountCodeError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Builds a code from a compile-time constant such as `"CASH"`.
    ///
    /// The constant must already be a valid, upper-case code.
    #[must_use]
    pub fn from_static(code: &'static str) -> Self {
        debug_assert!(
            Self::new(code).is_ok_and(|c| c.as_str() == code),
            "invalid static account code {code}"
        );
        Self(code.to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountCode {
    type Err = AccountCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountCode {
    type Error = AccountCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountCode> for String {
    fn from(code: AccountCode) -> Self {
        code.0
    }
}

impl AsRef<str> for AccountCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
