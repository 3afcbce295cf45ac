//! Common types used across the application.

pub mod account_code;
pub mod id;

pub use account_code::{AccountCode, AccountCodeError};
pub use id::*;
