//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Chart of accounts and the per-type sign convention
//! - Journal lines and entries
//! - Repository seams for accounts and the journal, with in-memory stores
//! - Business rule validation
//! - Balance synchronization from the journal
//! - The posting orchestrator and posting builders

pub mod account;
pub mod balance;
pub mod chart;
pub mod entry;
pub mod error;
pub mod journal;
pub mod posting;
pub mod postings;
pub mod registry;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod posting_props;
#[cfg(test)]
mod scenarios;

pub use account::{Account, AccountType, NewAccount, NormalSide};
pub use balance::{BalanceSynchronizer, balance_from_entries, fold_balance};
pub use chart::{default_chart, seed_chart};
pub use entry::{JournalEntry, JournalLine, LineAmount, NewJournalEntry};
pub use error::LedgerError;
pub use journal::{InMemoryJournalStore, JournalStore};
pub use posting::PostingOrchestrator;
pub use registry::{AccountRegistry, InMemoryAccountRegistry};
pub use types::{EntryTotals, PostingOutcome, PostingRequest, SyncReport};
pub use validation::{BALANCE_TOLERANCE, LedgerValidator};
