//! Core business logic for Forgeline.
//!
//! This crate contains the ledger domain with ZERO web or database
//! dependencies. Storage is reached through the repository traits in
//! [`ledger::registry`] and [`ledger::journal`].
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping, balance synchronization and postings

pub mod ledger;
