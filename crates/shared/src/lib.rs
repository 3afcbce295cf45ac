//! Shared types, errors, and configuration for Forgeline.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs and account codes for type-safe references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig, ServerConfig};
pub use error::{AppError, AppResult};
