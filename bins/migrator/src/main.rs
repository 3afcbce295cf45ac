//! Database migration runner for the Forgeline ledger.
//!
//! Usage:
//!   migrator up      - Create the ledger tables and journal triggers
//!   migrator down    - Drop them again
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use forgeline_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The migrator CLI sets up its own tracing and reads DATABASE_URL.
    cli::run_cli(Migrator).await;
}
