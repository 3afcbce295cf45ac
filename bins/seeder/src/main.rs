//! Chart of accounts seeder and balance reconciler.
//!
//! Creates the default chart in Postgres, then optionally rebuilds every
//! cached balance from the journal.
//!
//! Usage:
//!   seeder                           - Seed the default chart
//!   seeder --reconcile               - Seed, then recompute all balances
//!   seeder --reconcile --after CODE  - Resume a reconciliation after CODE
//!
//! Ctrl-C during a reconciliation stops it after the current account and
//! prints the code to resume from.

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forgeline_core::ledger::{BalanceSynchronizer, SyncReport, seed_chart};
use forgeline_db::{PgAccountRegistry, PgJournalStore, connect};
use forgeline_shared::types::AccountCode;
use forgeline_shared::{AppConfig, AppError, AppResult};

#[derive(Debug, Default)]
struct Args {
    reconcile: bool,
    resume_after: Option<AccountCode>,
}

fn usage(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> AppResult<Args> {
    let mut args = Args::default();
    let mut raw = raw.into_iter();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--reconcile" => args.reconcile = true,
            "--after" => {
                let code = raw.next().ok_or_else(|| usage("--after needs an account code"))?;
                let code = AccountCode::new(&code).map_err(|e| usage(e.to_string()))?;
                args.resume_after = Some(code);
            }
            other => return Err(usage(format!("unknown argument: {other}"))),
        }
    }
    if args.resume_after.is_some() && !args.reconcile {
        return Err(usage("--after only applies with --reconcile"));
    }
    Ok(args)
}

/// Operator hint for a reconciliation that stopped early.
fn resume_hint(report: &SyncReport) -> Option<String> {
    if report.completed {
        return None;
    }
    Some(match &report.resume_after {
        Some(last) => format!("rerun with --reconcile --after {last} to continue"),
        None => "cancelled before any account was reconciled; rerun with --reconcile".to_string(),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgeline=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Seeder failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = AppConfig::load()?;
    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| AppError::Config("FORGELINE__DATABASE__URL must be set".into()))?;

    let db = connect(url, &config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    let accounts = Arc::new(PgAccountRegistry::new(db.clone()));
    let journal = Arc::new(PgJournalStore::new(db));

    let created = seed_chart(accounts.as_ref()).await?;
    info!(created, "Chart of accounts seeded");

    if !args.reconcile {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let synchronizer = BalanceSynchronizer::new(accounts, journal);
    let report = synchronizer
        .sync_all_with(&cancel, args.resume_after.as_ref())
        .await?;

    for (account, error) in &report.errors {
        warn!(%account, %error, "Balance not reconciled");
    }
    info!(
        synced = report.results.len(),
        failed = report.errors.len(),
        completed = report.completed,
        "Reconciliation finished"
    );
    if let Some(hint) = resume_hint(&report) {
        warn!("Reconciliation interrupted: {hint}");
    }

    Ok(())
}
