//! Ledger schema migration.
//!
//! Creates the chart of accounts, the append-only journal and its per-account
//! line projection, plus the triggers that keep the journal immutable and
//! balanced at the database level.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP FUNCTION IF EXISTS forbid_journal_mutation();
DROP FUNCTION IF EXISTS check_journal_entry_balance();
",
        )
        .await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id VARCHAR(64) PRIMARY KEY,
    name TEXT NOT NULL,
    account_type VARCHAR(16) NOT NULL,
    balance NUMERIC NOT NULL DEFAULT 0,
    parent_id VARCHAR(64) REFERENCES accounts(id),
    last_updated TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_type CHECK (
        account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')
    ),
    CONSTRAINT chk_account_code CHECK (id = upper(id))
);

CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    entry_date TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    linked_doc TEXT,
    description TEXT,
    idempotency_key TEXT UNIQUE,
    lines JSONB NOT NULL,
    CONSTRAINT chk_lines_array CHECK (jsonb_typeof(lines) = 'array')
);

-- Full scans and recent listings
CREATE INDEX idx_journal_entries_created ON journal_entries(created_at, id);

-- Lines reference accounts by code without a foreign key: postings to
-- unknown accounts are accepted and surface as sync errors.
CREATE TABLE journal_lines (
    id BIGSERIAL PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    line_no INTEGER NOT NULL,
    account_id VARCHAR(64) NOT NULL,
    debit NUMERIC NOT NULL DEFAULT 0,
    credit NUMERIC NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    CONSTRAINT uq_journal_line UNIQUE (entry_id, line_no),
    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_one_side CHECK ((debit > 0) <> (credit > 0))
);

-- Balance synchronization reads lines per account
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id, id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: forbid_journal_mutation
-- The journal is append-only; corrections are new entries
-- ============================================================
CREATE OR REPLACE FUNCTION forbid_journal_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Journal is append-only: % on % is not allowed', TG_OP, TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_journal_entries_append_only
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION forbid_journal_mutation();

CREATE TRIGGER trg_journal_lines_append_only
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION forbid_journal_mutation();

-- ============================================================
-- FUNCTION: check_journal_entry_balance
-- Debits and credits of an entry may differ by at most 0.01
-- ============================================================
CREATE OR REPLACE FUNCTION check_journal_entry_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC;
    total_credit NUMERIC;
BEGIN
    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM journal_lines
    WHERE entry_id = NEW.entry_id;

    IF abs(total_debit - total_credit) > 0.01 THEN
        RAISE EXCEPTION 'Debits (%) do not equal Credits (%)', total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_journal_entry_balance
AFTER INSERT ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_entry_balance();
";
