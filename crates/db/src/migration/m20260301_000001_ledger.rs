//! Ledger schema migration.
//!
//! Creates the chart of accounts, financial years, journal entries and items,
//! reference counters, and the triggers guarding posted entries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(FINANCIAL_YEARS_SQL).await?;

        // ============================================================
        // PART 2: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ITEMS_SQL).await?;
        db.execute_unprepared(REFERENCE_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    business_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    category VARCHAR(16) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_cash BOOLEAN NOT NULL DEFAULT false,
    system_role VARCHAR(32),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_category CHECK (
        category IN ('asset', 'liability', 'equity', 'revenue', 'expense')
    ),
    CONSTRAINT chk_account_system_role CHECK (
        system_role IS NULL OR system_role IN (
            'receivable', 'payable', 'opening_balance_equity', 'tax_payable', 'tax_receivable'
        )
    ),
    CONSTRAINT uq_accounts_code UNIQUE (business_id, code)
);

CREATE UNIQUE INDEX uq_accounts_system_role ON accounts(business_id, system_role)
    WHERE system_role IS NOT NULL;
CREATE INDEX idx_accounts_business ON accounts(business_id, code);
";

const FINANCIAL_YEARS_SQL: &str = r"
CREATE TABLE financial_years (
    id UUID PRIMARY KEY,
    business_id UUID NOT NULL,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_financial_year_dates CHECK (end_date >= start_date),
    CONSTRAINT uq_financial_years_name UNIQUE (business_id, name)
);

CREATE UNIQUE INDEX uq_financial_years_active ON financial_years(business_id)
    WHERE is_active;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    business_id UUID NOT NULL,
    reference_number VARCHAR(100) NOT NULL,
    financial_year_id UUID NOT NULL REFERENCES financial_years(id),
    entry_date DATE NOT NULL,
    narration TEXT NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'draft',
    cash_flow_category VARCHAR(16),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_at TIMESTAMPTZ,
    reverses_entry_id UUID REFERENCES journal_entries(id),
    reversed_by_entry_id UUID REFERENCES journal_entries(id),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_entry_status CHECK (status IN ('draft', 'posted', 'cancelled')),
    CONSTRAINT chk_entry_cash_flow_category CHECK (
        cash_flow_category IS NULL
        OR cash_flow_category IN ('operating', 'investing', 'financing')
    ),
    CONSTRAINT chk_entry_posted_at CHECK (status = 'draft' OR posted_at IS NOT NULL),
    CONSTRAINT uq_journal_entries_reference UNIQUE (business_id, reference_number),
    CONSTRAINT uq_journal_entries_reverses UNIQUE (reverses_entry_id)
);

CREATE INDEX idx_journal_entries_date ON journal_entries(business_id, entry_date, id);
CREATE INDEX idx_journal_entries_status ON journal_entries(business_id, status);
";

const JOURNAL_ITEMS_SQL: &str = r"
CREATE TABLE journal_items (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    entry_type VARCHAR(8) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description VARCHAR(500),
    CONSTRAINT chk_item_entry_type CHECK (entry_type IN ('debit', 'credit')),
    CONSTRAINT chk_item_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_journal_items_entry ON journal_items(entry_id);
CREATE INDEX idx_journal_items_account ON journal_items(account_id);
";

const REFERENCE_SEQUENCES_SQL: &str = r"
CREATE TABLE reference_sequences (
    business_id UUID NOT NULL,
    prefix VARCHAR(20) NOT NULL,
    last_value BIGINT NOT NULL,
    PRIMARY KEY (business_id, prefix),
    CONSTRAINT chk_sequence_positive CHECK (last_value > 0)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_entry_balance
-- Ensures debit = credit for entries that affect balances
-- ============================================================
CREATE OR REPLACE FUNCTION check_entry_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
BEGIN
    IF NEW.status IN ('posted', 'cancelled') THEN
        SELECT
            COALESCE(SUM(CASE WHEN entry_type = 'debit' THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN entry_type = 'credit' THEN amount ELSE 0 END), 0)
        INTO total_debit, total_credit
        FROM journal_items
        WHERE entry_id = NEW.id;

        IF total_debit <> total_credit THEN
            RAISE EXCEPTION 'Journal entry % is not balanced. Debit: %, Credit: %',
                NEW.reference_number, total_debit, total_credit;
        END IF;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_entry_balance
AFTER INSERT OR UPDATE ON journal_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

-- ============================================================
-- FUNCTION: prevent_posted_modification
-- Posted entries only move to cancelled; cancelled entries are final
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'posted' AND NEW.status <> 'cancelled' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry. Cancel it instead.';
    END IF;

    IF OLD.status = 'cancelled' THEN
        RAISE EXCEPTION 'Cannot modify cancelled journal entry.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_modification
BEFORE UPDATE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_modification();

-- ============================================================
-- FUNCTION: prevent_posted_item_change
-- Items of posted or cancelled entries are immutable
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_item_change()
RETURNS TRIGGER AS $$
DECLARE
    entry_status VARCHAR(16);
BEGIN
    SELECT status INTO entry_status
    FROM journal_entries
    WHERE id = COALESCE(NEW.entry_id, OLD.entry_id);

    IF TG_OP <> 'INSERT' AND entry_status IN ('posted', 'cancelled') THEN
        RAISE EXCEPTION 'Cannot change items of a % journal entry.', entry_status;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_item_change
BEFORE UPDATE OR DELETE ON journal_items
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_item_change();
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TRIGGER IF EXISTS trg_prevent_posted_item_change ON journal_items;
DROP TRIGGER IF EXISTS trg_prevent_posted_modification ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_entry_balance ON journal_entries;

DROP FUNCTION IF EXISTS prevent_posted_item_change();
DROP FUNCTION IF EXISTS prevent_posted_modification();
DROP FUNCTION IF EXISTS check_entry_balance();

DROP TABLE IF EXISTS reference_sequences;
DROP TABLE IF EXISTS journal_items;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS financial_years;
DROP TABLE IF EXISTS accounts;
";
