//! Initial database migration.
//!
//! Creates the ledger (accounts, categories, entries) and invoicing
//! (invoices, items) tables with their enum types.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: LEDGER
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;

        // ============================================================
        // PART 3: INVOICING
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;

        // Entries reference invoices, so they come last.
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_kind AS ENUM ('asset', 'liability');
CREATE TYPE transaction_kind AS ENUM ('revenue', 'expense', 'capital', 'transfer', 'loan');
CREATE TYPE document_type AS ENUM ('quotation', 'invoice');
CREATE TYPE invoice_status AS ENUM ('draft', 'sent', 'accepted', 'expired', 'paid');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind account_kind NOT NULL,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_name_kind UNIQUE (name, kind)
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind transaction_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_categories_name_kind UNIQUE (name, kind)
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    seq BIGINT GENERATED ALWAYS AS IDENTITY,
    document_type document_type NOT NULL,
    document_number VARCHAR(64) NOT NULL,
    date DATE NOT NULL,
    client_id UUID,
    subtotal NUMERIC(19, 4) NOT NULL DEFAULT 0,
    discount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(9, 4) NOT NULL DEFAULT 0,
    shipping NUMERIC(19, 4) NOT NULL DEFAULT 0,
    advance_paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status invoice_status NOT NULL DEFAULT 'draft',
    remarks TEXT,
    quotation_id UUID REFERENCES invoices(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_invoices_number_not_blank CHECK (length(trim(document_number)) > 0)
);

-- Newest-first listing and latest-number lookup per type
CREATE INDEX idx_invoices_type_seq ON invoices(document_type, seq DESC);
CREATE INDEX idx_invoices_client ON invoices(client_id) WHERE client_id IS NOT NULL;
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    total NUMERIC(19, 4) NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id, sort_order);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    seq BIGINT GENERATED ALWAYS AS IDENTITY,
    date DATE NOT NULL,
    kind transaction_kind NOT NULL,
    category_id UUID REFERENCES categories(id),
    amount NUMERIC(19, 4) NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    to_account_id UUID REFERENCES accounts(id),
    client_id UUID,
    -- Entries must be removed before the invoice that owns them
    invoice_id UUID REFERENCES invoices(id) ON DELETE RESTRICT,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_two_sided_counter CHECK (
        (kind IN ('transfer', 'loan')) = (to_account_id IS NOT NULL)
    )
);

CREATE INDEX idx_ledger_entries_date ON ledger_entries(date, seq);
CREATE INDEX idx_ledger_entries_invoice ON ledger_entries(invoice_id) WHERE invoice_id IS NOT NULL;
CREATE INDEX idx_ledger_entries_account ON ledger_entries(account_id);
CREATE INDEX idx_ledger_entries_to_account ON ledger_entries(to_account_id) WHERE to_account_id IS NOT NULL;
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS invoice_items CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS document_type;
DROP TYPE IF EXISTS transaction_kind;
DROP TYPE IF EXISTS account_kind;
";
