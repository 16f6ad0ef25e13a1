//! Initial database migration.
//!
//! Creates all core tables, enums, triggers, and RLS policies. Uniqueness
//! rules validated at submission time (counterparty identifiers, supplier
//! document numbers) are enforced redundantly here through partial unique
//! indexes.

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
        // PART 2: TENANTS
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;

        // ============================================================
        // PART 3: REGISTRIES
        // ============================================================
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(SITES_SQL).await?;
        db.execute_unprepared(PERSONNEL_EXPIRIES_SQL).await?;
        db.execute_unprepared(FINANCIAL_ACCOUNTS_SQL).await?;
        db.execute_unprepared(OPERATING_ACCOUNTS_SQL).await?;
        db.execute_unprepared(CAUSES_SQL).await?;

        // ============================================================
        // PART 4: DOCUMENTS & INSTALLMENTS
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENT_LINES_SQL).await?;
        db.execute_unprepared(INSTALLMENTS_SQL).await?;

        // ============================================================
        // PART 5: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 7: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE party_kind AS ENUM ('customer', 'supplier', 'both');
CREATE TYPE document_kind AS ENUM ('sales_invoice', 'sales_credit_note', 'purchase_invoice', 'purchase_credit_note');
CREATE TYPE installment_kind AS ENUM ('receivable', 'payable');
CREATE TYPE movement_kind AS ENUM ('inflow', 'outflow');
CREATE TYPE cause_kind AS ENUM ('ordinary', 'transfer');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    vat_number VARCHAR(20),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    kind party_kind NOT NULL,
    name VARCHAR(255) NOT NULL,
    vat_number VARCHAR(20),
    fiscal_code VARCHAR(20),
    address VARCHAR(255),
    city VARCHAR(100),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_parties_company ON parties(company_id);
CREATE INDEX idx_parties_company_name ON parties(company_id, name);

-- Identifier uniqueness is per company, not global; NULLs stay free.
CREATE UNIQUE INDEX uq_parties_company_vat
    ON parties(company_id, vat_number) WHERE vat_number IS NOT NULL;
CREATE UNIQUE INDEX uq_parties_company_fiscal_code
    ON parties(company_id, fiscal_code) WHERE fiscal_code IS NOT NULL;
";

const SITES_SQL: &str = r"
CREATE TABLE sites (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    address VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sites_company ON sites(company_id);
";

const PERSONNEL_EXPIRIES_SQL: &str = r"
CREATE TABLE personnel_expiries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    employee_name VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    expiry_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_personnel_expiries_company_date ON personnel_expiries(company_id, expiry_date);
";

const FINANCIAL_ACCOUNTS_SQL: &str = r"
CREATE TABLE financial_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    iban VARCHAR(34),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_financial_accounts_company ON financial_accounts(company_id);
";

const OPERATING_ACCOUNTS_SQL: &str = r"
CREATE TABLE operating_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_operating_accounts_company ON operating_accounts(company_id);
";

const CAUSES_SQL: &str = r"
CREATE TABLE causes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    description VARCHAR(255) NOT NULL,
    kind cause_kind NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    party_id UUID NOT NULL REFERENCES parties(id),
    kind document_kind NOT NULL,
    issue_date DATE NOT NULL,
    supplier_reference VARCHAR(50),
    payment_terms JSONB NOT NULL DEFAULT '[0]',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_documents_company_date ON documents(company_id, issue_date);
CREATE INDEX idx_documents_company_party ON documents(company_id, party_id);

-- Storage-level backstop for the duplicate supplier-document guard.
CREATE UNIQUE INDEX uq_documents_supplier_reference
    ON documents(company_id, party_id, kind, supplier_reference)
    WHERE supplier_reference IS NOT NULL;
";

const DOCUMENT_LINES_SQL: &str = r"
CREATE TABLE document_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description TEXT NOT NULL,
    quantity NUMERIC(14,3) NOT NULL,
    unit_price NUMERIC(14,2) NOT NULL,
    tax_rate NUMERIC(5,2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_document_lines_document ON document_lines(document_id, position);
";

const INSTALLMENTS_SQL: &str = r"
CREATE TABLE installments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    due_date DATE NOT NULL,
    rate_amount NUMERIC(14,2) NOT NULL CHECK (rate_amount > 0),
    kind installment_kind NOT NULL,
    party_id UUID REFERENCES parties(id),
    document_id UUID REFERENCES documents(id),
    personnel_expiry_id UUID REFERENCES personnel_expiries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_installments_company_due ON installments(company_id, due_date);
CREATE INDEX idx_installments_document ON installments(document_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entry_date DATE NOT NULL,
    amount NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    movement movement_kind NOT NULL,
    cause_code VARCHAR(20) NOT NULL,
    financial_account_id UUID REFERENCES financial_accounts(id),
    operating_account_id UUID REFERENCES operating_accounts(id),
    party_id UUID REFERENCES parties(id),
    site_id UUID REFERENCES sites(id),
    installment_id UUID REFERENCES installments(id),
    transfer_id UUID,
    reverses_transfer_id UUID,
    description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Exactly one account per entry.
    CHECK ((financial_account_id IS NULL) <> (operating_account_id IS NULL))
);

CREATE INDEX idx_journal_company_date ON journal_entries(company_id, entry_date);
CREATE INDEX idx_journal_installment ON journal_entries(installment_id) WHERE installment_id IS NOT NULL;
CREATE INDEX idx_journal_transfer ON journal_entries(company_id, transfer_id) WHERE transfer_id IS NOT NULL;
CREATE INDEX idx_journal_reverses ON journal_entries(company_id, reverses_transfer_id) WHERE reverses_transfer_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_companies_updated_at BEFORE UPDATE ON companies
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_parties_updated_at BEFORE UPDATE ON parties
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_sites_updated_at BEFORE UPDATE ON sites
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_personnel_expiries_updated_at BEFORE UPDATE ON personnel_expiries
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_financial_accounts_updated_at BEFORE UPDATE ON financial_accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_operating_accounts_updated_at BEFORE UPDATE ON operating_accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_causes_updated_at BEFORE UPDATE ON causes
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_documents_updated_at BEFORE UPDATE ON documents
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_document_lines_updated_at BEFORE UPDATE ON document_lines
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_installments_updated_at BEFORE UPDATE ON installments
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_journal_entries_updated_at BEFORE UPDATE ON journal_entries
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Application sets context per transaction:
--   SET LOCAL app.current_company_id = 'company-uuid';
-- An unset variable yields NULL, so every policy filters to
-- zero rows: anonymous scopes are fail-closed by construction.
-- ============================================================

ALTER TABLE companies ENABLE ROW LEVEL SECURITY;
ALTER TABLE parties ENABLE ROW LEVEL SECURITY;
ALTER TABLE sites ENABLE ROW LEVEL SECURITY;
ALTER TABLE personnel_expiries ENABLE ROW LEVEL SECURITY;
ALTER TABLE financial_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE operating_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE causes ENABLE ROW LEVEL SECURITY;
ALTER TABLE documents ENABLE ROW LEVEL SECURITY;
ALTER TABLE document_lines ENABLE ROW LEVEL SECURITY;
ALTER TABLE installments ENABLE ROW LEVEL SECURITY;
ALTER TABLE journal_entries ENABLE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON companies
    USING (id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON parties
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON sites
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON personnel_expiries
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON financial_accounts
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON operating_accounts
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON causes
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON documents
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON document_lines
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON installments
    USING (company_id = current_setting('app.current_company_id', true)::UUID);

CREATE POLICY tenant_isolation ON journal_entries
    USING (company_id = current_setting('app.current_company_id', true)::UUID);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS installments;
DROP TABLE IF EXISTS document_lines;
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS causes;
DROP TABLE IF EXISTS operating_accounts;
DROP TABLE IF EXISTS financial_accounts;
DROP TABLE IF EXISTS personnel_expiries;
DROP TABLE IF EXISTS sites;
DROP TABLE IF EXISTS parties;
DROP TABLE IF EXISTS companies;
DROP FUNCTION IF EXISTS set_updated_at();
DROP TYPE IF EXISTS cause_kind;
DROP TYPE IF EXISTS movement_kind;
DROP TYPE IF EXISTS installment_kind;
DROP TYPE IF EXISTS document_kind;
DROP TYPE IF EXISTS party_kind;
";
