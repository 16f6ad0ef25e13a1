//! Migration to enable FORCE ROW LEVEL SECURITY on all tenant tables.
//!
//! This ensures RLS policies apply even to table owners and superusers,
//! providing an additional layer of security for multi-tenant isolation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(FORCE_RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DISABLE_FORCE_RLS_SQL).await?;
        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
-- ============================================================
-- FORCE ROW LEVEL SECURITY
-- Ensures RLS policies apply to ALL users including table owners
-- ============================================================

ALTER TABLE parties FORCE ROW LEVEL SECURITY;
ALTER TABLE sites FORCE ROW LEVEL SECURITY;
ALTER TABLE personnel_expiries FORCE ROW LEVEL SECURITY;
ALTER TABLE financial_accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE operating_accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE causes FORCE ROW LEVEL SECURITY;
ALTER TABLE documents FORCE ROW LEVEL SECURITY;
ALTER TABLE document_lines FORCE ROW LEVEL SECURITY;
ALTER TABLE installments FORCE ROW LEVEL SECURITY;
ALTER TABLE journal_entries FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
-- ============================================================
-- DISABLE FORCE ROW LEVEL SECURITY (Rollback)
-- ============================================================

ALTER TABLE parties NO FORCE ROW LEVEL SECURITY;
ALTER TABLE sites NO FORCE ROW LEVEL SECURITY;
ALTER TABLE personnel_expiries NO FORCE ROW LEVEL SECURITY;
ALTER TABLE financial_accounts NO FORCE ROW LEVEL SECURITY;
ALTER TABLE operating_accounts NO FORCE ROW LEVEL SECURITY;
ALTER TABLE causes NO FORCE ROW LEVEL SECURITY;
ALTER TABLE documents NO FORCE ROW LEVEL SECURITY;
ALTER TABLE document_lines NO FORCE ROW LEVEL SECURITY;
ALTER TABLE installments NO FORCE ROW LEVEL SECURITY;
ALTER TABLE journal_entries NO FORCE ROW LEVEL SECURITY;
";
