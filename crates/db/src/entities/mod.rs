//! `SeaORM` entity definitions.
//!
//! Every tenant-owned table carries a non-null `company_id` set exactly once
//! at insert time and never updated afterwards.

pub mod causes;
pub mod companies;
pub mod document_lines;
pub mod documents;
pub mod enums;
pub mod financial_accounts;
pub mod installments;
pub mod journal_entries;
pub mod operating_accounts;
pub mod parties;
pub mod personnel_expiries;
pub mod sites;
