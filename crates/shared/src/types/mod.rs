//! Shared type definitions.

pub mod id;

pub use id::{
    CompanyId, DocumentId, DocumentLineId, FinancialAccountId, InstallmentId, JournalEntryId,
    OperatingAccountId, PartyId, PersonnelExpiryId, SiteId, TransferId, UserId,
};
