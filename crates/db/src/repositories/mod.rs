//! Scoped repository abstractions for data access.
//!
//! Every repository method that touches a tenant-owned table takes a
//! [`TenantConn`](crate::scope::TenantConn) and intersects its queries with
//! the connection's company scope. Under an anonymous scope reads return no
//! rows and writes fail with an integrity error — fail-closed, never
//! fail-open to all tenants. Row-level security enforces the same boundary
//! redundantly underneath.

pub mod account;
pub mod company;
pub mod document;
pub mod installment;
pub mod journal;
pub mod party;
pub mod site;

pub use account::{AccountError, AccountRepository, CreateFinancialAccountInput};
pub use company::{CompanyError, CompanyRepository, CreateCompanyInput};
pub use document::{
    DocumentError, DocumentFilter, DocumentRepository, RegisterDocumentInput, RegisterLineInput,
    RegisteredDocument,
};
pub use installment::{
    InstallmentBalance, InstallmentRepository, PaymentError, PersonnelInstallmentInput,
    RegisterPaymentInput,
};
pub use journal::{
    AmendTransferInput, JournalFilter, JournalRepository, PostMovementInput, PostedMovement,
    PostingError,
};
pub use party::{CreatePartyInput, PartyError, PartyFilter, PartyRepository, UpdatePartyInput};
pub use site::{CreateSiteInput, SiteError, SiteRepository};
