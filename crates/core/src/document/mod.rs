//! Document (invoice / credit note) domain logic.
//!
//! Headers and lines, per-line tax arithmetic, the duplicate
//! supplier-document guard, and installment scheduling from payment terms.

pub mod duplicate;
pub mod error;
pub mod schedule;
pub mod types;

pub use duplicate::{ExistingDocument, check_supplier_document, normalize_reference};
pub use error::DocumentError;
pub use schedule::{PaymentTerms, build_installments, split_total};
pub use types::{DocumentHeader, DocumentKind, DocumentLine, document_total};
