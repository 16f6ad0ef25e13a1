//! Installment domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gestra_shared::types::{CompanyId, DocumentId, InstallmentId, PartyId, PersonnelExpiryId};

use crate::tenant::TenantOwned;

/// Direction of an installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentKind {
    /// Money expected to come in.
    Receivable,
    /// Money expected to go out.
    Payable,
}

/// Settlement state of an installment, derived from its residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// Residual greater than zero.
    Open,
    /// Residual exactly zero.
    Settled,
}

/// One expected payment on a given date.
///
/// Created at document-registration time (several per document when payment
/// terms split the total) or from a personnel-expiry deadline. The rate
/// amount is fixed at creation; only payment allocation mutates the
/// installment's state, and never this struct itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    /// Unique identifier.
    pub id: InstallmentId,
    /// Owning company, set at creation and never reassigned.
    pub company_id: CompanyId,
    /// Date the rate falls due.
    pub due_date: NaiveDate,
    /// Amount due, fixed at creation.
    pub rate_amount: Decimal,
    /// Receivable or payable.
    pub kind: InstallmentKind,
    /// Counterparty the rate is owed to / by, when known.
    pub party_id: Option<PartyId>,
    /// Originating document, if the installment came from one.
    pub document_id: Option<DocumentId>,
    /// Personnel-expiry context, for deadlines not backed by a document.
    pub personnel_expiry_id: Option<PersonnelExpiryId>,
}

impl TenantOwned for Installment {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_installment_is_tenant_owned() {
        let company = CompanyId::new();
        let installment = Installment {
            id: InstallmentId::new(),
            company_id: company,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            rate_amount: dec!(1000.00),
            kind: InstallmentKind::Receivable,
            party_id: None,
            document_id: None,
            personnel_expiry_id: None,
        };
        assert_eq!(TenantOwned::company_id(&installment), company);
    }
}
