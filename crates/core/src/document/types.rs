//! Document domain types and line arithmetic.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use gestra_shared::types::{CompanyId, DocumentId, DocumentLineId, PartyId};

use crate::installment::InstallmentKind;
use crate::tenant::TenantOwned;

use super::schedule::PaymentTerms;

/// Document kinds handled by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice issued to a customer.
    SalesInvoice,
    /// Credit note issued to a customer.
    SalesCreditNote,
    /// Invoice received from a supplier.
    PurchaseInvoice,
    /// Credit note received from a supplier.
    PurchaseCreditNote,
}

impl DocumentKind {
    /// Returns true for purchase-side kinds.
    #[must_use]
    pub const fn is_purchase(&self) -> bool {
        matches!(self, Self::PurchaseInvoice | Self::PurchaseCreditNote)
    }

    /// Purchase-side documents carry the supplier-assigned number, which is
    /// what the duplicate guard keys on.
    #[must_use]
    pub const fn requires_supplier_reference(&self) -> bool {
        self.is_purchase()
    }

    /// Direction of the installments this document schedules.
    ///
    /// Invoices create expectations in the document's own direction; credit
    /// notes create them in the opposite one (a sales credit note is money
    /// owed back to the customer).
    #[must_use]
    pub const fn installment_kind(&self) -> InstallmentKind {
        match self {
            Self::SalesInvoice | Self::PurchaseCreditNote => InstallmentKind::Receivable,
            Self::SalesCreditNote | Self::PurchaseInvoice => InstallmentKind::Payable,
        }
    }
}

/// One document line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Unique identifier.
    pub id: DocumentLineId,
    /// Line description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax rate percentage (e.g. 22 for 22%).
    pub tax_rate: Decimal,
}

impl DocumentLine {
    /// Taxable amount: quantity x unit price, banker's rounding to 2 places.
    #[must_use]
    pub fn taxable_amount(&self) -> Decimal {
        (self.quantity * self.unit_price)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Tax amount on the rounded taxable amount.
    #[must_use]
    pub fn tax_amount(&self) -> Decimal {
        (self.taxable_amount() * self.tax_rate / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Line total, taxable plus tax.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.taxable_amount() + self.tax_amount()
    }
}

/// Sums line totals into the document total.
#[must_use]
pub fn document_total(lines: &[DocumentLine]) -> Decimal {
    lines.iter().map(DocumentLine::total).sum()
}

/// A document header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Unique identifier.
    pub id: DocumentId,
    /// Owning company, set at creation and never reassigned.
    pub company_id: CompanyId,
    /// Document kind.
    pub kind: DocumentKind,
    /// Counterparty the document was issued to / received from.
    pub party_id: PartyId,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Supplier-assigned document number (purchase side).
    pub supplier_reference: Option<String>,
    /// Payment terms used to schedule installments.
    pub payment_terms: PaymentTerms,
}

impl TenantOwned for DocumentHeader {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> DocumentLine {
        DocumentLine {
            id: DocumentLineId::new(),
            description: "concrete".to_string(),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    #[test]
    fn test_kind_classification() {
        assert!(DocumentKind::PurchaseInvoice.is_purchase());
        assert!(DocumentKind::PurchaseCreditNote.is_purchase());
        assert!(!DocumentKind::SalesInvoice.is_purchase());
        assert!(DocumentKind::PurchaseInvoice.requires_supplier_reference());
        assert!(!DocumentKind::SalesCreditNote.requires_supplier_reference());
    }

    #[test]
    fn test_installment_direction() {
        assert_eq!(
            DocumentKind::SalesInvoice.installment_kind(),
            InstallmentKind::Receivable
        );
        assert_eq!(
            DocumentKind::PurchaseInvoice.installment_kind(),
            InstallmentKind::Payable
        );
        assert_eq!(
            DocumentKind::SalesCreditNote.installment_kind(),
            InstallmentKind::Payable
        );
        assert_eq!(
            DocumentKind::PurchaseCreditNote.installment_kind(),
            InstallmentKind::Receivable
        );
    }

    #[test]
    fn test_line_amounts() {
        let l = line(dec!(3), dec!(10.50), dec!(22));
        assert_eq!(l.taxable_amount(), dec!(31.50));
        assert_eq!(l.tax_amount(), dec!(6.93));
        assert_eq!(l.total(), dec!(38.43));
    }

    #[test]
    fn test_line_rounding_is_bankers() {
        // 2.5 cents of tax lands on the even neighbour.
        let l = line(dec!(1), dec!(0.50), dec!(5));
        assert_eq!(l.taxable_amount(), dec!(0.50));
        assert_eq!(l.tax_amount(), dec!(0.02));
    }

    #[test]
    fn test_document_total_sums_lines() {
        let lines = vec![
            line(dec!(2), dec!(100.00), dec!(22)),
            line(dec!(1), dec!(50.00), dec!(10)),
        ];
        // 244.00 + 55.00
        assert_eq!(document_total(&lines), dec!(299.00));
        assert_eq!(document_total(&[]), Decimal::ZERO);
    }
}
