//! Installment scheduling from payment terms.

use chrono::Days;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use gestra_shared::types::InstallmentId;

use crate::installment::Installment;

use super::error::DocumentError;
use super::types::DocumentHeader;

/// Payment terms: ordered day-offsets from the issue date.
///
/// `[30, 60, 90]` is the classic three-way split; `[0]` is payment on
/// delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentTerms {
    /// Days after the issue date each rate falls due.
    pub due_days: Vec<u32>,
}

impl PaymentTerms {
    /// Terms with the given offsets.
    #[must_use]
    pub fn new(due_days: Vec<u32>) -> Self {
        Self { due_days }
    }

    /// Single rate due immediately.
    #[must_use]
    pub fn immediate() -> Self {
        Self { due_days: vec![0] }
    }

    /// Number of rates.
    #[must_use]
    pub fn rate_count(&self) -> usize {
        self.due_days.len()
    }
}

impl Default for PaymentTerms {
    fn default() -> Self {
        Self::immediate()
    }
}

/// Splits a total into `count` rates of 2 decimal places.
///
/// Every rate is the even-rounded share; the rounding remainder is folded
/// into the last rate so the rates always sum back to the total.
#[must_use]
pub fn split_total(total: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }

    let divisor = Decimal::from(count);
    let share = (total / divisor).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    let mut rates = vec![share; count];
    let allocated: Decimal = share * Decimal::from(count - 1);
    rates[count - 1] = total - allocated;
    rates
}

/// Schedules the installments a document registration creates.
///
/// One installment per payment-terms entry, each due `days` after the issue
/// date, in the direction the document kind dictates.
///
/// # Errors
///
/// Returns `EmptyPaymentTerms` or `NonPositiveTotal`.
pub fn build_installments(
    header: &DocumentHeader,
    total: Decimal,
) -> Result<Vec<Installment>, DocumentError> {
    if header.payment_terms.due_days.is_empty() {
        return Err(DocumentError::EmptyPaymentTerms);
    }
    if total <= Decimal::ZERO {
        return Err(DocumentError::NonPositiveTotal);
    }

    let rates = split_total(total, header.payment_terms.rate_count());
    let kind = header.kind.installment_kind();

    Ok(header
        .payment_terms
        .due_days
        .iter()
        .zip(rates)
        .map(|(&days, rate_amount)| Installment {
            id: InstallmentId::new(),
            company_id: header.company_id,
            due_date: header
                .issue_date
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(header.issue_date),
            rate_amount,
            kind,
            party_id: Some(header.party_id),
            document_id: Some(header.id),
            personnel_expiry_id: None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::DocumentKind;
    use crate::installment::InstallmentKind;
    use chrono::NaiveDate;
    use gestra_shared::types::{CompanyId, DocumentId, PartyId};
    use rust_decimal_macros::dec;

    fn header(kind: DocumentKind, terms: PaymentTerms) -> DocumentHeader {
        DocumentHeader {
            id: DocumentId::new(),
            company_id: CompanyId::new(),
            kind,
            party_id: PartyId::new(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            supplier_reference: None,
            payment_terms: terms,
        }
    }

    #[test]
    fn test_split_preserves_the_total() {
        assert_eq!(
            split_total(dec!(1000.00), 3),
            vec![dec!(333.33), dec!(333.33), dec!(333.34)]
        );
        assert_eq!(split_total(dec!(100.00), 1), vec![dec!(100.00)]);
        assert_eq!(split_total(dec!(0.01), 3), vec![dec!(0.00), dec!(0.00), dec!(0.01)]);
        assert!(split_total(dec!(10), 0).is_empty());
    }

    #[test]
    fn test_three_way_terms_schedule_three_installments() {
        let header = header(DocumentKind::SalesInvoice, PaymentTerms::new(vec![30, 60, 90]));
        let installments = build_installments(&header, dec!(1000.00)).unwrap();

        assert_eq!(installments.len(), 3);
        let total: Decimal = installments.iter().map(|i| i.rate_amount).sum();
        assert_eq!(total, dec!(1000.00));

        assert_eq!(
            installments[0].due_date,
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
        assert_eq!(
            installments[2].due_date,
            NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
        );
        assert!(installments.iter().all(|i| i.kind == InstallmentKind::Receivable));
        assert!(installments.iter().all(|i| i.document_id == Some(header.id)));
        assert!(installments.iter().all(|i| i.company_id == header.company_id));
    }

    #[test]
    fn test_purchase_invoice_schedules_payables() {
        let header = header(DocumentKind::PurchaseInvoice, PaymentTerms::immediate());
        let installments = build_installments(&header, dec!(250.00)).unwrap();

        assert_eq!(installments.len(), 1);
        assert_eq!(installments[0].kind, InstallmentKind::Payable);
        assert_eq!(installments[0].due_date, header.issue_date);
        assert_eq!(installments[0].rate_amount, dec!(250.00));
    }

    #[test]
    fn test_empty_terms_rejected() {
        let header = header(DocumentKind::SalesInvoice, PaymentTerms::new(vec![]));
        assert_eq!(
            build_installments(&header, dec!(100)).unwrap_err(),
            DocumentError::EmptyPaymentTerms
        );
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let header = header(DocumentKind::SalesInvoice, PaymentTerms::immediate());
        assert_eq!(
            build_installments(&header, Decimal::ZERO).unwrap_err(),
            DocumentError::NonPositiveTotal
        );
    }
}
