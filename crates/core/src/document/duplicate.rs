//! Duplicate supplier-document guard.
//!
//! Prevents double-entering the same supplier invoice: within one company,
//! a (counterparty, document kind, supplier document number) triple may
//! appear only once. Evaluated at submission time so the error can name the
//! conflicting counterparty; a partial unique index enforces the same rule
//! at the storage layer.

use gestra_shared::types::{DocumentId, PartyId};

use super::error::DocumentError;
use super::types::DocumentKind;

/// Normalizes a supplier document number for comparison and storage:
/// surrounding whitespace trimmed, uppercased. Idempotent.
#[must_use]
pub fn normalize_reference(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A document that already occupies a supplier-reference slot.
#[derive(Debug, Clone)]
pub struct ExistingDocument {
    /// Id of the conflicting document.
    pub id: DocumentId,
    /// Name of the counterparty on the conflicting document.
    pub party_name: String,
}

/// Checks a candidate registration against the duplicate-document rule.
///
/// Only purchase-side kinds are guarded; for those the supplier reference
/// is mandatory. `lookup` resolves the normalized triple to a conflicting
/// document within the active company scope, if any; the record under
/// update (`excluding`) never conflicts with itself.
///
/// # Errors
///
/// Returns `SupplierReferenceRequired` or `DuplicateSupplierDocument`.
pub fn check_supplier_document<F>(
    kind: DocumentKind,
    party_id: PartyId,
    supplier_reference: Option<&str>,
    excluding: Option<DocumentId>,
    lookup: F,
) -> Result<(), DocumentError>
where
    F: Fn(PartyId, DocumentKind, &str) -> Option<ExistingDocument>,
{
    if !kind.requires_supplier_reference() {
        return Ok(());
    }

    let reference = supplier_reference.map(normalize_reference).unwrap_or_default();
    if reference.is_empty() {
        return Err(DocumentError::SupplierReferenceRequired);
    }

    if let Some(existing) = lookup(party_id, kind, &reference)
        && excluding != Some(existing.id)
    {
        return Err(DocumentError::DuplicateSupplierDocument {
            reference,
            party_name: existing.party_name,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(id: DocumentId) -> impl Fn(PartyId, DocumentKind, &str) -> Option<ExistingDocument>
    {
        move |_party, _kind, reference| {
            (reference == "123").then(|| ExistingDocument {
                id,
                party_name: "Bianchi SPA".to_string(),
            })
        }
    }

    fn no_conflict(_: PartyId, _: DocumentKind, _: &str) -> Option<ExistingDocument> {
        None
    }

    #[test]
    fn test_normalize_reference_is_idempotent() {
        assert_eq!(normalize_reference("  ft-123 "), "FT-123");
        assert_eq!(normalize_reference("FT-123"), "FT-123");
    }

    #[test]
    fn test_duplicate_purchase_invoice_rejected() {
        let err = check_supplier_document(
            DocumentKind::PurchaseInvoice,
            PartyId::new(),
            Some("123"),
            None,
            conflict(DocumentId::new()),
        )
        .unwrap_err();

        assert_eq!(
            err,
            DocumentError::DuplicateSupplierDocument {
                reference: "123".to_string(),
                party_name: "Bianchi SPA".to_string(),
            }
        );
    }

    #[test]
    fn test_changed_reference_accepted() {
        assert!(
            check_supplier_document(
                DocumentKind::PurchaseInvoice,
                PartyId::new(),
                Some("124"),
                None,
                conflict(DocumentId::new()),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_record_under_update_does_not_conflict_with_itself() {
        let id = DocumentId::new();
        assert!(
            check_supplier_document(
                DocumentKind::PurchaseCreditNote,
                PartyId::new(),
                Some("123"),
                Some(id),
                conflict(id),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_purchase_documents_require_a_reference() {
        for reference in [None, Some(""), Some("   ")] {
            assert_eq!(
                check_supplier_document(
                    DocumentKind::PurchaseInvoice,
                    PartyId::new(),
                    reference,
                    None,
                    no_conflict,
                )
                .unwrap_err(),
                DocumentError::SupplierReferenceRequired
            );
        }
    }

    #[test]
    fn test_sales_documents_are_not_guarded() {
        assert!(
            check_supplier_document(
                DocumentKind::SalesInvoice,
                PartyId::new(),
                None,
                None,
                conflict(DocumentId::new()),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_reference_comparison_ignores_case_and_whitespace() {
        let err = check_supplier_document(
            DocumentKind::PurchaseInvoice,
            PartyId::new(),
            Some(" 123 "),
            None,
            conflict(DocumentId::new()),
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateSupplierDocument { .. }));
    }
}
