//! Document error types.

use thiserror::Error;

/// Errors raised during document registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A document needs at least one line.
    #[error("a document requires at least one line")]
    NoLines,

    /// Purchase-side documents carry the supplier-assigned number.
    #[error("a supplier document number is required for purchase documents")]
    SupplierReferenceRequired,

    /// The same supplier document was already registered. Names the
    /// conflicting counterparty so the operator can find the earlier entry.
    #[error("document \"{reference}\" already registered for counterparty \"{party_name}\"")]
    DuplicateSupplierDocument {
        /// The normalized supplier document number.
        reference: String,
        /// Name of the counterparty on the conflicting document.
        party_name: String,
    },

    /// Payment terms must contain at least one due date.
    #[error("payment terms must contain at least one due date")]
    EmptyPaymentTerms,

    /// Installments can only be scheduled for a positive total.
    #[error("document total must be greater than zero to schedule installments")]
    NonPositiveTotal,
}

impl DocumentError {
    /// The input field the error is scoped to, if user-recoverable.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::SupplierReferenceRequired | Self::DuplicateSupplierDocument { .. } => {
                Some("supplier_reference")
            }
            Self::NoLines => Some("lines"),
            Self::EmptyPaymentTerms => Some("payment_terms"),
            Self::NonPositiveTotal => None,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::SupplierReferenceRequired => "SUPPLIER_REFERENCE_REQUIRED",
            Self::DuplicateSupplierDocument { .. } => "DUPLICATE_SUPPLIER_DOCUMENT",
            Self::EmptyPaymentTerms => "EMPTY_PAYMENT_TERMS",
            Self::NonPositiveTotal => "NON_POSITIVE_TOTAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_error_names_the_counterparty() {
        let err = DocumentError::DuplicateSupplierDocument {
            reference: "123".to_string(),
            party_name: "Bianchi SPA".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "document \"123\" already registered for counterparty \"Bianchi SPA\""
        );
        assert_eq!(err.field(), Some("supplier_reference"));
    }
}
