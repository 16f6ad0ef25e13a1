//! Counterparty (customer/supplier) domain logic.
//!
//! Identifier normalization and per-company uniqueness checks. The storage
//! layer enforces the same uniqueness redundantly through partial unique
//! indexes; the checks here exist to produce field-scoped, user-correctable
//! errors at submission time.

pub mod normalize;
pub mod uniqueness;

pub use normalize::{normalize_fiscal_code, normalize_vat_number};
pub use uniqueness::{PartyIdentity, check_unique_identifiers};

use serde::{Deserialize, Serialize};

/// The commercial role of a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// A customer (sales side).
    Customer,
    /// A supplier (purchase side).
    Supplier,
    /// Both a customer and a supplier.
    Both,
}

impl PartyKind {
    /// Returns true when the party can appear on sales documents.
    #[must_use]
    pub const fn is_customer(&self) -> bool {
        matches!(self, Self::Customer | Self::Both)
    }

    /// Returns true when the party can appear on purchase documents.
    #[must_use]
    pub const fn is_supplier(&self) -> bool {
        matches!(self, Self::Supplier | Self::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_kind_roles() {
        assert!(PartyKind::Customer.is_customer());
        assert!(!PartyKind::Customer.is_supplier());
        assert!(PartyKind::Supplier.is_supplier());
        assert!(!PartyKind::Supplier.is_customer());
        assert!(PartyKind::Both.is_customer());
        assert!(PartyKind::Both.is_supplier());
    }
}
