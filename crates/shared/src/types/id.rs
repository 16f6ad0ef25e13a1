//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PartyId` where a
//! `CompanyId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a company (tenant).");
typed_id!(UserId, "Unique identifier for a user.");
typed_id!(PartyId, "Unique identifier for a counterparty (customer/supplier).");
typed_id!(DocumentId, "Unique identifier for a document header.");
typed_id!(DocumentLineId, "Unique identifier for a document line.");
typed_id!(InstallmentId, "Unique identifier for an installment.");
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(TransferId, "Identifier shared by the two legs of an internal transfer.");
typed_id!(FinancialAccountId, "Unique identifier for a cash/bank account.");
typed_id!(OperatingAccountId, "Unique identifier for a cost-center account.");
typed_id!(PersonnelExpiryId, "Unique identifier for a personnel expiry deadline.");
typed_id!(SiteId, "Unique identifier for a job site.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ids_are_distinct() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_roundtrip_via_string() {
        let id = InstallmentId::new();
        let parsed = InstallmentId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::now_v7();
        assert_eq!(CompanyId::from_uuid(uuid).into_inner(), uuid);
        assert_eq!(CompanyId::from(uuid).into_inner(), uuid);
    }
}
