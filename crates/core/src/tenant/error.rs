//! Tenant-isolation error types.

use gestra_shared::types::CompanyId;
use thiserror::Error;

/// Errors raised by tenant-scoping checks.
///
/// Both variants signal a caller bug (a write attempted without resolving
/// the scope, or against the wrong scope), never a user-recoverable
/// condition. They must not be retried or swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantError {
    /// A save was attempted with no active company scope and no explicit
    /// company on the entity.
    #[error("no active company scope and no explicit company supplied")]
    MissingTenant,

    /// A write targeted an entity owned by a different company than the
    /// active scope.
    #[error("entity belongs to company {owner} but the active scope is company {scope}")]
    CrossTenant {
        /// The company that owns the entity.
        owner: CompanyId,
        /// The company of the active scope.
        scope: CompanyId,
    },
}

impl TenantError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTenant => "MISSING_TENANT",
            Self::CrossTenant { .. } => "CROSS_TENANT_WRITE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TenantError::MissingTenant.error_code(), "MISSING_TENANT");
        assert_eq!(
            TenantError::CrossTenant {
                owner: CompanyId::new(),
                scope: CompanyId::new(),
            }
            .error_code(),
            "CROSS_TENANT_WRITE"
        );
    }

    #[test]
    fn test_display_names_both_companies() {
        let owner = CompanyId::new();
        let scope = CompanyId::new();
        let message = TenantError::CrossTenant { owner, scope }.to_string();
        assert!(message.contains(&owner.to_string()));
        assert!(message.contains(&scope.to_string()));
    }
}
