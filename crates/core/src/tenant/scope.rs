//! The per-request company scope.

use gestra_shared::types::CompanyId;

use super::error::TenantError;

/// Capability implemented once per tenant-owned entity type.
///
/// Marking a type as `TenantOwned` is all an entity needs to inherit
/// isolation: the scoped read/write helpers below and the scoped
/// repositories in the db layer refuse to operate outside the owning
/// company. The company reference is set exactly once at creation and never
/// reassigned.
pub trait TenantOwned {
    /// The company that owns this entity.
    fn company_id(&self) -> CompanyId;
}

/// The active company scope of one in-flight request.
///
/// Resolved from the authenticated claims after tenant selection and passed
/// by reference into every data-access call. `Anonymous` is a valid state
/// (pre-selection requests): every tenant-owned read under it yields an
/// empty result, never an unfiltered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Requests acting on behalf of one company.
    Company(CompanyId),
    /// Authenticated-but-unselected or anonymous requests. Fail-closed.
    Anonymous,
}

impl TenantScope {
    /// Builds a scope from an optional company id (the claims contract).
    #[must_use]
    pub fn from_claims(company_id: Option<CompanyId>) -> Self {
        company_id.map_or(Self::Anonymous, Self::Company)
    }

    /// Returns the active company, if any.
    #[must_use]
    pub const fn company(&self) -> Option<CompanyId> {
        match self {
            Self::Company(id) => Some(*id),
            Self::Anonymous => None,
        }
    }

    /// Returns true when no company is active.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns true when the entity belongs to the active company.
    /// Always false under `Anonymous`.
    #[must_use]
    pub fn owns<T: TenantOwned>(&self, entity: &T) -> bool {
        self.company() == Some(entity.company_id())
    }

    /// Filters a sequence down to the rows owned by the active company.
    ///
    /// Under `Anonymous` the result is empty regardless of input: absence of
    /// a scope must never widen a read to all tenants.
    pub fn filter_owned<T, I>(&self, entities: I) -> impl Iterator<Item = T>
    where
        T: TenantOwned,
        I: IntoIterator<Item = T>,
    {
        let company = self.company();
        entities
            .into_iter()
            .filter(move |entity| company == Some(entity.company_id()))
    }

    /// Resolves a single lookup result under this scope.
    ///
    /// A row owned by another company is reported as absent, identical to a
    /// row that does not exist, so existence never leaks across tenants.
    #[must_use]
    pub fn find_owned<T: TenantOwned>(&self, entity: Option<T>) -> Option<T> {
        entity.filter(|found| self.owns(found))
    }

    /// Resolves the owning company for a new entity about to be saved.
    ///
    /// - entity has no company, scope active: stamped with the scope company
    /// - entity has no company, no scope: `MissingTenant` (caller bug)
    /// - entity already has a company equal to the scope: kept
    /// - entity has a company contradicting the scope: `CrossTenant`
    ///
    /// An explicit company with no active scope is accepted: the caller
    /// supplied the owner itself (provisioning paths).
    ///
    /// # Errors
    ///
    /// Returns `TenantError` on the integrity failures described above.
    pub fn stamp(&self, existing: Option<CompanyId>) -> Result<CompanyId, TenantError> {
        match (existing, self.company()) {
            (Some(owner), Some(scope)) if owner != scope => {
                Err(TenantError::CrossTenant { owner, scope })
            }
            (Some(owner), _) => Ok(owner),
            (None, Some(scope)) => Ok(scope),
            (None, None) => Err(TenantError::MissingTenant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        company_id: CompanyId,
        value: u32,
    }

    impl TenantOwned for Row {
        fn company_id(&self) -> CompanyId {
            self.company_id
        }
    }

    fn rows(company_a: CompanyId, company_b: CompanyId) -> Vec<Row> {
        vec![
            Row { company_id: company_a, value: 1 },
            Row { company_id: company_b, value: 2 },
            Row { company_id: company_a, value: 3 },
        ]
    }

    #[test]
    fn test_filter_returns_only_active_company_rows() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        let scope = TenantScope::Company(a);

        let values: Vec<u32> = scope.filter_owned(rows(a, b)).map(|r| r.value).collect();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn test_anonymous_filter_is_empty() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        let scope = TenantScope::Anonymous;

        assert_eq!(scope.filter_owned(rows(a, b)).count(), 0);
    }

    #[test]
    fn test_find_owned_hides_foreign_rows() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        let scope = TenantScope::Company(a);

        let foreign = Row { company_id: b, value: 2 };
        assert_eq!(scope.find_owned(Some(foreign)), None);

        let mine = Row { company_id: a, value: 1 };
        assert!(scope.find_owned(Some(mine)).is_some());
        assert_eq!(scope.find_owned(None::<Row>), None);
    }

    #[test]
    fn test_stamp_populates_from_scope() {
        let a = CompanyId::new();
        assert_eq!(TenantScope::Company(a).stamp(None), Ok(a));
    }

    #[test]
    fn test_stamp_without_scope_or_company_is_integrity_error() {
        assert_eq!(
            TenantScope::Anonymous.stamp(None),
            Err(TenantError::MissingTenant)
        );
    }

    #[test]
    fn test_stamp_keeps_existing_company() {
        let a = CompanyId::new();
        assert_eq!(TenantScope::Company(a).stamp(Some(a)), Ok(a));
        // Explicit owner with no scope: provisioning path.
        assert_eq!(TenantScope::Anonymous.stamp(Some(a)), Ok(a));
    }

    #[test]
    fn test_stamp_rejects_cross_tenant_write() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        assert_eq!(
            TenantScope::Company(a).stamp(Some(b)),
            Err(TenantError::CrossTenant { owner: b, scope: a })
        );
    }

    #[test]
    fn test_from_claims() {
        let a = CompanyId::new();
        assert_eq!(TenantScope::from_claims(Some(a)), TenantScope::Company(a));
        assert_eq!(TenantScope::from_claims(None), TenantScope::Anonymous);
        assert!(TenantScope::from_claims(None).is_anonymous());
    }
}
