//! Authentication types for JWT claims.
//!
//! Authentication itself (credential verification, token issuance) is an
//! external collaborator. This module only defines the contract the backend
//! consumes: an authenticated user and an optionally-selected company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// `company` is `None` for a user who has authenticated but not yet selected
/// a company to work in; in that state every tenant-owned read is fail-closed
/// (empty result set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Active company ID, if one has been selected.
    pub company: Option<Uuid>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, company_id: Option<Uuid>, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            company: company_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the active company ID, if any.
    #[must_use]
    pub const fn company_id(&self) -> Option<Uuid> {
        self.company
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_with_company() {
        let user = Uuid::now_v7();
        let company = Uuid::now_v7();
        let claims = Claims::new(user, Some(company), Utc::now() + Duration::minutes(15));
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.company_id(), Some(company));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_claims_without_company() {
        let claims = Claims::new(Uuid::now_v7(), None, Utc::now() + Duration::minutes(15));
        assert_eq!(claims.company_id(), None);
    }
}
