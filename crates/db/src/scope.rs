//! Tenant-scoped connection management.
//!
//! This module binds the per-request [`TenantScope`] to one database
//! transaction. On open, the `PostgreSQL` session variable
//! `app.current_company_id` is set with `SET LOCAL`, so row-level-security
//! policies enforce isolation underneath the explicit filters the
//! repositories apply.
//!
//! # Usage
//!
//! ```ignore
//! use gestra_core::tenant::TenantScope;
//! use gestra_db::scope::ScopeExt;
//!
//! // In your handler, after resolving the scope from the claims:
//! let conn = db.with_scope(scope).await?;
//!
//! let parties = PartyRepository::list(&conn, PartyFilter::default()).await?;
//!
//! // Commit when done; dropping the connection instead rolls back.
//! conn.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use gestra_core::tenant::TenantScope;
use gestra_shared::types::CompanyId;

/// A database transaction carrying the company scope of one request.
///
/// The transaction is the unit of work of the request: dropping the
/// `TenantConn` without committing rolls everything back, and the
/// `SET LOCAL` scope variable dies with the transaction, so an aborted
/// request can never bleed its company into a pooled connection.
///
/// Under an anonymous scope no variable is set: the RLS policies then yield
/// zero rows, and the repositories independently refuse to widen any query
/// beyond the active company (fail-closed at both layers).
pub struct TenantConn {
    txn: DatabaseTransaction,
    scope: TenantScope,
}

impl TenantConn {
    /// Opens a scoped transaction on the given connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the scope
    /// variable cannot be set.
    pub async fn begin(db: &DatabaseConnection, scope: TenantScope) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        if let Some(company_id) = scope.company() {
            // SET LOCAL scopes the variable to this transaction only.
            let sql = format!("SET LOCAL app.current_company_id = '{company_id}'");
            txn.execute_unprepared(&sql).await?;
        }

        Ok(Self { txn, scope })
    }

    /// The scope this connection was opened under.
    #[must_use]
    pub const fn scope(&self) -> TenantScope {
        self.scope
    }

    /// The active company, if the scope has one.
    #[must_use]
    pub const fn company_id(&self) -> Option<CompanyId> {
        self.scope.company()
    }

    /// Returns a reference to the underlying transaction for executing
    /// queries.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to open scoped connections.
#[async_trait::async_trait]
pub trait ScopeExt {
    /// Opens a tenant-scoped transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the scoped transaction cannot be opened.
    async fn with_scope(&self, scope: TenantScope) -> Result<TenantConn, DbErr>;
}

#[async_trait::async_trait]
impl ScopeExt for DatabaseConnection {
    async fn with_scope(&self, scope: TenantScope) -> Result<TenantConn, DbErr> {
        TenantConn::begin(self, scope).await
    }
}

#[cfg(test)]
mod tests {
    use gestra_shared::types::CompanyId;
    use uuid::Uuid;

    // Scoped-query behavior against live RLS policies is covered by the
    // integration tests; here we only pin the SET LOCAL statement shape.

    #[test]
    fn test_scope_sql_format() {
        let company_id =
            CompanyId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap());
        let sql = format!("SET LOCAL app.current_company_id = '{company_id}'");
        assert_eq!(
            sql,
            "SET LOCAL app.current_company_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
