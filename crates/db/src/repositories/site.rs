//! Job-site repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use gestra_core::tenant::TenantError;
use gestra_shared::AppError;

use crate::entities::sites;
use crate::scope::TenantConn;

/// Error types for job-site operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Site not found (or owned by another company).
    #[error("site not found: {0}")]
    NotFound(Uuid),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SiteError> for AppError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::NotFound(id) => Self::NotFound(format!("site {id}")),
            SiteError::Tenant(e) => Self::Integrity(e.to_string()),
            SiteError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a job site.
#[derive(Debug, Clone)]
pub struct CreateSiteInput {
    /// Site name.
    pub name: String,
    /// Site address.
    pub address: Option<String>,
}

/// Scoped repository for job sites.
pub struct SiteRepository;

impl SiteRepository {
    /// Lists job sites of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        conn: &TenantConn,
        active_only: bool,
    ) -> Result<Vec<sites::Model>, SiteError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query =
            sites::Entity::find().filter(sites::Column::CompanyId.eq(company_id.into_inner()));
        if active_only {
            query = query.filter(sites::Column::IsActive.eq(true));
        }

        Ok(query
            .order_by_asc(sites::Column::Name)
            .all(conn.transaction())
            .await?)
    }

    /// Creates a job site under the active scope.
    ///
    /// # Errors
    ///
    /// Returns `Tenant` with no active scope.
    pub async fn create(
        conn: &TenantConn,
        input: CreateSiteInput,
    ) -> Result<sites::Model, SiteError> {
        let company_id = conn.scope().stamp(None)?;

        let now = Utc::now().into();
        let model = sites::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            name: Set(input.name),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Toggles a site's active flag; historical tags keep their references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or foreign rows.
    pub async fn set_active(
        conn: &TenantConn,
        id: Uuid,
        is_active: bool,
    ) -> Result<sites::Model, SiteError> {
        let Some(company_id) = conn.company_id() else {
            return Err(SiteError::NotFound(id));
        };

        let site = sites::Entity::find_by_id(id)
            .filter(sites::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(SiteError::NotFound(id))?;

        let mut model: sites::ActiveModel = site.into();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now().into());
        Ok(model.update(conn.transaction()).await?)
    }
}
