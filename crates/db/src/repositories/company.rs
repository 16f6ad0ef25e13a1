//! Company (tenant) repository.
//!
//! Companies are the tenants themselves, so these operations run outside
//! any company scope: creation is a provisioning concern and lookups here
//! back tenant selection, not tenant-owned data access.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use gestra_core::party::normalize_vat_number;
use gestra_shared::AppError;

use crate::entities::companies;

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company not found.
    #[error("company not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CompanyError> for AppError {
    fn from(err: CompanyError) -> Self {
        match err {
            CompanyError::NotFound(id) => Self::NotFound(format!("company {id}")),
            CompanyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Legal name.
    pub name: String,
    /// VAT number, normalized before storage.
    pub vat_number: Option<String>,
}

/// Repository for company provisioning and lookup.
pub struct CompanyRepository;

impl CompanyRepository {
    /// Creates a new company.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        db: &DatabaseConnection,
        input: CreateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        let now = Utc::now().into();
        let model = companies::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            vat_number: Set(input
                .vat_number
                .as_deref()
                .map(normalize_vat_number)
                .filter(|v| !v.is_empty())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(db).await?)
    }

    /// Finds a company by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<companies::Model>, CompanyError> {
        Ok(companies::Entity::find_by_id(id).one(db).await?)
    }

    /// Lists active companies, for tenant selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_active(
        db: &DatabaseConnection,
    ) -> Result<Vec<companies::Model>, CompanyError> {
        Ok(companies::Entity::find()
            .filter(companies::Column::IsActive.eq(true))
            .order_by_asc(companies::Column::Name)
            .all(db)
            .await?)
    }

    /// Toggles a company's active flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the company does not exist.
    pub async fn set_active(
        db: &DatabaseConnection,
        id: Uuid,
        is_active: bool,
    ) -> Result<companies::Model, CompanyError> {
        let company = companies::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        let mut model: companies::ActiveModel = company.into();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now().into());
        Ok(model.update(db).await?)
    }
}
