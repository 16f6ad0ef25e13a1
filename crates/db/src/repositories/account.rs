//! Financial and operating account repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use gestra_core::tenant::TenantError;
use gestra_shared::AppError;

use crate::entities::{financial_accounts, operating_accounts};
use crate::scope::TenantConn;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found (or owned by another company).
    #[error("account not found: {0}")]
    NotFound(Uuid),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::NotFound(format!("account {id}")),
            AccountError::Tenant(e) => Self::Integrity(e.to_string()),
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a financial account.
#[derive(Debug, Clone)]
pub struct CreateFinancialAccountInput {
    /// Account name.
    pub name: String,
    /// IBAN, for bank accounts.
    pub iban: Option<String>,
}

/// Scoped repository for cash/bank and cost-center accounts.
pub struct AccountRepository;

impl AccountRepository {
    /// Lists financial accounts of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_financial(
        conn: &TenantConn,
        active_only: bool,
    ) -> Result<Vec<financial_accounts::Model>, AccountError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = financial_accounts::Entity::find()
            .filter(financial_accounts::Column::CompanyId.eq(company_id.into_inner()));
        if active_only {
            query = query.filter(financial_accounts::Column::IsActive.eq(true));
        }

        Ok(query
            .order_by_asc(financial_accounts::Column::Name)
            .all(conn.transaction())
            .await?)
    }

    /// Lists operating accounts of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_operating(
        conn: &TenantConn,
        active_only: bool,
    ) -> Result<Vec<operating_accounts::Model>, AccountError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = operating_accounts::Entity::find()
            .filter(operating_accounts::Column::CompanyId.eq(company_id.into_inner()));
        if active_only {
            query = query.filter(operating_accounts::Column::IsActive.eq(true));
        }

        Ok(query
            .order_by_asc(operating_accounts::Column::Name)
            .all(conn.transaction())
            .await?)
    }

    /// Creates a financial account under the active scope.
    ///
    /// # Errors
    ///
    /// Returns `Tenant` with no active scope.
    pub async fn create_financial(
        conn: &TenantConn,
        input: CreateFinancialAccountInput,
    ) -> Result<financial_accounts::Model, AccountError> {
        let company_id = conn.scope().stamp(None)?;

        let now = Utc::now().into();
        let model = financial_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            name: Set(input.name),
            iban: Set(input.iban),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Creates an operating account under the active scope.
    ///
    /// # Errors
    ///
    /// Returns `Tenant` with no active scope.
    pub async fn create_operating(
        conn: &TenantConn,
        name: String,
    ) -> Result<operating_accounts::Model, AccountError> {
        let company_id = conn.scope().stamp(None)?;

        let now = Utc::now().into();
        let model = operating_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            name: Set(name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Toggles a financial account's active flag.
    ///
    /// Deactivation gates future postings; historical entries keep their
    /// references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or foreign rows.
    pub async fn set_financial_active(
        conn: &TenantConn,
        id: Uuid,
        is_active: bool,
    ) -> Result<financial_accounts::Model, AccountError> {
        let Some(company_id) = conn.company_id() else {
            return Err(AccountError::NotFound(id));
        };

        let account = financial_accounts::Entity::find_by_id(id)
            .filter(financial_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut model: financial_accounts::ActiveModel = account.into();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now().into());
        Ok(model.update(conn.transaction()).await?)
    }

    /// Toggles an operating account's active flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or foreign rows.
    pub async fn set_operating_active(
        conn: &TenantConn,
        id: Uuid,
        is_active: bool,
    ) -> Result<operating_accounts::Model, AccountError> {
        let Some(company_id) = conn.company_id() else {
            return Err(AccountError::NotFound(id));
        };

        let account = operating_accounts::Entity::find_by_id(id)
            .filter(operating_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut model: operating_accounts::ActiveModel = account.into();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now().into());
        Ok(model.update(conn.transaction()).await?)
    }
}
