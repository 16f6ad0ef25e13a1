//! Counterparty repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use gestra_core::party::{
    PartyIdentity, PartyKind, check_unique_identifiers, normalize_fiscal_code,
    normalize_vat_number,
};
use gestra_core::tenant::TenantError;
use gestra_shared::{AppError, FieldErrors};
use gestra_shared::types::PartyId;

use crate::entities::parties;
use crate::scope::TenantConn;

/// Error types for counterparty operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Counterparty not found (or owned by another company).
    #[error("counterparty not found: {0}")]
    NotFound(Uuid),

    /// Field-scoped validation failure (identifier uniqueness).
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PartyError> for AppError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::NotFound(id) => Self::NotFound(format!("counterparty {id}")),
            PartyError::Validation(fields) => Self::Validation(fields),
            PartyError::Tenant(e) => Self::Integrity(e.to_string()),
            PartyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a counterparty.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Commercial role.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// VAT number, normalized before storage.
    pub vat_number: Option<String>,
    /// Fiscal code, normalized before storage.
    pub fiscal_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
}

/// Input for updating a counterparty. `None` leaves a field unchanged; the
/// owning company is never part of an update.
#[derive(Debug, Clone, Default)]
pub struct UpdatePartyInput {
    /// New display name.
    pub name: Option<String>,
    /// New commercial role.
    pub kind: Option<PartyKind>,
    /// New VAT number.
    pub vat_number: Option<String>,
    /// New fiscal code.
    pub fiscal_code: Option<String>,
    /// New street address.
    pub address: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Filter options for listing counterparties.
#[derive(Debug, Clone, Default)]
pub struct PartyFilter {
    /// Filter by commercial role.
    pub kind: Option<PartyKind>,
    /// Only active records.
    pub active_only: bool,
    /// Case-insensitive name fragment.
    pub search: Option<String>,
}

/// Scoped repository for counterparties.
pub struct PartyRepository;

impl PartyRepository {
    /// Lists counterparties of the active company.
    ///
    /// Under an anonymous scope the result is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        conn: &TenantConn,
        filter: PartyFilter,
    ) -> Result<Vec<parties::Model>, PartyError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = parties::Entity::find()
            .filter(parties::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(kind) = filter.kind {
            query = query.filter(parties::Column::Kind.eq(crate::entities::enums::PartyKind::from(kind)));
        }
        if filter.active_only {
            query = query.filter(parties::Column::IsActive.eq(true));
        }
        if let Some(search) = filter.search {
            query = query.filter(parties::Column::Name.contains(&search));
        }

        Ok(query
            .order_by_asc(parties::Column::Name)
            .all(conn.transaction())
            .await?)
    }

    /// Finds one counterparty of the active company.
    ///
    /// A row owned by another company is reported as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(
        conn: &TenantConn,
        id: Uuid,
    ) -> Result<Option<parties::Model>, PartyError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(None);
        };

        Ok(parties::Entity::find_by_id(id)
            .filter(parties::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?)
    }

    /// Creates a counterparty under the active scope.
    ///
    /// Identifiers are normalized, then checked for per-company uniqueness;
    /// both fields are validated in one pass and violations returned
    /// together.
    ///
    /// # Errors
    ///
    /// Returns `Tenant` with no active scope, `Validation` on identifier
    /// conflicts.
    pub async fn create(
        conn: &TenantConn,
        input: CreatePartyInput,
    ) -> Result<parties::Model, PartyError> {
        let company_id = conn.scope().stamp(None)?;

        let vat_number = input
            .vat_number
            .as_deref()
            .map(normalize_vat_number)
            .filter(|v| !v.is_empty());
        let fiscal_code = input
            .fiscal_code
            .as_deref()
            .map(normalize_fiscal_code)
            .filter(|v| !v.is_empty());

        let candidate = PartyIdentity {
            id: None,
            name: input.name.clone(),
            vat_number: vat_number.clone(),
            fiscal_code: fiscal_code.clone(),
        };
        let siblings = Self::identity_siblings(conn, company_id.into_inner()).await?;
        check_unique_identifiers(&candidate, &siblings).map_err(PartyError::Validation)?;

        let now = Utc::now().into();
        let model = parties::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            kind: Set(input.kind.into()),
            name: Set(input.name),
            vat_number: Set(vat_number),
            fiscal_code: Set(fiscal_code),
            address: Set(input.address),
            city: Set(input.city),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Updates a counterparty of the active company.
    ///
    /// The record under update is excluded from the uniqueness comparison.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or foreign rows, `Validation` on
    /// identifier conflicts.
    pub async fn update(
        conn: &TenantConn,
        id: Uuid,
        input: UpdatePartyInput,
    ) -> Result<parties::Model, PartyError> {
        let existing = Self::find_by_id(conn, id)
            .await?
            .ok_or(PartyError::NotFound(id))?;

        let vat_number = input
            .vat_number
            .as_deref()
            .map(normalize_vat_number)
            .filter(|v| !v.is_empty())
            .or_else(|| existing.vat_number.clone());
        let fiscal_code = input
            .fiscal_code
            .as_deref()
            .map(normalize_fiscal_code)
            .filter(|v| !v.is_empty())
            .or_else(|| existing.fiscal_code.clone());
        let name = input.name.unwrap_or_else(|| existing.name.clone());

        let candidate = PartyIdentity {
            id: Some(PartyId::from_uuid(id)),
            name: name.clone(),
            vat_number: vat_number.clone(),
            fiscal_code: fiscal_code.clone(),
        };
        let siblings = Self::identity_siblings(conn, existing.company_id).await?;
        check_unique_identifiers(&candidate, &siblings).map_err(PartyError::Validation)?;

        let mut model: parties::ActiveModel = existing.into();
        model.name = Set(name);
        model.vat_number = Set(vat_number);
        model.fiscal_code = Set(fiscal_code);
        if let Some(kind) = input.kind {
            model.kind = Set(kind.into());
        }
        if let Some(address) = input.address {
            model.address = Set(Some(address));
        }
        if let Some(city) = input.city {
            model.city = Set(Some(city));
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Utc::now().into());

        Ok(model.update(conn.transaction()).await?)
    }

    /// Loads the identifier set of the company for uniqueness comparison.
    async fn identity_siblings(
        conn: &TenantConn,
        company_id: Uuid,
    ) -> Result<Vec<PartyIdentity>, PartyError> {
        let rows = parties::Entity::find()
            .filter(parties::Column::CompanyId.eq(company_id))
            .filter(
                Condition::any()
                    .add(parties::Column::VatNumber.is_not_null())
                    .add(parties::Column::FiscalCode.is_not_null()),
            )
            .all(conn.transaction())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PartyIdentity {
                id: Some(PartyId::from_uuid(row.id)),
                name: row.name,
                vat_number: row.vat_number,
                fiscal_code: row.fiscal_code,
            })
            .collect())
    }
}
