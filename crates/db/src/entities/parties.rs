//! `SeaORM` entity for the parties (counterparties) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::PartyKind;

/// A customer and/or supplier record, owned by one company.
///
/// Identifier columns store normalized values; per-company uniqueness is
/// enforced by partial unique indexes in addition to the application check.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Commercial role.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// Normalized VAT number.
    pub vat_number: Option<String>,
    /// Normalized fiscal code.
    pub fiscal_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Inactive parties are hidden from pickers but keep their history.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
