//! `SeaORM` entity for the companies (tenants) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A company: one isolated tenant owning all its business records.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Legal name.
    pub name: String,
    /// VAT number (digits only).
    pub vat_number: Option<String>,
    /// Inactive companies reject new work while history stays readable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
