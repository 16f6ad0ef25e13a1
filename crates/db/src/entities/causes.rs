//! `SeaORM` entity for transaction causes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::CauseKind;

/// A transaction cause (causale): classifies a journal posting as an
/// ordinary movement or an internal transfer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "causes")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Short code, unique per company.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Posting mode this cause selects.
    pub kind: CauseKind,
    /// Inactive causes reject new postings while history stays readable.
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
