//! `SeaORM` entity for document headers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::DocumentKind;

/// A document header (invoice or credit note).
///
/// `supplier_reference` stores the normalized supplier-assigned number on
/// purchase documents; a partial unique index on (company, party, kind,
/// reference) backs the duplicate guard.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Counterparty.
    pub party_id: Uuid,
    /// Document kind.
    pub kind: DocumentKind,
    /// Issue date.
    pub issue_date: Date,
    /// Normalized supplier-assigned document number (purchase side).
    pub supplier_reference: Option<String>,
    /// Payment terms as an array of day offsets.
    pub payment_terms: Json,
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
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(has_many = "super::document_lines::Entity")]
    DocumentLines,
    #[sea_orm(has_many = "super::installments::Entity")]
    Installments,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::document_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
