//! `SeaORM` entity for installments (scadenze).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::InstallmentKind;

/// One expected payment on a given date.
///
/// The allocated total is never stored: it is always derived by summing the
/// journal entries whose `installment_id` points here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Due date.
    pub due_date: Date,
    /// Amount due, fixed at creation.
    pub rate_amount: Decimal,
    /// Receivable or payable.
    pub kind: InstallmentKind,
    /// Counterparty, when known.
    pub party_id: Option<Uuid>,
    /// Originating document, if any.
    pub document_id: Option<Uuid>,
    /// Personnel-expiry context, for deadlines not backed by a document.
    pub personnel_expiry_id: Option<Uuid>,
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
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id"
    )]
    Documents,
    #[sea_orm(
        belongs_to = "super::personnel_expiries::Entity",
        from = "Column::PersonnelExpiryId",
        to = "super::personnel_expiries::Column::Id"
    )]
    PersonnelExpiries,
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
