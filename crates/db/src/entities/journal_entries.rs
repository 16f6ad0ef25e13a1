//! `SeaORM` entity for journal entries (prima nota).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::MovementKind;

/// One dated monetary entry against an account.
///
/// `installment_id` marks the entry as a payment settling that installment.
/// `transfer_id` links the two legs of an internal transfer; the legs are
/// only ever written, amended, and reversed together.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Entry date.
    pub entry_date: Date,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Inflow or outflow.
    pub movement: MovementKind,
    /// Transaction cause code.
    pub cause_code: String,
    /// Cash/bank account.
    pub financial_account_id: Option<Uuid>,
    /// Cost-center account.
    pub operating_account_id: Option<Uuid>,
    /// Optional counterparty tag.
    pub party_id: Option<Uuid>,
    /// Optional job-site tag.
    pub site_id: Option<Uuid>,
    /// Installment settled by this entry, when it is a payment.
    pub installment_id: Option<Uuid>,
    /// Transfer group shared by both legs of a giroconto.
    pub transfer_id: Option<Uuid>,
    /// Transfer group this entry's pair reverses.
    pub reverses_transfer_id: Option<Uuid>,
    /// Free-text description.
    pub description: String,
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
        belongs_to = "super::financial_accounts::Entity",
        from = "Column::FinancialAccountId",
        to = "super::financial_accounts::Column::Id"
    )]
    FinancialAccounts,
    #[sea_orm(
        belongs_to = "super::operating_accounts::Entity",
        from = "Column::OperatingAccountId",
        to = "super::operating_accounts::Column::Id"
    )]
    OperatingAccounts,
    #[sea_orm(
        belongs_to = "super::installments::Entity",
        from = "Column::InstallmentId",
        to = "super::installments::Column::Id"
    )]
    Installments,
}

impl Related<super::installments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
