//! Database enum mappings.
//!
//! Mirrors of the core domain enums as `PostgreSQL` enum types, plus the
//! conversions between the two worlds.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Commercial role of a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_kind")]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// A customer (sales side).
    #[sea_orm(string_value = "customer")]
    Customer,
    /// A supplier (purchase side).
    #[sea_orm(string_value = "supplier")]
    Supplier,
    /// Both roles.
    #[sea_orm(string_value = "both")]
    Both,
}

/// Document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_kind")]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice issued to a customer.
    #[sea_orm(string_value = "sales_invoice")]
    SalesInvoice,
    /// Credit note issued to a customer.
    #[sea_orm(string_value = "sales_credit_note")]
    SalesCreditNote,
    /// Invoice received from a supplier.
    #[sea_orm(string_value = "purchase_invoice")]
    PurchaseInvoice,
    /// Credit note received from a supplier.
    #[sea_orm(string_value = "purchase_credit_note")]
    PurchaseCreditNote,
}

/// Direction of an installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "installment_kind")]
#[serde(rename_all = "lowercase")]
pub enum InstallmentKind {
    /// Money expected to come in.
    #[sea_orm(string_value = "receivable")]
    Receivable,
    /// Money expected to go out.
    #[sea_orm(string_value = "payable")]
    Payable,
}

/// Direction of a journal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_kind")]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Money coming in.
    #[sea_orm(string_value = "inflow")]
    Inflow,
    /// Money going out.
    #[sea_orm(string_value = "outflow")]
    Outflow,
}

/// Posting mode of a transaction cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cause_kind")]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    /// Single-entry movement.
    #[sea_orm(string_value = "ordinary")]
    Ordinary,
    /// Internal transfer between two financial accounts.
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl From<gestra_core::party::PartyKind> for PartyKind {
    fn from(kind: gestra_core::party::PartyKind) -> Self {
        match kind {
            gestra_core::party::PartyKind::Customer => Self::Customer,
            gestra_core::party::PartyKind::Supplier => Self::Supplier,
            gestra_core::party::PartyKind::Both => Self::Both,
        }
    }
}

impl From<PartyKind> for gestra_core::party::PartyKind {
    fn from(kind: PartyKind) -> Self {
        match kind {
            PartyKind::Customer => Self::Customer,
            PartyKind::Supplier => Self::Supplier,
            PartyKind::Both => Self::Both,
        }
    }
}

impl From<gestra_core::document::DocumentKind> for DocumentKind {
    fn from(kind: gestra_core::document::DocumentKind) -> Self {
        match kind {
            gestra_core::document::DocumentKind::SalesInvoice => Self::SalesInvoice,
            gestra_core::document::DocumentKind::SalesCreditNote => Self::SalesCreditNote,
            gestra_core::document::DocumentKind::PurchaseInvoice => Self::PurchaseInvoice,
            gestra_core::document::DocumentKind::PurchaseCreditNote => Self::PurchaseCreditNote,
        }
    }
}

impl From<DocumentKind> for gestra_core::document::DocumentKind {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::SalesInvoice => Self::SalesInvoice,
            DocumentKind::SalesCreditNote => Self::SalesCreditNote,
            DocumentKind::PurchaseInvoice => Self::PurchaseInvoice,
            DocumentKind::PurchaseCreditNote => Self::PurchaseCreditNote,
        }
    }
}

impl From<gestra_core::installment::InstallmentKind> for InstallmentKind {
    fn from(kind: gestra_core::installment::InstallmentKind) -> Self {
        match kind {
            gestra_core::installment::InstallmentKind::Receivable => Self::Receivable,
            gestra_core::installment::InstallmentKind::Payable => Self::Payable,
        }
    }
}

impl From<InstallmentKind> for gestra_core::installment::InstallmentKind {
    fn from(kind: InstallmentKind) -> Self {
        match kind {
            InstallmentKind::Receivable => Self::Receivable,
            InstallmentKind::Payable => Self::Payable,
        }
    }
}

impl From<gestra_core::journal::MovementKind> for MovementKind {
    fn from(kind: gestra_core::journal::MovementKind) -> Self {
        match kind {
            gestra_core::journal::MovementKind::Inflow => Self::Inflow,
            gestra_core::journal::MovementKind::Outflow => Self::Outflow,
        }
    }
}

impl From<MovementKind> for gestra_core::journal::MovementKind {
    fn from(kind: MovementKind) -> Self {
        match kind {
            MovementKind::Inflow => Self::Inflow,
            MovementKind::Outflow => Self::Outflow,
        }
    }
}

impl From<gestra_core::journal::CauseKind> for CauseKind {
    fn from(kind: gestra_core::journal::CauseKind) -> Self {
        match kind {
            gestra_core::journal::CauseKind::Ordinary => Self::Ordinary,
            gestra_core::journal::CauseKind::Transfer => Self::Transfer,
        }
    }
}

impl From<CauseKind> for gestra_core::journal::CauseKind {
    fn from(kind: CauseKind) -> Self {
        match kind {
            CauseKind::Ordinary => Self::Ordinary,
            CauseKind::Transfer => Self::Transfer,
        }
    }
}
