//! Journal entry domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gestra_shared::types::{
    CompanyId, FinancialAccountId, InstallmentId, JournalEntryId, OperatingAccountId, PartyId,
    SiteId, TransferId,
};

use crate::tenant::TenantOwned;

/// Direction of a journal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Money coming in.
    Inflow,
    /// Money going out.
    Outflow,
}

impl MovementKind {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Inflow => Self::Outflow,
            Self::Outflow => Self::Inflow,
        }
    }
}

/// Posting mode selected by a transaction cause code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    /// One entry against a single account; movement supplied by the caller.
    Ordinary,
    /// Internal transfer between two financial accounts; movements derived.
    Transfer,
}

/// One dated monetary entry against an account.
///
/// A payment is a journal entry with `installment_id` set (1:1 settlement
/// link). A transfer leg carries `transfer_id`; the pair always shares the
/// same amount and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Owning company, set at creation and never reassigned.
    pub company_id: CompanyId,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Amount, strictly positive; direction is carried by `movement`.
    pub amount: Decimal,
    /// Inflow or outflow.
    pub movement: MovementKind,
    /// Transaction cause code.
    pub cause_code: String,
    /// Cash/bank account, for financial movements.
    pub financial_account_id: Option<FinancialAccountId>,
    /// Cost-center account, for operating movements.
    pub operating_account_id: Option<OperatingAccountId>,
    /// Optional counterparty tag.
    pub party_id: Option<PartyId>,
    /// Optional job-site tag.
    pub site_id: Option<SiteId>,
    /// Set when this entry settles an installment.
    pub installment_id: Option<InstallmentId>,
    /// Set on both legs of an internal transfer.
    pub transfer_id: Option<TransferId>,
    /// Set on both legs of a reversal pair, pointing at the transfer being
    /// reversed.
    pub reverses_transfer_id: Option<TransferId>,
    /// Free-text description.
    pub description: String,
}

impl JournalEntry {
    /// Returns the signed amount (positive inflow, negative outflow).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.movement {
            MovementKind::Inflow => self.amount,
            MovementKind::Outflow => -self.amount,
        }
    }

    /// Returns true when this entry is one leg of a transfer.
    #[must_use]
    pub const fn is_transfer_leg(&self) -> bool {
        self.transfer_id.is_some()
    }
}

impl TenantOwned for JournalEntry {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_movement_opposite() {
        assert_eq!(MovementKind::Inflow.opposite(), MovementKind::Outflow);
        assert_eq!(MovementKind::Outflow.opposite(), MovementKind::Inflow);
    }

    #[test]
    fn test_signed_amount() {
        let mut entry = JournalEntry {
            id: JournalEntryId::new(),
            company_id: CompanyId::new(),
            entry_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            amount: dec!(250.00),
            movement: MovementKind::Inflow,
            cause_code: "INC".to_string(),
            financial_account_id: Some(FinancialAccountId::new()),
            operating_account_id: None,
            party_id: None,
            site_id: None,
            installment_id: None,
            transfer_id: None,
            reverses_transfer_id: None,
            description: String::new(),
        };
        assert_eq!(entry.signed_amount(), dec!(250.00));
        assert!(!entry.is_transfer_leg());

        entry.movement = MovementKind::Outflow;
        assert_eq!(entry.signed_amount(), dec!(-250.00));
    }
}
