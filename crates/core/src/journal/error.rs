//! Journal posting error types.

use thiserror::Error;

use gestra_shared::types::{FinancialAccountId, JournalEntryId, OperatingAccountId, TransferId};

/// Errors raised while posting, amending, or reversing journal entries.
///
/// Checks are deliberately sequenced — cause classification first, then
/// account-pair checks, then movement requirements — so each message is
/// specific to the actual scenario (transfer vs. ordinary).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    /// Entry amounts must be strictly positive.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Ordinary entries need a caller-supplied movement kind.
    #[error("a movement kind is required for ordinary entries")]
    MovementRequired,

    /// Transfer movements are derived by the engine, never user-supplied.
    #[error("movement kind is derived for transfers and must not be supplied")]
    MovementNotAllowed,

    /// Ordinary entries target exactly one account.
    #[error("exactly one financial or operating account is required")]
    AccountRequired,

    /// A transfer needs a source financial account.
    #[error("a source account is required for transfers")]
    SourceAccountRequired,

    /// A transfer needs a destination financial account.
    #[error("a destination account is required for transfers")]
    DestinationAccountRequired,

    /// Transfers move funds between two distinct accounts.
    #[error("source and destination accounts must differ")]
    SameAccountTransfer,

    /// Financial account not found (or owned by another company).
    #[error("financial account not found: {0}")]
    FinancialAccountNotFound(FinancialAccountId),

    /// Operating account not found (or owned by another company).
    #[error("operating account not found: {0}")]
    OperatingAccountNotFound(OperatingAccountId),

    /// The account exists but is closed to new postings.
    #[error("financial account {0} is inactive")]
    AccountInactive(FinancialAccountId),

    /// The cost-center account exists but is closed to new postings.
    #[error("operating account {0} is inactive")]
    OperatingAccountInactive(OperatingAccountId),

    /// The two rows given as a transfer do not form a consistent pair.
    #[error("journal entries do not form a transfer pair")]
    NotATransferPair,

    /// A transfer can be reversed at most once.
    #[error("transfer {0} was already reversed")]
    AlreadyReversed(TransferId),

    /// Single legs of a transfer cannot be edited or deleted in isolation.
    #[error("journal entry {0} is a transfer leg; amend or reverse the transfer as a unit")]
    TransferLeg(JournalEntryId),
}

impl JournalError {
    /// The input field the error is scoped to, if user-recoverable.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::NonPositiveAmount => Some("amount"),
            Self::MovementRequired | Self::MovementNotAllowed => Some("movement"),
            Self::AccountRequired => Some("account"),
            Self::SourceAccountRequired => Some("source_account"),
            // Scoped to the destination: the source is usually the account
            // the operator is already working in.
            Self::DestinationAccountRequired | Self::SameAccountTransfer => {
                Some("destination_account")
            }
            Self::FinancialAccountNotFound(_)
            | Self::OperatingAccountNotFound(_)
            | Self::AccountInactive(_)
            | Self::OperatingAccountInactive(_)
            | Self::NotATransferPair
            | Self::AlreadyReversed(_)
            | Self::TransferLeg(_) => None,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::MovementRequired => "MOVEMENT_REQUIRED",
            Self::MovementNotAllowed => "MOVEMENT_NOT_ALLOWED",
            Self::AccountRequired => "ACCOUNT_REQUIRED",
            Self::SourceAccountRequired => "SOURCE_ACCOUNT_REQUIRED",
            Self::DestinationAccountRequired => "DESTINATION_ACCOUNT_REQUIRED",
            Self::SameAccountTransfer => "SAME_ACCOUNT_TRANSFER",
            Self::FinancialAccountNotFound(_) => "FINANCIAL_ACCOUNT_NOT_FOUND",
            Self::OperatingAccountNotFound(_) => "OPERATING_ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::OperatingAccountInactive(_) => "OPERATING_ACCOUNT_INACTIVE",
            Self::NotATransferPair => "NOT_A_TRANSFER_PAIR",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::TransferLeg(_) => "TRANSFER_LEG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_account_error_is_destination_scoped() {
        assert_eq!(
            JournalError::SameAccountTransfer.field(),
            Some("destination_account")
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            JournalError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            JournalError::AlreadyReversed(TransferId::new()).error_code(),
            "ALREADY_REVERSED"
        );
        assert_eq!(
            JournalError::TransferLeg(JournalEntryId::new()).error_code(),
            "TRANSFER_LEG"
        );
    }
}
