//! Installment allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by payment-allocation checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallmentError {
    /// Payment amounts must be strictly positive.
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,

    /// The payment would overpay the installment. The message states the
    /// maximum allowed amount so the caller can correct the input without a
    /// second round trip; the amount is never silently clamped.
    #[error("payment of {amount} exceeds the open residual; maximum allowed is {max_allowed}")]
    ExceedsResidual {
        /// The rejected amount.
        amount: Decimal,
        /// The largest amount currently accepted.
        max_allowed: Decimal,
    },

    /// Allocations already exceed the rate amount. No valid code path
    /// produces this: it signals corrupted rows, not bad input.
    #[error("allocations exceed the installment rate amount; residual would be {residual}")]
    NegativeResidual {
        /// The (negative) residual that was computed.
        residual: Decimal,
    },
}

impl InstallmentError {
    /// The input field the error is scoped to, if user-recoverable.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::NonPositiveAmount | Self::ExceedsResidual { .. } => Some("amount"),
            Self::NegativeResidual { .. } => None,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::ExceedsResidual { .. } => "EXCEEDS_RESIDUAL",
            Self::NegativeResidual { .. } => "NEGATIVE_RESIDUAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exceeds_residual_states_maximum() {
        let err = InstallmentError::ExceedsResidual {
            amount: dec!(700.00),
            max_allowed: dec!(600.00),
        };
        assert_eq!(
            err.to_string(),
            "payment of 700.00 exceeds the open residual; maximum allowed is 600.00"
        );
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn test_negative_residual_is_not_field_scoped() {
        let err = InstallmentError::NegativeResidual { residual: dec!(-50) };
        assert_eq!(err.field(), None);
        assert_eq!(err.error_code(), "NEGATIVE_RESIDUAL");
    }
}
