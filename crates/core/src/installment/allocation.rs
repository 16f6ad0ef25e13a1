//! Payment allocation against installments.
//!
//! State per installment: `rate_amount` fixed at creation, `allocated_total`
//! derived as the sum of linked payments, `residual = rate_amount -
//! allocated_total`. An installment is open while the residual is positive
//! and settled when it reaches zero; a negative residual is a defect.
//!
//! The repository runs these checks between a locked read of the linked
//! payments and the write, so two concurrent payments cannot jointly
//! overpay.

use rust_decimal::Decimal;

use super::error::InstallmentError;
use super::types::InstallmentStatus;

/// Overpayment policy for a single allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationPolicy {
    /// Reject any amount above the open residual (default).
    #[default]
    Strict,
    /// The caller explicitly accepts exceeding the residual. The amount is
    /// still required to be positive and is never clamped.
    AllowOverpayment,
}

/// Sums payment amounts into the derived allocated total.
#[must_use]
pub fn allocated_total(payment_amounts: &[Decimal]) -> Decimal {
    payment_amounts.iter().copied().sum()
}

/// Residual still open on an installment.
#[must_use]
pub fn residual(rate_amount: Decimal, allocated: Decimal) -> Decimal {
    rate_amount - allocated
}

/// Derives the settlement status from the rate amount and allocations.
///
/// # Errors
///
/// Returns `InstallmentError::NegativeResidual` when allocations exceed the
/// rate amount — an integrity defect, not a validation failure.
pub fn settlement_status(
    rate_amount: Decimal,
    allocated: Decimal,
) -> Result<InstallmentStatus, InstallmentError> {
    let open = residual(rate_amount, allocated);
    if open < Decimal::ZERO {
        return Err(InstallmentError::NegativeResidual { residual: open });
    }
    if open == Decimal::ZERO {
        Ok(InstallmentStatus::Settled)
    } else {
        Ok(InstallmentStatus::Open)
    }
}

/// Validates a new payment of `amount` against the open `residual`.
///
/// # Errors
///
/// Returns `NonPositiveAmount` for amounts <= 0, and `ExceedsResidual`
/// (stating the maximum allowed) for amounts above the residual under the
/// strict policy.
pub fn validate_new_payment(
    amount: Decimal,
    open_residual: Decimal,
    policy: AllocationPolicy,
) -> Result<(), InstallmentError> {
    if amount <= Decimal::ZERO {
        return Err(InstallmentError::NonPositiveAmount);
    }
    if policy == AllocationPolicy::Strict && amount > open_residual {
        return Err(InstallmentError::ExceedsResidual {
            amount,
            max_allowed: open_residual,
        });
    }
    Ok(())
}

/// Validates the amended amount of an existing payment.
///
/// The allocated total is recomputed over all *other* payments linked to
/// the same installment; the edited payment may then grow up to
/// `rate_amount - allocated_excluding_self`.
///
/// # Errors
///
/// Same taxonomy as [`validate_new_payment`].
pub fn validate_amended_payment(
    new_amount: Decimal,
    rate_amount: Decimal,
    allocated_excluding_self: Decimal,
    policy: AllocationPolicy,
) -> Result<(), InstallmentError> {
    validate_new_payment(
        new_amount,
        residual(rate_amount, allocated_excluding_self),
        policy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_allocated_total_is_sum() {
        assert_eq!(allocated_total(&[dec!(400), dec!(100.50)]), dec!(500.50));
        assert_eq!(allocated_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_second_payment_exceeding_residual_names_maximum() {
        // rate 1000.00, existing payment 400.00
        let open = residual(dec!(1000.00), allocated_total(&[dec!(400.00)]));
        assert_eq!(open, dec!(600.00));

        let err = validate_new_payment(dec!(700.00), open, AllocationPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            InstallmentError::ExceedsResidual {
                amount: dec!(700.00),
                max_allowed: dec!(600.00),
            }
        );
    }

    #[test]
    fn test_exact_residual_settles_the_installment() {
        let open = residual(dec!(1000.00), dec!(400.00));
        assert!(validate_new_payment(dec!(600.00), open, AllocationPolicy::Strict).is_ok());

        let status = settlement_status(dec!(1000.00), dec!(1000.00)).unwrap();
        assert_eq!(status, InstallmentStatus::Settled);
    }

    #[test]
    fn test_partial_allocation_stays_open() {
        let status = settlement_status(dec!(1000.00), dec!(400.00)).unwrap();
        assert_eq!(status, InstallmentStatus::Open);
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        assert_eq!(
            validate_new_payment(Decimal::ZERO, dec!(100), AllocationPolicy::Strict),
            Err(InstallmentError::NonPositiveAmount)
        );
        assert_eq!(
            validate_new_payment(dec!(-5), dec!(100), AllocationPolicy::Strict),
            Err(InstallmentError::NonPositiveAmount)
        );
        // The override never relaxes the positivity requirement.
        assert_eq!(
            validate_new_payment(Decimal::ZERO, dec!(100), AllocationPolicy::AllowOverpayment),
            Err(InstallmentError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_explicit_override_allows_overpayment() {
        assert!(
            validate_new_payment(dec!(700.00), dec!(600.00), AllocationPolicy::AllowOverpayment)
                .is_ok()
        );
    }

    #[test]
    fn test_amending_sole_payment_up_to_rate_amount() {
        // rate 1000.00, editing the only payment of 400.00
        assert!(
            validate_amended_payment(
                dec!(550.00),
                dec!(1000.00),
                Decimal::ZERO,
                AllocationPolicy::Strict
            )
            .is_ok()
        );

        let err = validate_amended_payment(
            dec!(1050.00),
            dec!(1000.00),
            Decimal::ZERO,
            AllocationPolicy::Strict,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InstallmentError::ExceedsResidual {
                amount: dec!(1050.00),
                max_allowed: dec!(1000.00),
            }
        );
    }

    #[test]
    fn test_amending_with_other_payments_counts_only_the_others() {
        // rate 1000.00, payments 400.00 (editing) and 300.00 (other)
        assert!(
            validate_amended_payment(
                dec!(700.00),
                dec!(1000.00),
                dec!(300.00),
                AllocationPolicy::Strict
            )
            .is_ok()
        );
        assert!(
            validate_amended_payment(
                dec!(700.01),
                dec!(1000.00),
                dec!(300.00),
                AllocationPolicy::Strict
            )
            .is_err()
        );
    }

    #[test]
    fn test_overallocation_is_an_integrity_defect() {
        assert_eq!(
            settlement_status(dec!(1000.00), dec!(1200.00)),
            Err(InstallmentError::NegativeResidual { residual: dec!(-200.00) })
        );
    }
}
