//! Property-based tests for payment allocation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocation::{
    AllocationPolicy, allocated_total, residual, settlement_status, validate_amended_payment,
    validate_new_payment,
};
use super::error::InstallmentError;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A sequence of payments each accepted under the strict policy can
    /// never drive the residual negative, so the settlement status is
    /// always derivable.
    #[test]
    fn prop_strict_allocation_never_overpays(
        rate in positive_amount(),
        amounts in prop::collection::vec(positive_amount(), 0..12),
    ) {
        let mut accepted: Vec<Decimal> = Vec::new();

        for amount in amounts {
            let open = residual(rate, allocated_total(&accepted));
            if validate_new_payment(amount, open, AllocationPolicy::Strict).is_ok() {
                accepted.push(amount);
            }
        }

        let allocated = allocated_total(&accepted);
        prop_assert!(allocated <= rate);
        prop_assert!(residual(rate, allocated) >= Decimal::ZERO);
        prop_assert!(settlement_status(rate, allocated).is_ok());
    }

    /// Non-positive amounts are rejected under every policy.
    #[test]
    fn prop_non_positive_amounts_always_rejected(
        open in positive_amount(),
        negated in positive_amount(),
    ) {
        for policy in [AllocationPolicy::Strict, AllocationPolicy::AllowOverpayment] {
            prop_assert_eq!(
                validate_new_payment(-negated, open, policy),
                Err(InstallmentError::NonPositiveAmount)
            );
            prop_assert_eq!(
                validate_new_payment(Decimal::ZERO, open, policy),
                Err(InstallmentError::NonPositiveAmount)
            );
        }
    }

    /// An amended payment accepted under the strict policy keeps the total
    /// allocation within the rate amount.
    #[test]
    fn prop_amended_payment_keeps_allocation_within_rate(
        rate in positive_amount(),
        others_fraction in 0u32..=100,
        new_amount in positive_amount(),
    ) {
        // Others occupy a fraction of the rate; the edited payment may grow
        // into whatever remains.
        let others = (rate * Decimal::from(others_fraction) / Decimal::from(100u32))
            .round_dp(2);

        let result = validate_amended_payment(
            new_amount,
            rate,
            others,
            AllocationPolicy::Strict,
        );

        if result.is_ok() {
            prop_assert!(others + new_amount <= rate);
        } else {
            prop_assert!(new_amount > rate - others);
        }
    }
}
