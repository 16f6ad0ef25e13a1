//! Installment (scadenza) domain logic.
//!
//! An installment is one expected payment on a given date. Its allocated
//! total is always derived by summing the journal rows linked to it — never
//! stored — so deleting or editing a payment can never leave a stale total
//! behind.

pub mod allocation;
pub mod error;
pub mod types;

#[cfg(test)]
mod allocation_props;

pub use allocation::{
    AllocationPolicy, allocated_total, residual, settlement_status, validate_amended_payment,
    validate_new_payment,
};
pub use error::InstallmentError;
pub use types::{Installment, InstallmentKind, InstallmentStatus};
