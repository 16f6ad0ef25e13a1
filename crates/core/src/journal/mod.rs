//! Journal (prima nota) domain logic.
//!
//! One journal entry is one dated, signed monetary movement against an
//! account. An internal transfer (giroconto) is a pair of entries that share
//! a transfer id and always appear, change, and disappear together.

pub mod error;
pub mod transfer;
pub mod types;

pub use error::JournalError;
pub use transfer::{AmendTransferInput, PostMovementInput, Posting, TransferEngine, TransferPair};
pub use types::{CauseKind, JournalEntry, MovementKind};
