//! Company scoping and tenant-isolation primitives.
//!
//! Every persisted business record belongs to exactly one company. The scope
//! is resolved once per request from the authenticated claims and passed
//! explicitly into every data-access call; it is immutable for the lifetime
//! of the request. There is no ambient or thread-local tenant state.

pub mod error;
pub mod scope;

pub use error::TenantError;
pub use scope::{TenantOwned, TenantScope};
