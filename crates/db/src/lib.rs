//! Database layer with `SeaORM` entities and scoped repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - A tenant-scoped connection (`TenantConn`) that binds every query of a
//!   request to one company
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod scope;

pub use repositories::{
    AccountRepository, CompanyRepository, DocumentRepository, InstallmentRepository,
    JournalRepository, PartyRepository,
};
pub use scope::{ScopeExt, TenantConn};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
