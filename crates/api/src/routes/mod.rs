//! API route definitions.

use axum::middleware;
use axum::response::Response;
use axum::Router;

use gestra_db::TenantConn;
use gestra_db::scope::ScopeExt;
use gestra_shared::AppError;

use crate::middleware::{AuthUser, auth_middleware};
use crate::responses::fail;
use crate::AppState;

pub mod accounts;
pub mod companies;
pub mod documents;
pub mod health;
pub mod installments;
pub mod journal;
pub mod parties;
pub mod sites;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(companies::routes())
        .merge(parties::routes())
        .merge(sites::routes())
        .merge(accounts::routes())
        .merge(documents::routes())
        .merge(installments::routes())
        .merge(journal::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Opens the request's unit of work: one scoped transaction, committed on
/// success and rolled back when dropped on any error path.
pub(crate) async fn open_scope(state: &AppState, auth: &AuthUser) -> Result<TenantConn, Response> {
    state
        .db
        .with_scope(auth.scope())
        .await
        .map_err(|e| fail(AppError::Database(e.to_string())))
}

/// Commits the unit of work, mapping failures onto the error response.
pub(crate) async fn commit(conn: TenantConn) -> Result<(), Response> {
    conn.commit()
        .await
        .map_err(|e| fail(AppError::Database(e.to_string())))
}
