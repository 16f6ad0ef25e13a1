//! Financial and operating account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use gestra_db::repositories::{AccountRepository, CreateFinancialAccountInput};

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/financial", get(list_financial))
        .route("/accounts/financial", post(create_financial))
        .route("/accounts/financial/{account_id}/active", patch(set_financial_active))
        .route("/accounts/operating", get(list_operating))
        .route("/accounts/operating", post(create_operating))
        .route("/accounts/operating/{account_id}/active", patch(set_operating_active))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Only active accounts.
    #[serde(default)]
    pub active_only: bool,
}

/// Request body for creating a financial account.
#[derive(Debug, Deserialize)]
pub struct CreateFinancialAccountRequest {
    /// Account name.
    pub name: String,
    /// IBAN, for bank accounts.
    pub iban: Option<String>,
}

/// Request body for creating an operating account.
#[derive(Debug, Deserialize)]
pub struct CreateOperatingAccountRequest {
    /// Account name.
    pub name: String,
}

/// Request body for toggling an account's active flag.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Response for a financial account.
#[derive(Debug, Serialize)]
pub struct FinancialAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
    /// IBAN.
    pub iban: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

/// Response for an operating account.
#[derive(Debug, Serialize)]
pub struct OperatingAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
    /// Active flag.
    pub is_active: bool,
}

/// GET `/accounts/financial` - List cash/bank accounts.
async fn list_financial(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match AccountRepository::list_financial(&conn, query.active_only).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<FinancialAccountResponse> = rows
                .into_iter()
                .map(|a| FinancialAccountResponse {
                    id: a.id,
                    name: a.name,
                    iban: a.iban,
                    is_active: a.is_active,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/accounts/financial` - Create a cash/bank account.
async fn create_financial(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateFinancialAccountRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = CreateFinancialAccountInput {
        name: payload.name,
        iban: payload.iban,
    };

    match AccountRepository::create_financial(&conn, input).await {
        Ok(account) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({ "account": FinancialAccountResponse {
                    id: account.id,
                    name: account.name,
                    iban: account.iban,
                    is_active: account.is_active,
                }})),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/accounts/financial/{account_id}/active` - Gate future postings.
async fn set_financial_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match AccountRepository::set_financial_active(&conn, account_id, payload.is_active).await {
        Ok(account) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "account": FinancialAccountResponse {
                    id: account.id,
                    name: account.name,
                    iban: account.iban,
                    is_active: account.is_active,
                }})),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/accounts/operating` - List cost-center accounts.
async fn list_operating(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match AccountRepository::list_operating(&conn, query.active_only).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<OperatingAccountResponse> = rows
                .into_iter()
                .map(|a| OperatingAccountResponse {
                    id: a.id,
                    name: a.name,
                    is_active: a.is_active,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/accounts/operating` - Create a cost-center account.
async fn create_operating(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOperatingAccountRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match AccountRepository::create_operating(&conn, payload.name).await {
        Ok(account) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({ "account": OperatingAccountResponse {
                    id: account.id,
                    name: account.name,
                    is_active: account.is_active,
                }})),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/accounts/operating/{account_id}/active` - Gate future postings.
async fn set_operating_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match AccountRepository::set_operating_active(&conn, account_id, payload.is_active).await {
        Ok(account) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "account": OperatingAccountResponse {
                    id: account.id,
                    name: account.name,
                    is_active: account.is_active,
                }})),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
