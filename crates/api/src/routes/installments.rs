//! Installment and payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use gestra_core::installment::{AllocationPolicy, InstallmentKind, InstallmentStatus};
use gestra_db::repositories::{
    InstallmentBalance, InstallmentRepository, PersonnelInstallmentInput, RegisterPaymentInput,
};
use gestra_shared::AppError;

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the installment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/installments/open", get(list_open))
        .route("/installments/personnel-expiry", post(create_for_expiry))
        .route("/installments/{installment_id}", get(get_balance))
        .route("/installments/{installment_id}/payments", get(list_payments))
        .route("/installments/{installment_id}/payments", post(register_payment))
        .route("/payments/{payment_id}", patch(amend_payment))
        .route("/payments/{payment_id}", delete(delete_payment))
        .route("/personnel-expiries", get(list_expiries))
        .route("/personnel-expiries", post(create_expiry))
}

/// Query parameters for listing open installments.
#[derive(Debug, Deserialize)]
pub struct ListOpenQuery {
    /// Only installments due on or before this date.
    pub as_of: Option<NaiveDate>,
}

/// Request body for registering a payment.
#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    /// Payment amount, as a decimal string.
    pub amount: String,
    /// Payment date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// Settlement account.
    pub financial_account_id: Uuid,
    /// Ordinary cause code.
    pub cause_code: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Explicit overpayment override; never implied.
    #[serde(default)]
    pub allow_overpayment: bool,
}

/// Request body for amending a payment amount.
#[derive(Debug, Deserialize)]
pub struct AmendPaymentRequest {
    /// New amount, as a decimal string.
    pub amount: String,
    /// Explicit overpayment override; never implied.
    #[serde(default)]
    pub allow_overpayment: bool,
}

/// Request body for recording a personnel expiry.
#[derive(Debug, Deserialize)]
pub struct CreateExpiryRequest {
    /// Employee the deadline belongs to.
    pub employee_name: String,
    /// What expires.
    pub description: String,
    /// Expiry date (YYYY-MM-DD).
    pub expiry_date: NaiveDate,
}

/// Request body for creating an installment from a personnel expiry.
#[derive(Debug, Deserialize)]
pub struct PersonnelInstallmentRequest {
    /// The backing personnel expiry.
    pub personnel_expiry_id: Uuid,
    /// Due date (YYYY-MM-DD).
    pub due_date: NaiveDate,
    /// Amount due, as a decimal string.
    pub rate_amount: String,
    /// Direction.
    pub kind: InstallmentKind,
    /// Counterparty, when known.
    pub party_id: Option<Uuid>,
}

/// Response for an installment with its derived balance.
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    /// Installment ID.
    pub id: Uuid,
    /// Due date.
    pub due_date: String,
    /// Rate amount.
    pub rate_amount: String,
    /// Direction.
    pub kind: gestra_db::entities::enums::InstallmentKind,
    /// Sum of linked payments.
    pub allocated: String,
    /// Rate amount minus allocated.
    pub residual: String,
    /// Open or settled.
    pub status: InstallmentStatus,
    /// Originating document.
    pub document_id: Option<Uuid>,
    /// Personnel-expiry context.
    pub personnel_expiry_id: Option<Uuid>,
}

impl From<InstallmentBalance> for InstallmentResponse {
    fn from(balance: InstallmentBalance) -> Self {
        Self {
            id: balance.installment.id,
            due_date: balance.installment.due_date.to_string(),
            rate_amount: balance.installment.rate_amount.to_string(),
            kind: balance.installment.kind,
            allocated: balance.allocated.to_string(),
            residual: balance.residual.to_string(),
            status: balance.status,
            document_id: balance.installment.document_id,
            personnel_expiry_id: balance.installment.personnel_expiry_id,
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, Response> {
    Decimal::from_str(raw)
        .map_err(|_| fail(AppError::field("amount", format!("invalid decimal: {raw}"))))
}

const fn policy(allow_overpayment: bool) -> AllocationPolicy {
    if allow_overpayment {
        AllocationPolicy::AllowOverpayment
    } else {
        AllocationPolicy::Strict
    }
}

/// GET `/installments/open` - Open installments as of a date.
async fn list_open(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListOpenQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::list_open(&conn, query.as_of).await {
        Ok(balances) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<InstallmentResponse> = balances.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "installments": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/installments/{installment_id}` - One installment with its balance.
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::balance_of(&conn, installment_id).await {
        Ok(balance) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "installment": InstallmentResponse::from(balance) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/installments/{installment_id}/payments` - Payments linked to an
/// installment.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::payments_for(&conn, installment_id).await {
        Ok(payments) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<serde_json::Value> = payments
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "entry_date": p.entry_date.to_string(),
                        "amount": p.amount.to_string(),
                        "movement": p.movement,
                        "cause_code": p.cause_code,
                        "financial_account_id": p.financial_account_id,
                        "description": p.description,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "payments": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/installments/{installment_id}/payments` - Register a payment.
async fn register_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentRequest>,
) -> Response {
    let amount = match parse_amount(&payload.amount) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = RegisterPaymentInput {
        installment_id,
        amount,
        entry_date: payload.entry_date,
        financial_account_id: payload.financial_account_id,
        cause_code: payload.cause_code,
        description: payload.description,
        policy: policy(payload.allow_overpayment),
    };

    match InstallmentRepository::register_payment(&conn, input).await {
        Ok(balance) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({ "installment": InstallmentResponse::from(balance) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/payments/{payment_id}` - Amend a payment amount.
async fn amend_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<AmendPaymentRequest>,
) -> Response {
    let amount = match parse_amount(&payload.amount) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::amend_payment(
        &conn,
        payment_id,
        amount,
        policy(payload.allow_overpayment),
    )
    .await
    {
        Ok(balance) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "installment": InstallmentResponse::from(balance) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// DELETE `/payments/{payment_id}` - Delete a payment.
///
/// The installment's allocated total is derived, so it drops implicitly.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::delete_payment(&conn, payment_id).await {
        Ok(()) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/personnel-expiries` - Personnel deadlines, nearest first.
async fn list_expiries(State(state): State<AppState>, auth: AuthUser) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::list_personnel_expiries(&conn).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "employee_name": e.employee_name,
                        "description": e.description,
                        "expiry_date": e.expiry_date.to_string(),
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "expiries": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/personnel-expiries` - Record a personnel deadline.
async fn create_expiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateExpiryRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match InstallmentRepository::create_personnel_expiry(
        &conn,
        payload.employee_name,
        payload.description,
        payload.expiry_date,
    )
    .await
    {
        Ok(expiry) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "expiry": {
                        "id": expiry.id,
                        "employee_name": expiry.employee_name,
                        "description": expiry.description,
                        "expiry_date": expiry.expiry_date.to_string(),
                    }
                })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/installments/personnel-expiry` - Installment from a personnel
/// deadline.
async fn create_for_expiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PersonnelInstallmentRequest>,
) -> Response {
    let rate_amount = match parse_amount(&payload.rate_amount) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = PersonnelInstallmentInput {
        personnel_expiry_id: payload.personnel_expiry_id,
        due_date: payload.due_date,
        rate_amount,
        kind: payload.kind,
        party_id: payload.party_id,
    };

    match InstallmentRepository::create_for_personnel_expiry(&conn, input).await {
        Ok(installment) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "installment": {
                        "id": installment.id,
                        "due_date": installment.due_date.to_string(),
                        "rate_amount": installment.rate_amount.to_string(),
                        "kind": installment.kind,
                        "personnel_expiry_id": installment.personnel_expiry_id,
                    }
                })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
