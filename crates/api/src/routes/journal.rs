//! Journal routes: movements, transfers, and causes.

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

use gestra_core::journal::{CauseKind, MovementKind};
use gestra_db::entities::journal_entries;
use gestra_db::repositories::{
    AmendTransferInput, JournalFilter, JournalRepository, PostMovementInput,
};
use gestra_shared::AppError;

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", get(list_entries))
        .route("/journal/movements", post(post_movement))
        .route("/journal/movements/{entry_id}", delete(delete_movement))
        .route("/journal/transfers/{transfer_id}", get(get_transfer))
        .route("/journal/transfers/{transfer_id}", patch(amend_transfer))
        .route("/journal/transfers/{transfer_id}/reverse", post(reverse_transfer))
        .route("/journal/causes", get(list_causes))
        .route("/journal/causes", post(create_cause))
}

/// Query parameters for listing journal entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Filter by financial account.
    pub financial_account: Option<Uuid>,
    /// Filter by counterparty tag.
    pub party: Option<Uuid>,
    /// Filter by job-site tag.
    pub site: Option<Uuid>,
}

/// Request body for posting a movement.
///
/// The cause code selects the posting mode: ordinary causes take a movement
/// kind and exactly one account; transfer causes take the source and
/// destination accounts and derive the movements.
#[derive(Debug, Deserialize)]
pub struct PostMovementRequest {
    /// Entry date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// Amount, as a decimal string.
    pub amount: String,
    /// Cause code.
    pub cause_code: String,
    /// Movement kind (ordinary causes only).
    pub movement: Option<MovementKind>,
    /// Cash/bank account (ordinary causes).
    pub financial_account_id: Option<Uuid>,
    /// Cost-center account (ordinary causes).
    pub operating_account_id: Option<Uuid>,
    /// Transfer source account.
    pub source_account_id: Option<Uuid>,
    /// Transfer destination account.
    pub destination_account_id: Option<Uuid>,
    /// Optional counterparty tag.
    pub party_id: Option<Uuid>,
    /// Optional job-site tag.
    pub site_id: Option<Uuid>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Request body for amending a transfer.
#[derive(Debug, Deserialize)]
pub struct AmendTransferRequest {
    /// New entry date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// New amount, as a decimal string.
    pub amount: String,
    /// New source account.
    pub source_account_id: Uuid,
    /// New destination account.
    pub destination_account_id: Uuid,
    /// New description.
    #[serde(default)]
    pub description: String,
}

/// Request body for reversing a transfer.
#[derive(Debug, Deserialize)]
pub struct ReverseTransferRequest {
    /// Reversal date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// Reversal description.
    #[serde(default)]
    pub description: String,
}

/// Request body for creating a cause.
#[derive(Debug, Deserialize)]
pub struct CreateCauseRequest {
    /// Short code, unique per company.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Posting mode.
    pub kind: CauseKind,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Entry date.
    pub entry_date: String,
    /// Amount.
    pub amount: String,
    /// Movement direction.
    pub movement: gestra_db::entities::enums::MovementKind,
    /// Cause code.
    pub cause_code: String,
    /// Cash/bank account.
    pub financial_account_id: Option<Uuid>,
    /// Cost-center account.
    pub operating_account_id: Option<Uuid>,
    /// Counterparty tag.
    pub party_id: Option<Uuid>,
    /// Job-site tag.
    pub site_id: Option<Uuid>,
    /// Installment settled by this entry.
    pub installment_id: Option<Uuid>,
    /// Transfer group.
    pub transfer_id: Option<Uuid>,
    /// Transfer group this entry's pair reverses.
    pub reverses_transfer_id: Option<Uuid>,
    /// Description.
    pub description: String,
}

impl From<journal_entries::Model> for JournalEntryResponse {
    fn from(model: journal_entries::Model) -> Self {
        Self {
            id: model.id,
            entry_date: model.entry_date.to_string(),
            amount: model.amount.to_string(),
            movement: model.movement,
            cause_code: model.cause_code,
            financial_account_id: model.financial_account_id,
            operating_account_id: model.operating_account_id,
            party_id: model.party_id,
            site_id: model.site_id,
            installment_id: model.installment_id,
            transfer_id: model.transfer_id,
            reverses_transfer_id: model.reverses_transfer_id,
            description: model.description,
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, Response> {
    Decimal::from_str(raw)
        .map_err(|_| fail(AppError::field("amount", format!("invalid decimal: {raw}"))))
}

/// GET `/journal` - List journal entries of the active company.
async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListEntriesQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let filter = JournalFilter {
        from: query.from,
        to: query.to,
        financial_account_id: query.financial_account,
        party_id: query.party,
        site_id: query.site,
    };

    match JournalRepository::list(&conn, filter).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<JournalEntryResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "entries": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/journal/movements` - Post an ordinary movement or a transfer.
async fn post_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PostMovementRequest>,
) -> Response {
    let amount = match parse_amount(&payload.amount) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = PostMovementInput {
        entry_date: payload.entry_date,
        amount,
        cause_code: payload.cause_code,
        movement: payload.movement,
        financial_account_id: payload.financial_account_id,
        operating_account_id: payload.operating_account_id,
        source_account_id: payload.source_account_id,
        destination_account_id: payload.destination_account_id,
        party_id: payload.party_id,
        site_id: payload.site_id,
        description: payload.description,
    };

    match JournalRepository::post_movement(&conn, input).await {
        Ok(posted) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let entries: Vec<JournalEntryResponse> =
                posted.entries.into_iter().map(Into::into).collect();
            (
                StatusCode::CREATED,
                Json(json!({ "entries": entries, "transfer_id": posted.transfer_id })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// DELETE `/journal/movements/{entry_id}` - Delete an ordinary movement.
///
/// Transfer legs are refused; reverse the transfer instead.
async fn delete_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match JournalRepository::delete_movement(&conn, entry_id).await {
        Ok(()) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/journal/transfers/{transfer_id}` - The two legs of a transfer.
async fn get_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transfer_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match JournalRepository::entries_of_transfer(&conn, transfer_id).await {
        Ok(legs) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let entries: Vec<JournalEntryResponse> = legs.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "entries": entries }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/journal/transfers/{transfer_id}` - Amend a transfer as a unit.
async fn amend_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transfer_id): Path<Uuid>,
    Json(payload): Json<AmendTransferRequest>,
) -> Response {
    let amount = match parse_amount(&payload.amount) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = AmendTransferInput {
        entry_date: payload.entry_date,
        amount,
        source_account_id: payload.source_account_id,
        destination_account_id: payload.destination_account_id,
        description: payload.description,
    };

    match JournalRepository::amend_transfer(&conn, transfer_id, input).await {
        Ok(legs) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let entries: Vec<JournalEntryResponse> = legs.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "entries": entries }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/journal/transfers/{transfer_id}/reverse` - Reverse a transfer as
/// a unit.
async fn reverse_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transfer_id): Path<Uuid>,
    Json(payload): Json<ReverseTransferRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match JournalRepository::reverse_transfer(
        &conn,
        transfer_id,
        payload.entry_date,
        payload.description,
    )
    .await
    {
        Ok(posted) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let entries: Vec<JournalEntryResponse> =
                posted.entries.into_iter().map(Into::into).collect();
            (
                StatusCode::CREATED,
                Json(json!({ "entries": entries, "transfer_id": posted.transfer_id })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/journal/causes` - List transaction causes.
async fn list_causes(State(state): State<AppState>, auth: AuthUser) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match JournalRepository::list_causes(&conn).await {
        Ok(causes) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<serde_json::Value> = causes
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "code": c.code,
                        "description": c.description,
                        "kind": c.kind,
                        "is_active": c.is_active,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "causes": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/journal/causes` - Create a transaction cause.
async fn create_cause(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCauseRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match JournalRepository::create_cause(&conn, payload.code, payload.description, payload.kind)
        .await
    {
        Ok(cause) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "cause": {
                        "id": cause.id,
                        "code": cause.code,
                        "description": cause.description,
                        "kind": cause.kind,
                        "is_active": cause.is_active,
                    }
                })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
