//! Counterparty routes.

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

use gestra_core::party::PartyKind;
use gestra_db::entities::parties;
use gestra_db::repositories::{CreatePartyInput, PartyFilter, PartyRepository, UpdatePartyInput};

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the counterparty routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", get(list_parties))
        .route("/parties", post(create_party))
        .route("/parties/{party_id}", get(get_party))
        .route("/parties/{party_id}", patch(update_party))
}

/// Query parameters for listing counterparties.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    /// Filter by commercial role.
    pub kind: Option<PartyKind>,
    /// Only active records.
    #[serde(default)]
    pub active_only: bool,
    /// Case-insensitive name fragment.
    pub search: Option<String>,
}

/// Request body for creating a counterparty.
#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    /// Commercial role.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// VAT number, any formatting.
    pub vat_number: Option<String>,
    /// Fiscal code, any formatting.
    pub fiscal_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
}

/// Request body for updating a counterparty.
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePartyRequest {
    /// New display name.
    pub name: Option<String>,
    /// New commercial role.
    pub kind: Option<PartyKind>,
    /// New VAT number.
    pub vat_number: Option<String>,
    /// New fiscal code.
    pub fiscal_code: Option<String>,
    /// New street address.
    pub address: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Response for a counterparty.
#[derive(Debug, Serialize)]
pub struct PartyResponse {
    /// Party ID.
    pub id: Uuid,
    /// Commercial role.
    pub kind: gestra_db::entities::enums::PartyKind,
    /// Display name.
    pub name: String,
    /// Normalized VAT number.
    pub vat_number: Option<String>,
    /// Normalized fiscal code.
    pub fiscal_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

impl From<parties::Model> for PartyResponse {
    fn from(model: parties::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            name: model.name,
            vat_number: model.vat_number,
            fiscal_code: model.fiscal_code,
            address: model.address,
            city: model.city,
            is_active: model.is_active,
        }
    }
}

/// GET `/parties` - List counterparties of the active company.
async fn list_parties(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListPartiesQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let filter = PartyFilter {
        kind: query.kind,
        active_only: query.active_only,
        search: query.search,
    };

    match PartyRepository::list(&conn, filter).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<PartyResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "parties": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/parties/{party_id}` - Fetch one counterparty.
async fn get_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match PartyRepository::find_by_id(&conn, party_id).await {
        Ok(Some(party)) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "party": PartyResponse::from(party) })),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "NOT_FOUND",
                "message": format!("counterparty {party_id} not found")
            })),
        )
            .into_response(),
        Err(e) => fail(e),
    }
}

/// POST `/parties` - Create a counterparty.
async fn create_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePartyRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = CreatePartyInput {
        kind: payload.kind,
        name: payload.name,
        vat_number: payload.vat_number,
        fiscal_code: payload.fiscal_code,
        address: payload.address,
        city: payload.city,
    };

    match PartyRepository::create(&conn, input).await {
        Ok(party) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({ "party": PartyResponse::from(party) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/parties/{party_id}` - Update a counterparty.
async fn update_party(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<Uuid>,
    Json(payload): Json<UpdatePartyRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = UpdatePartyInput {
        name: payload.name,
        kind: payload.kind,
        vat_number: payload.vat_number,
        fiscal_code: payload.fiscal_code,
        address: payload.address,
        city: payload.city,
        is_active: payload.is_active,
    };

    match PartyRepository::update(&conn, party_id, input).await {
        Ok(party) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "party": PartyResponse::from(party) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
