//! Company provisioning and selection routes.
//!
//! Companies are the tenants themselves; these endpoints back tenant
//! selection and provisioning and therefore run outside any company scope.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use gestra_db::repositories::{CompanyRepository, CreateCompanyInput};

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::AppState;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies", post(create_company))
}

/// Request body for creating a company.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    /// Legal name.
    pub name: String,
    /// VAT number.
    pub vat_number: Option<String>,
}

/// Response for a company.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    /// Company ID.
    pub id: Uuid,
    /// Legal name.
    pub name: String,
    /// VAT number.
    pub vat_number: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

/// GET `/companies` - List active companies for tenant selection.
async fn list_companies(State(state): State<AppState>, _auth: AuthUser) -> Response {
    match CompanyRepository::list_active(&state.db).await {
        Ok(companies) => {
            let items: Vec<CompanyResponse> = companies
                .into_iter()
                .map(|c| CompanyResponse {
                    id: c.id,
                    name: c.name,
                    vat_number: c.vat_number,
                    is_active: c.is_active,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "companies": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/companies` - Provision a new company.
async fn create_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> Response {
    match CompanyRepository::create(
        &state.db,
        CreateCompanyInput {
            name: payload.name,
            vat_number: payload.vat_number,
        },
    )
    .await
    {
        Ok(company) => (
            StatusCode::CREATED,
            Json(json!({
                "company": CompanyResponse {
                    id: company.id,
                    name: company.name,
                    vat_number: company.vat_number,
                    is_active: company.is_active,
                }
            })),
        )
            .into_response(),
        Err(e) => fail(e),
    }
}
