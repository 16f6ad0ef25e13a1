//! Job-site routes.

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

use gestra_db::entities::sites;
use gestra_db::repositories::{CreateSiteInput, SiteRepository};

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the job-site routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sites", get(list_sites))
        .route("/sites", post(create_site))
        .route("/sites/{site_id}/active", patch(set_site_active))
}

/// Query parameters for listing sites.
#[derive(Debug, Deserialize)]
pub struct ListSitesQuery {
    /// Only active sites.
    #[serde(default)]
    pub active_only: bool,
}

/// Request body for creating a site.
#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    /// Site name.
    pub name: String,
    /// Site address.
    pub address: Option<String>,
}

/// Request body for toggling a site's active flag.
#[derive(Debug, Deserialize)]
pub struct SetSiteActiveRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Response for a job site.
#[derive(Debug, Serialize)]
pub struct SiteResponse {
    /// Site ID.
    pub id: Uuid,
    /// Site name.
    pub name: String,
    /// Site address.
    pub address: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

impl From<sites::Model> for SiteResponse {
    fn from(model: sites::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            is_active: model.is_active,
        }
    }
}

/// GET `/sites` - List job sites of the active company.
async fn list_sites(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListSitesQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match SiteRepository::list(&conn, query.active_only).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<SiteResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "sites": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// POST `/sites` - Create a job site.
async fn create_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSiteRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = CreateSiteInput {
        name: payload.name,
        address: payload.address,
    };

    match SiteRepository::create(&conn, input).await {
        Ok(site) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::CREATED,
                Json(json!({ "site": SiteResponse::from(site) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/sites/{site_id}/active` - Gate future tagging.
async fn set_site_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<SetSiteActiveRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match SiteRepository::set_active(&conn, site_id, payload.is_active).await {
        Ok(site) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "site": SiteResponse::from(site) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
