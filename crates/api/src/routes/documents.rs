//! Document registration routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use gestra_core::document::DocumentKind;
use gestra_db::entities::{document_lines, documents};
use gestra_db::repositories::{
    DocumentFilter, DocumentRepository, RegisterDocumentInput, RegisterLineInput,
};
use gestra_shared::AppError;

use crate::middleware::AuthUser;
use crate::responses::fail;
use crate::routes::{commit, open_scope};
use crate::AppState;

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents", post(register_document))
        .route("/documents/{document_id}", get(get_document))
        .route(
            "/documents/{document_id}/supplier-reference",
            patch(amend_supplier_reference),
        )
}

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Filter by kind.
    pub kind: Option<DocumentKind>,
    /// Filter by counterparty.
    pub party: Option<Uuid>,
    /// Issue date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Issue date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for one document line.
#[derive(Debug, Deserialize)]
pub struct RegisterLineRequest {
    /// Line description.
    pub description: String,
    /// Quantity, as a decimal string.
    pub quantity: String,
    /// Unit price, as a decimal string.
    pub unit_price: String,
    /// Tax rate percentage, as a decimal string.
    pub tax_rate: String,
}

/// Request body for registering a document.
#[derive(Debug, Deserialize)]
pub struct RegisterDocumentRequest {
    /// Document kind.
    pub kind: DocumentKind,
    /// Counterparty.
    pub party_id: Uuid,
    /// Issue date (YYYY-MM-DD).
    pub issue_date: NaiveDate,
    /// Supplier-assigned number (purchase side).
    pub supplier_reference: Option<String>,
    /// Payment terms as day offsets; defaults to a single immediate rate.
    #[serde(default)]
    pub payment_terms: Vec<u32>,
    /// Document lines.
    pub lines: Vec<RegisterLineRequest>,
}

/// Request body for correcting a supplier reference.
#[derive(Debug, Deserialize)]
pub struct AmendSupplierReferenceRequest {
    /// The corrected supplier document number.
    pub supplier_reference: String,
}

/// Response for a document header.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    /// Document ID.
    pub id: Uuid,
    /// Document kind.
    pub kind: gestra_db::entities::enums::DocumentKind,
    /// Counterparty.
    pub party_id: Uuid,
    /// Issue date.
    pub issue_date: String,
    /// Supplier reference.
    pub supplier_reference: Option<String>,
}

impl From<documents::Model> for DocumentResponse {
    fn from(model: documents::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            party_id: model.party_id,
            issue_date: model.issue_date.to_string(),
            supplier_reference: model.supplier_reference,
        }
    }
}

/// Response for a document line.
#[derive(Debug, Serialize)]
pub struct DocumentLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Position within the document.
    pub position: i32,
    /// Description.
    pub description: String,
    /// Quantity.
    pub quantity: String,
    /// Unit price.
    pub unit_price: String,
    /// Tax rate.
    pub tax_rate: String,
}

impl From<document_lines::Model> for DocumentLineResponse {
    fn from(model: document_lines::Model) -> Self {
        Self {
            id: model.id,
            position: model.position,
            description: model.description,
            quantity: model.quantity.to_string(),
            unit_price: model.unit_price.to_string(),
            tax_rate: model.tax_rate.to_string(),
        }
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, Response> {
    Decimal::from_str(raw)
        .map_err(|_| fail(AppError::field(field, format!("invalid decimal: {raw}"))))
}

/// GET `/documents` - List documents of the active company.
async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let filter = DocumentFilter {
        kind: query.kind,
        party_id: query.party,
        from: query.from,
        to: query.to,
    };

    match DocumentRepository::list(&conn, filter).await {
        Ok(rows) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let items: Vec<DocumentResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "documents": items }))).into_response()
        }
        Err(e) => fail(e),
    }
}

/// GET `/documents/{document_id}` - Fetch one document with its lines.
async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match DocumentRepository::find_with_lines(&conn, document_id).await {
        Ok(Some((document, lines))) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let lines: Vec<DocumentLineResponse> = lines.into_iter().map(Into::into).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "document": DocumentResponse::from(document),
                    "lines": lines,
                })),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "NOT_FOUND",
                "message": format!("document {document_id} not found")
            })),
        )
            .into_response(),
        Err(e) => fail(e),
    }
}

/// POST `/documents` - Register a document.
///
/// Runs the duplicate supplier-document guard, computes line amounts, and
/// schedules the installments from the payment terms, all in one unit of
/// work.
async fn register_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RegisterDocumentRequest>,
) -> Response {
    let mut lines = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        let quantity = match parse_decimal("quantity", &line.quantity) {
            Ok(value) => value,
            Err(response) => return response,
        };
        let unit_price = match parse_decimal("unit_price", &line.unit_price) {
            Ok(value) => value,
            Err(response) => return response,
        };
        let tax_rate = match parse_decimal("tax_rate", &line.tax_rate) {
            Ok(value) => value,
            Err(response) => return response,
        };
        lines.push(RegisterLineInput {
            description: line.description.clone(),
            quantity,
            unit_price,
            tax_rate,
        });
    }

    let payment_terms = if payload.payment_terms.is_empty() {
        vec![0]
    } else {
        payload.payment_terms
    };

    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let input = RegisterDocumentInput {
        kind: payload.kind,
        party_id: payload.party_id,
        issue_date: payload.issue_date,
        supplier_reference: payload.supplier_reference,
        payment_terms,
        lines,
    };

    match DocumentRepository::register(&conn, input).await {
        Ok(registered) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            let lines: Vec<DocumentLineResponse> =
                registered.lines.into_iter().map(Into::into).collect();
            let installments: Vec<serde_json::Value> = registered
                .installments
                .iter()
                .map(|i| {
                    json!({
                        "id": i.id,
                        "due_date": i.due_date.to_string(),
                        "rate_amount": i.rate_amount.to_string(),
                        "kind": i.kind,
                    })
                })
                .collect();
            (
                StatusCode::CREATED,
                Json(json!({
                    "document": DocumentResponse::from(registered.document),
                    "lines": lines,
                    "installments": installments,
                    "total": registered.total.to_string(),
                })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}

/// PATCH `/documents/{document_id}/supplier-reference` - Correct the
/// supplier document number of a purchase document.
async fn amend_supplier_reference(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<AmendSupplierReferenceRequest>,
) -> Response {
    let conn = match open_scope(&state, &auth).await {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match DocumentRepository::amend_supplier_reference(
        &conn,
        document_id,
        &payload.supplier_reference,
    )
    .await
    {
        Ok(document) => {
            if let Err(response) = commit(conn).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(json!({ "document": DocumentResponse::from(document) })),
            )
                .into_response()
        }
        Err(e) => fail(e),
    }
}
