//! Document repository: registration with duplicate guard and installment
//! scheduling.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use gestra_core::document::{
    self, DocumentHeader, DocumentKind, DocumentLine, ExistingDocument, PaymentTerms,
    build_installments, check_supplier_document, document_total, normalize_reference,
};
use gestra_core::tenant::TenantError;
use gestra_shared::{AppError, FieldErrors};
use gestra_shared::types::{CompanyId, DocumentId, DocumentLineId, PartyId};

use crate::entities::{document_lines, documents, enums, installments, parties};
use crate::scope::TenantConn;

/// Error types for document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document not found (or owned by another company).
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// Counterparty not found (or owned by another company).
    #[error("counterparty not found: {0}")]
    PartyNotFound(Uuid),

    /// Only purchase documents carry a supplier reference.
    #[error("document {0} is not a purchase document")]
    NotAPurchaseDocument(Uuid),

    /// Core document validation failure (duplicate guard, terms, lines).
    #[error(transparent)]
    Document(#[from] document::DocumentError),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(id) => Self::NotFound(format!("document {id}")),
            DocumentError::PartyNotFound(id) => Self::NotFound(format!("counterparty {id}")),
            DocumentError::NotAPurchaseDocument(id) => {
                Self::BusinessRule(format!("document {id} is not a purchase document"))
            }
            DocumentError::Document(e) => match e.field() {
                Some(field) => Self::Validation(FieldErrors::single(field, e.to_string())),
                None => Self::BusinessRule(e.to_string()),
            },
            DocumentError::Tenant(e) => Self::Integrity(e.to_string()),
            DocumentError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// One line of a document registration.
#[derive(Debug, Clone)]
pub struct RegisterLineInput {
    /// Line description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax rate percentage.
    pub tax_rate: Decimal,
}

/// Input for registering a document.
#[derive(Debug, Clone)]
pub struct RegisterDocumentInput {
    /// Document kind.
    pub kind: DocumentKind,
    /// Counterparty.
    pub party_id: Uuid,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Supplier-assigned number (purchase side).
    pub supplier_reference: Option<String>,
    /// Payment terms as day offsets from the issue date.
    pub payment_terms: Vec<u32>,
    /// Document lines.
    pub lines: Vec<RegisterLineInput>,
}

/// Filter options for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Filter by kind.
    pub kind: Option<DocumentKind>,
    /// Filter by counterparty.
    pub party_id: Option<Uuid>,
    /// Issue date range start.
    pub from: Option<NaiveDate>,
    /// Issue date range end.
    pub to: Option<NaiveDate>,
}

/// A registered document with everything the registration created.
#[derive(Debug, Clone)]
pub struct RegisteredDocument {
    /// The header row.
    pub document: documents::Model,
    /// The line rows, in position order.
    pub lines: Vec<document_lines::Model>,
    /// The scheduled installments.
    pub installments: Vec<installments::Model>,
    /// The derived document total.
    pub total: Decimal,
}

/// Scoped repository for documents.
pub struct DocumentRepository;

impl DocumentRepository {
    /// Registers a document: duplicate guard, line arithmetic, installment
    /// scheduling, all inside the request transaction.
    ///
    /// # Errors
    ///
    /// Returns the duplicate-document error (naming the conflicting
    /// counterparty), line/terms validation errors, or lookup failures.
    pub async fn register(
        conn: &TenantConn,
        input: RegisterDocumentInput,
    ) -> Result<RegisteredDocument, DocumentError> {
        let company_id = conn.scope().stamp(None)?;

        if input.lines.is_empty() {
            return Err(document::DocumentError::NoLines.into());
        }

        let party = parties::Entity::find_by_id(input.party_id)
            .filter(parties::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(DocumentError::PartyNotFound(input.party_id))?;

        let normalized_reference = input
            .supplier_reference
            .as_deref()
            .map(normalize_reference)
            .filter(|r| !r.is_empty());
        let conflicting = Self::find_conflicting(
            conn,
            company_id,
            input.party_id,
            input.kind,
            normalized_reference.as_deref(),
            None,
        )
        .await?;
        check_supplier_document(
            input.kind,
            PartyId::from_uuid(party.id),
            input.supplier_reference.as_deref(),
            None,
            |_, _, _| conflicting.clone(),
        )?;

        let header = DocumentHeader {
            id: DocumentId::new(),
            company_id,
            kind: input.kind,
            party_id: PartyId::from_uuid(party.id),
            issue_date: input.issue_date,
            supplier_reference: normalized_reference.clone(),
            payment_terms: PaymentTerms::new(input.payment_terms.clone()),
        };
        let domain_lines: Vec<DocumentLine> = input
            .lines
            .iter()
            .map(|line| DocumentLine {
                id: DocumentLineId::new(),
                description: line.description.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                tax_rate: line.tax_rate,
            })
            .collect();
        let total = document_total(&domain_lines);
        let scheduled = build_installments(&header, total)?;

        let now = Utc::now().into();
        let document = documents::ActiveModel {
            id: Set(header.id.into_inner()),
            company_id: Set(company_id.into_inner()),
            party_id: Set(party.id),
            kind: Set(input.kind.into()),
            issue_date: Set(input.issue_date),
            supplier_reference: Set(normalized_reference),
            payment_terms: Set(serde_json::json!(input.payment_terms)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn.transaction())
        .await?;

        let mut lines = Vec::with_capacity(domain_lines.len());
        for (position, line) in domain_lines.iter().enumerate() {
            let persisted = document_lines::ActiveModel {
                id: Set(line.id.into_inner()),
                company_id: Set(company_id.into_inner()),
                document_id: Set(document.id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                tax_rate: Set(line.tax_rate),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn.transaction())
            .await?;
            lines.push(persisted);
        }

        let mut installment_rows = Vec::with_capacity(scheduled.len());
        for installment in &scheduled {
            let persisted = installments::ActiveModel {
                id: Set(installment.id.into_inner()),
                company_id: Set(company_id.into_inner()),
                due_date: Set(installment.due_date),
                rate_amount: Set(installment.rate_amount),
                kind: Set(enums::InstallmentKind::from(installment.kind)),
                party_id: Set(installment.party_id.map(PartyId::into_inner)),
                document_id: Set(installment.document_id.map(DocumentId::into_inner)),
                personnel_expiry_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn.transaction())
            .await?;
            installment_rows.push(persisted);
        }

        tracing::debug!(
            company_id = %company_id,
            document_id = %document.id,
            installments = installment_rows.len(),
            "document registered"
        );

        Ok(RegisteredDocument { document, lines, installments: installment_rows, total })
    }

    /// Corrects the supplier reference of a purchase document.
    ///
    /// The record under update is excluded from the duplicate comparison.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NotAPurchaseDocument`, or the duplicate error.
    pub async fn amend_supplier_reference(
        conn: &TenantConn,
        document_id: Uuid,
        new_reference: &str,
    ) -> Result<documents::Model, DocumentError> {
        let company_id = conn.scope().stamp(None)?;

        let existing = documents::Entity::find_by_id(document_id)
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(DocumentError::NotFound(document_id))?;

        let kind = DocumentKind::from(existing.kind);
        if !kind.is_purchase() {
            return Err(DocumentError::NotAPurchaseDocument(document_id));
        }

        let normalized = normalize_reference(new_reference);
        let conflicting = Self::find_conflicting(
            conn,
            company_id,
            existing.party_id,
            kind,
            Some(&normalized),
            Some(document_id),
        )
        .await?;
        check_supplier_document(
            kind,
            PartyId::from_uuid(existing.party_id),
            Some(new_reference),
            Some(DocumentId::from_uuid(document_id)),
            |_, _, _| conflicting.clone(),
        )?;

        let mut model: documents::ActiveModel = existing.into();
        model.supplier_reference = Set(Some(normalized));
        model.updated_at = Set(Utc::now().into());
        Ok(model.update(conn.transaction()).await?)
    }

    /// Finds one document of the active company with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_with_lines(
        conn: &TenantConn,
        id: Uuid,
    ) -> Result<Option<(documents::Model, Vec<document_lines::Model>)>, DocumentError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(None);
        };

        let Some(document) = documents::Entity::find_by_id(id)
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
        else {
            return Ok(None);
        };

        let lines = document_lines::Entity::find()
            .filter(document_lines::Column::DocumentId.eq(document.id))
            .order_by_asc(document_lines::Column::Position)
            .all(conn.transaction())
            .await?;

        Ok(Some((document, lines)))
    }

    /// Lists documents of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        conn: &TenantConn,
        filter: DocumentFilter,
    ) -> Result<Vec<documents::Model>, DocumentError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = documents::Entity::find()
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(kind) = filter.kind {
            query = query.filter(documents::Column::Kind.eq(enums::DocumentKind::from(kind)));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(documents::Column::PartyId.eq(party_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(documents::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(documents::Column::IssueDate.lte(to));
        }

        Ok(query
            .order_by_desc(documents::Column::IssueDate)
            .all(conn.transaction())
            .await?)
    }

    /// Looks up the document already occupying a supplier-reference slot,
    /// excluding the record under update, and resolves the counterparty
    /// name the error will carry.
    async fn find_conflicting(
        conn: &TenantConn,
        company_id: CompanyId,
        party_id: Uuid,
        kind: DocumentKind,
        reference: Option<&str>,
        excluding: Option<Uuid>,
    ) -> Result<Option<ExistingDocument>, DocumentError> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        if !kind.requires_supplier_reference() {
            return Ok(None);
        }

        let mut query = documents::Entity::find()
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .filter(documents::Column::PartyId.eq(party_id))
            .filter(documents::Column::Kind.eq(enums::DocumentKind::from(kind)))
            .filter(documents::Column::SupplierReference.eq(reference));
        if let Some(excluding) = excluding {
            query = query.filter(documents::Column::Id.ne(excluding));
        }

        let Some(existing) = query.one(conn.transaction()).await? else {
            return Ok(None);
        };

        let party_name = parties::Entity::find_by_id(existing.party_id)
            .one(conn.transaction())
            .await?
            .map_or_else(String::new, |p| p.name);

        Ok(Some(ExistingDocument {
            id: DocumentId::from_uuid(existing.id),
            party_name,
        }))
    }
}
