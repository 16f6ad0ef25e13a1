//! Journal repository: movements, transfers, and transaction causes.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use gestra_core::journal::{
    CauseKind, JournalEntry, JournalError, MovementKind, Posting, TransferEngine, TransferPair,
};
use gestra_core::journal::transfer::PostMovementInput as EnginePostInput;
use gestra_core::tenant::TenantError;
use gestra_shared::{AppError, FieldErrors};
use gestra_shared::types::{
    CompanyId, FinancialAccountId, InstallmentId, JournalEntryId, OperatingAccountId, PartyId,
    SiteId, TransferId,
};

use crate::entities::{causes, financial_accounts, journal_entries, operating_accounts};
use crate::scope::TenantConn;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// No cause with this code exists in the active company.
    #[error("cause not found: {0}")]
    CauseNotFound(String),

    /// The cause exists but is closed to new postings.
    #[error("cause {0} is inactive")]
    CauseInactive(String),

    /// A cause with this code already exists in the active company.
    #[error("cause {0} already exists")]
    DuplicateCause(String),

    /// Journal entry not found (or owned by another company).
    #[error("journal entry not found: {0}")]
    NotFound(Uuid),

    /// No transfer with this id exists in the active company.
    #[error("transfer not found: {0}")]
    TransferNotFound(Uuid),

    /// Posting-engine validation failure.
    #[error(transparent)]
    Posting(#[from] JournalError),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::CauseNotFound(code) => Self::NotFound(format!("cause {code}")),
            PostingError::CauseInactive(code) => {
                Self::BusinessRule(format!("cause {code} is inactive"))
            }
            PostingError::DuplicateCause(code) => {
                Self::Conflict(format!("cause {code} already exists"))
            }
            PostingError::NotFound(id) => Self::NotFound(format!("journal entry {id}")),
            PostingError::TransferNotFound(id) => Self::NotFound(format!("transfer {id}")),
            PostingError::Posting(e) => match e.field() {
                Some(field) => Self::Validation(FieldErrors::single(field, e.to_string())),
                None => Self::BusinessRule(e.to_string()),
            },
            PostingError::Tenant(e) => Self::Integrity(e.to_string()),
            PostingError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for posting a journal movement through the API surface.
#[derive(Debug, Clone)]
pub struct PostMovementInput {
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Cause code selecting the posting mode.
    pub cause_code: String,
    /// Movement kind; required for ordinary entries, forbidden for transfers.
    pub movement: Option<MovementKind>,
    /// Cash/bank account for ordinary financial movements.
    pub financial_account_id: Option<Uuid>,
    /// Cost-center account for ordinary operating movements.
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
    pub description: String,
}

/// Input for amending a posted transfer as a unit.
#[derive(Debug, Clone)]
pub struct AmendTransferInput {
    /// New entry date for both legs.
    pub entry_date: NaiveDate,
    /// New amount for both legs.
    pub amount: Decimal,
    /// New source account.
    pub source_account_id: Uuid,
    /// New destination account.
    pub destination_account_id: Uuid,
    /// New description for both legs.
    pub description: String,
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    /// Date range start.
    pub from: Option<NaiveDate>,
    /// Date range end.
    pub to: Option<NaiveDate>,
    /// Filter by financial account.
    pub financial_account_id: Option<Uuid>,
    /// Filter by counterparty tag.
    pub party_id: Option<Uuid>,
    /// Filter by job-site tag.
    pub site_id: Option<Uuid>,
}

/// A persisted posting: the rows written plus the transfer group, if one
/// was created.
#[derive(Debug, Clone)]
pub struct PostedMovement {
    /// The persisted entries (one, or two for a transfer).
    pub entries: Vec<journal_entries::Model>,
    /// The transfer group id, for giroconto postings.
    pub transfer_id: Option<Uuid>,
}

/// Scoped repository for journal entries.
pub struct JournalRepository;

impl JournalRepository {
    /// Posts a movement, classified by its cause code.
    ///
    /// An ordinary cause writes one row; a transfer cause writes the two
    /// legs atomically within the request transaction.
    ///
    /// # Errors
    ///
    /// Returns cause, account, or engine validation errors.
    pub async fn post_movement(
        conn: &TenantConn,
        input: PostMovementInput,
    ) -> Result<PostedMovement, PostingError> {
        let company_id = conn.scope().stamp(None)?;

        let cause = Self::find_active_cause(conn, company_id, &input.cause_code).await?;

        let engine_input = EnginePostInput {
            entry_date: input.entry_date,
            amount: input.amount,
            cause_code: cause.code.clone(),
            cause_kind: CauseKind::from(cause.kind),
            movement: input.movement,
            financial_account_id: input.financial_account_id.map(FinancialAccountId::from_uuid),
            operating_account_id: input.operating_account_id.map(OperatingAccountId::from_uuid),
            source_account_id: input.source_account_id.map(FinancialAccountId::from_uuid),
            destination_account_id: input.destination_account_id.map(FinancialAccountId::from_uuid),
            party_id: input.party_id.map(PartyId::from_uuid),
            site_id: input.site_id.map(SiteId::from_uuid),
            installment_id: None,
            description: input.description,
        };

        let financial_gate = Self::financial_gate(conn, company_id, &engine_input).await?;
        let operating_gate = Self::operating_gate(conn, company_id, &engine_input).await?;

        let posting = TransferEngine::post(
            company_id,
            &engine_input,
            |id| {
                financial_gate
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| Err(JournalError::FinancialAccountNotFound(id)))
            },
            |id| {
                operating_gate
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| Err(JournalError::OperatingAccountNotFound(id)))
            },
        )?;

        let transfer_id = match &posting {
            Posting::Transfer(pair) => Some(pair.transfer_id.into_inner()),
            Posting::Movement(_) => None,
        };

        let mut persisted = Vec::new();
        for entry in posting.into_entries() {
            persisted.push(Self::insert_entry(conn, &entry).await?);
        }

        tracing::debug!(
            company_id = %company_id,
            cause = %cause.code,
            entries = persisted.len(),
            "journal movement posted"
        );

        Ok(PostedMovement { entries: persisted, transfer_id })
    }

    /// Lists journal entries of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        conn: &TenantConn,
        filter: JournalFilter,
    ) -> Result<Vec<journal_entries::Model>, PostingError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(from) = filter.from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(account_id) = filter.financial_account_id {
            query = query.filter(journal_entries::Column::FinancialAccountId.eq(account_id));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(journal_entries::Column::PartyId.eq(party_id));
        }
        if let Some(site_id) = filter.site_id {
            query = query.filter(journal_entries::Column::SiteId.eq(site_id));
        }

        Ok(query
            .order_by_asc(journal_entries::Column::EntryDate)
            .all(conn.transaction())
            .await?)
    }

    /// The two legs of a transfer, for reporting.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound` when the group has no rows in scope.
    pub async fn entries_of_transfer(
        conn: &TenantConn,
        transfer_id: Uuid,
    ) -> Result<Vec<journal_entries::Model>, PostingError> {
        let Some(company_id) = conn.company_id() else {
            return Err(PostingError::TransferNotFound(transfer_id));
        };

        let legs = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entries::Column::TransferId.eq(transfer_id))
            .all(conn.transaction())
            .await?;

        if legs.is_empty() {
            return Err(PostingError::TransferNotFound(transfer_id));
        }
        Ok(legs)
    }

    /// Amends a posted transfer: both legs are rewritten under the same
    /// transfer id; a single leg can never be edited through this layer.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound` or engine validation errors.
    pub async fn amend_transfer(
        conn: &TenantConn,
        transfer_id: Uuid,
        input: AmendTransferInput,
    ) -> Result<Vec<journal_entries::Model>, PostingError> {
        let company_id = conn.scope().stamp(None)?;
        let pair = Self::load_pair(conn, transfer_id).await?;

        let engine_input = gestra_core::journal::AmendTransferInput {
            entry_date: input.entry_date,
            amount: input.amount,
            source_account_id: FinancialAccountId::from_uuid(input.source_account_id),
            destination_account_id: FinancialAccountId::from_uuid(input.destination_account_id),
            description: input.description,
        };

        let accounts = Self::load_financial_accounts(
            conn,
            company_id,
            &[engine_input.source_account_id, engine_input.destination_account_id],
        )
        .await?;

        let amended = TransferEngine::amend(&pair, &engine_input, |id| {
            accounts
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Err(JournalError::FinancialAccountNotFound(id)))
        })?;

        let mut persisted = Vec::with_capacity(2);
        for leg in [&amended.outflow, &amended.inflow] {
            persisted.push(Self::update_entry(conn, leg).await?);
        }
        Ok(persisted)
    }

    /// Reverses a posted transfer as a unit: a mirrored pair is written
    /// under a new transfer id pointing back at the original. At most one
    /// reversal per transfer.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound`, `AlreadyReversed`, or database errors.
    pub async fn reverse_transfer(
        conn: &TenantConn,
        transfer_id: Uuid,
        reversal_date: NaiveDate,
        description: String,
    ) -> Result<PostedMovement, PostingError> {
        let company_id = conn.scope().stamp(None)?;
        let pair = Self::load_pair(conn, transfer_id).await?;

        let already_reversed = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entries::Column::ReversesTransferId.eq(transfer_id))
            .one(conn.transaction())
            .await?
            .is_some();

        let reversal = TransferEngine::reverse(&pair, reversal_date, description, already_reversed)?;
        let reversal_group = reversal.transfer_id.into_inner();

        let mut persisted = Vec::with_capacity(2);
        for entry in reversal.into_entries() {
            persisted.push(Self::insert_entry(conn, &entry).await?);
        }

        tracing::info!(
            company_id = %company_id,
            transfer_id = %transfer_id,
            reversal_id = %reversal_group,
            "transfer reversed"
        );

        Ok(PostedMovement { entries: persisted, transfer_id: Some(reversal_group) })
    }

    /// Deletes an ordinary movement.
    ///
    /// Transfer legs are refused: a transfer disappears only through
    /// [`Self::reverse_transfer`]. Deleting a payment implicitly lowers the
    /// installment's allocated total, which is always derived.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Posting(TransferLeg)`.
    pub async fn delete_movement(conn: &TenantConn, id: Uuid) -> Result<(), PostingError> {
        let Some(company_id) = conn.company_id() else {
            return Err(PostingError::NotFound(id));
        };

        let entry = journal_entries::Entity::find_by_id(id)
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(PostingError::NotFound(id))?;

        if entry.transfer_id.is_some() {
            return Err(PostingError::Posting(JournalError::TransferLeg(
                JournalEntryId::from_uuid(id),
            )));
        }

        journal_entries::Entity::delete_by_id(id)
            .exec(conn.transaction())
            .await?;
        Ok(())
    }

    /// Creates a transaction cause for the active company.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCause` when the code is taken.
    pub async fn create_cause(
        conn: &TenantConn,
        code: String,
        description: String,
        kind: CauseKind,
    ) -> Result<causes::Model, PostingError> {
        let company_id = conn.scope().stamp(None)?;
        let code = code.trim().to_uppercase();

        let existing = causes::Entity::find()
            .filter(causes::Column::CompanyId.eq(company_id.into_inner()))
            .filter(causes::Column::Code.eq(&code))
            .one(conn.transaction())
            .await?;
        if existing.is_some() {
            return Err(PostingError::DuplicateCause(code));
        }

        let now = Utc::now().into();
        let model = causes::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            code: Set(code),
            description: Set(description),
            kind: Set(kind.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Lists causes of the active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_causes(conn: &TenantConn) -> Result<Vec<causes::Model>, PostingError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        Ok(causes::Entity::find()
            .filter(causes::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(causes::Column::Code)
            .all(conn.transaction())
            .await?)
    }

    async fn find_active_cause(
        conn: &TenantConn,
        company_id: CompanyId,
        code: &str,
    ) -> Result<causes::Model, PostingError> {
        let cause = causes::Entity::find()
            .filter(causes::Column::CompanyId.eq(company_id.into_inner()))
            .filter(causes::Column::Code.eq(code.trim().to_uppercase()))
            .one(conn.transaction())
            .await?
            .ok_or_else(|| PostingError::CauseNotFound(code.to_string()))?;

        if !cause.is_active {
            return Err(PostingError::CauseInactive(cause.code));
        }
        Ok(cause)
    }

    /// Prefetches the activity state of the financial accounts an input may
    /// touch; the engine consults the map through a synchronous gate.
    async fn financial_gate(
        conn: &TenantConn,
        company_id: CompanyId,
        input: &EnginePostInput,
    ) -> Result<HashMap<FinancialAccountId, Result<(), JournalError>>, PostingError> {
        let candidates: Vec<FinancialAccountId> = [
            input.financial_account_id,
            input.source_account_id,
            input.destination_account_id,
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_financial_accounts(conn, company_id, &candidates).await
    }

    async fn load_financial_accounts(
        conn: &TenantConn,
        company_id: CompanyId,
        ids: &[FinancialAccountId],
    ) -> Result<HashMap<FinancialAccountId, Result<(), JournalError>>, PostingError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = financial_accounts::Entity::find()
            .filter(financial_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(
                financial_accounts::Column::Id
                    .is_in(ids.iter().map(|id| id.into_inner()).collect::<Vec<_>>()),
            )
            .all(conn.transaction())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = FinancialAccountId::from_uuid(row.id);
                let gate = if row.is_active {
                    Ok(())
                } else {
                    Err(JournalError::AccountInactive(id))
                };
                (id, gate)
            })
            .collect())
    }

    async fn operating_gate(
        conn: &TenantConn,
        company_id: CompanyId,
        input: &EnginePostInput,
    ) -> Result<HashMap<OperatingAccountId, Result<(), JournalError>>, PostingError> {
        let Some(account_id) = input.operating_account_id else {
            return Ok(HashMap::new());
        };

        let row = operating_accounts::Entity::find_by_id(account_id.into_inner())
            .filter(operating_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?;

        let mut gates = HashMap::new();
        if let Some(row) = row {
            let gate = if row.is_active {
                Ok(())
            } else {
                Err(JournalError::OperatingAccountInactive(account_id))
            };
            gates.insert(account_id, gate);
        }
        Ok(gates)
    }

    /// Loads and validates the two legs of a transfer group.
    async fn load_pair(conn: &TenantConn, transfer_id: Uuid) -> Result<TransferPair, PostingError> {
        let mut legs = Self::entries_of_transfer(conn, transfer_id).await?;
        let (Some(second), Some(first), true) = (legs.pop(), legs.pop(), legs.is_empty()) else {
            return Err(PostingError::Posting(JournalError::NotATransferPair));
        };

        Ok(TransferPair::from_entries(
            Self::entry_to_domain(&first),
            Self::entry_to_domain(&second),
        )?)
    }

    /// Maps a stored row into the domain entry.
    fn entry_to_domain(model: &journal_entries::Model) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::from_uuid(model.id),
            company_id: CompanyId::from_uuid(model.company_id),
            entry_date: model.entry_date,
            amount: model.amount,
            movement: MovementKind::from(model.movement),
            cause_code: model.cause_code.clone(),
            financial_account_id: model.financial_account_id.map(FinancialAccountId::from_uuid),
            operating_account_id: model.operating_account_id.map(OperatingAccountId::from_uuid),
            party_id: model.party_id.map(PartyId::from_uuid),
            site_id: model.site_id.map(SiteId::from_uuid),
            installment_id: model.installment_id.map(InstallmentId::from_uuid),
            transfer_id: model.transfer_id.map(TransferId::from_uuid),
            reverses_transfer_id: model.reverses_transfer_id.map(TransferId::from_uuid),
            description: model.description.clone(),
        }
    }

    pub(crate) async fn insert_entry(
        conn: &TenantConn,
        entry: &JournalEntry,
    ) -> Result<journal_entries::Model, DbErr> {
        let now = Utc::now().into();
        let model = journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            company_id: Set(entry.company_id.into_inner()),
            entry_date: Set(entry.entry_date),
            amount: Set(entry.amount),
            movement: Set(entry.movement.into()),
            cause_code: Set(entry.cause_code.clone()),
            financial_account_id: Set(entry.financial_account_id.map(FinancialAccountId::into_inner)),
            operating_account_id: Set(entry.operating_account_id.map(OperatingAccountId::into_inner)),
            party_id: Set(entry.party_id.map(PartyId::into_inner)),
            site_id: Set(entry.site_id.map(SiteId::into_inner)),
            installment_id: Set(entry.installment_id.map(InstallmentId::into_inner)),
            transfer_id: Set(entry.transfer_id.map(TransferId::into_inner)),
            reverses_transfer_id: Set(entry.reverses_transfer_id.map(TransferId::into_inner)),
            description: Set(entry.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    async fn update_entry(
        conn: &TenantConn,
        entry: &JournalEntry,
    ) -> Result<journal_entries::Model, DbErr> {
        // The company column is deliberately left untouched: the tenant
        // reference is set once at insert and never overwritten here.
        let model = journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            entry_date: Set(entry.entry_date),
            amount: Set(entry.amount),
            movement: Set(entry.movement.into()),
            cause_code: Set(entry.cause_code.clone()),
            financial_account_id: Set(entry.financial_account_id.map(FinancialAccountId::into_inner)),
            operating_account_id: Set(entry.operating_account_id.map(OperatingAccountId::into_inner)),
            party_id: Set(entry.party_id.map(PartyId::into_inner)),
            site_id: Set(entry.site_id.map(SiteId::into_inner)),
            installment_id: Set(entry.installment_id.map(InstallmentId::into_inner)),
            transfer_id: Set(entry.transfer_id.map(TransferId::into_inner)),
            reverses_transfer_id: Set(entry.reverses_transfer_id.map(TransferId::into_inner)),
            description: Set(entry.description.clone()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        Ok(model.update(conn.transaction()).await?)
    }
}
