//! Installment repository: balances and payment allocation.
//!
//! The allocated total of an installment is always derived by summing the
//! journal rows linked to it. Registration and amendment of payments run a
//! read-validate-write sequence inside the request transaction, with a
//! row-level lock on the installment so two concurrent payments cannot
//! jointly overpay it.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use gestra_core::installment::{
    AllocationPolicy, InstallmentError, InstallmentKind, InstallmentStatus, allocated_total,
    residual, settlement_status, validate_amended_payment, validate_new_payment,
};
use gestra_core::journal::{JournalEntry, MovementKind};
use gestra_core::tenant::TenantError;
use gestra_shared::{AppError, FieldErrors};
use gestra_shared::types::{
    CompanyId, FinancialAccountId, InstallmentId, JournalEntryId, PartyId,
};

use crate::entities::{enums, financial_accounts, installments, journal_entries, personnel_expiries};
use crate::repositories::journal::JournalRepository;
use crate::scope::TenantConn;

/// Error types for installment and payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Installment not found (or owned by another company).
    #[error("installment not found: {0}")]
    InstallmentNotFound(Uuid),

    /// Journal entry not found (or owned by another company).
    #[error("payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// The journal entry is not linked to an installment.
    #[error("journal entry {0} does not settle an installment")]
    NotAPayment(Uuid),

    /// Personnel expiry not found (or owned by another company).
    #[error("personnel expiry not found: {0}")]
    ExpiryNotFound(Uuid),

    /// No cause with this code exists in the active company.
    #[error("cause not found: {0}")]
    CauseNotFound(String),

    /// Payments settle through ordinary causes, never transfer causes.
    #[error("cause {0} does not post ordinary movements")]
    CauseNotOrdinary(String),

    /// Settlement account not found (or owned by another company).
    #[error("financial account not found: {0}")]
    AccountNotFound(Uuid),

    /// Settlement account is closed to new postings.
    #[error("financial account {0} is inactive")]
    AccountInactive(Uuid),

    /// Allocation validation failure.
    #[error(transparent)]
    Allocation(#[from] InstallmentError),

    /// Tenant-scope integrity failure.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InstallmentNotFound(id) => Self::NotFound(format!("installment {id}")),
            PaymentError::PaymentNotFound(id) => Self::NotFound(format!("payment {id}")),
            PaymentError::ExpiryNotFound(id) => Self::NotFound(format!("personnel expiry {id}")),
            PaymentError::CauseNotFound(code) => Self::NotFound(format!("cause {code}")),
            PaymentError::NotAPayment(id) => {
                Self::BusinessRule(format!("journal entry {id} does not settle an installment"))
            }
            PaymentError::CauseNotOrdinary(code) => {
                Self::BusinessRule(format!("cause {code} does not post ordinary movements"))
            }
            PaymentError::AccountNotFound(id) => Self::NotFound(format!("account {id}")),
            PaymentError::AccountInactive(id) => {
                Self::BusinessRule(format!("account {id} is inactive"))
            }
            PaymentError::Allocation(e) => match e.field() {
                Some(field) => Self::Validation(FieldErrors::single(field, e.to_string())),
                None => Self::Integrity(e.to_string()),
            },
            PaymentError::Tenant(e) => Self::Integrity(e.to_string()),
            PaymentError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for registering a payment against an installment.
#[derive(Debug, Clone)]
pub struct RegisterPaymentInput {
    /// The installment being settled.
    pub installment_id: Uuid,
    /// Payment amount, strictly positive.
    pub amount: Decimal,
    /// Payment date.
    pub entry_date: NaiveDate,
    /// Settlement account.
    pub financial_account_id: Uuid,
    /// Ordinary cause code for the movement.
    pub cause_code: String,
    /// Free-text description.
    pub description: String,
    /// Overpayment policy; `Strict` unless the caller explicitly overrides.
    pub policy: AllocationPolicy,
}

/// Input for creating an installment from a personnel expiry.
#[derive(Debug, Clone)]
pub struct PersonnelInstallmentInput {
    /// The backing personnel expiry.
    pub personnel_expiry_id: Uuid,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub rate_amount: Decimal,
    /// Direction (typically payable).
    pub kind: InstallmentKind,
    /// Counterparty, when known.
    pub party_id: Option<Uuid>,
}

/// An installment with its derived balance.
#[derive(Debug, Clone)]
pub struct InstallmentBalance {
    /// The installment row.
    pub installment: installments::Model,
    /// Sum of linked payments.
    pub allocated: Decimal,
    /// Rate amount minus allocated.
    pub residual: Decimal,
    /// Open or settled.
    pub status: InstallmentStatus,
}

/// Scoped repository for installments and their payments.
pub struct InstallmentRepository;

impl InstallmentRepository {
    /// Lists installments of the active company still open as of a date.
    ///
    /// `as_of` bounds the due date when given. Settled installments are
    /// excluded; the balance is derived per row.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or stored allocations exceed a
    /// rate amount.
    pub async fn list_open(
        conn: &TenantConn,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<InstallmentBalance>, PaymentError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        let mut query = installments::Entity::find()
            .filter(installments::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(as_of) = as_of {
            query = query.filter(installments::Column::DueDate.lte(as_of));
        }
        let rows = query
            .order_by_asc(installments::Column::DueDate)
            .all(conn.transaction())
            .await?;

        let mut balances = Vec::with_capacity(rows.len());
        for row in rows {
            let balance = Self::balance_for(conn, row).await?;
            if balance.status == InstallmentStatus::Open {
                balances.push(balance);
            }
        }
        Ok(balances)
    }

    /// The derived balance of one installment.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentNotFound` for missing or foreign rows.
    pub async fn balance_of(
        conn: &TenantConn,
        installment_id: Uuid,
    ) -> Result<InstallmentBalance, PaymentError> {
        let row = Self::find_scoped(conn, installment_id, false).await?;
        Self::balance_for(conn, row).await
    }

    /// The payments linked to an installment, for reporting.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentNotFound` for missing or foreign rows.
    pub async fn payments_for(
        conn: &TenantConn,
        installment_id: Uuid,
    ) -> Result<Vec<journal_entries::Model>, PaymentError> {
        let row = Self::find_scoped(conn, installment_id, false).await?;
        Self::linked_payments(conn, row.id).await
    }

    /// Registers a payment against an installment.
    ///
    /// The installment row is locked for the read-validate-write window;
    /// the allocation is validated against the residual computed from the
    /// locked state, then the settlement entry is written.
    ///
    /// # Errors
    ///
    /// Returns allocation validation errors (stating the maximum allowed
    /// amount on overpayment), or account/cause errors.
    pub async fn register_payment(
        conn: &TenantConn,
        input: RegisterPaymentInput,
    ) -> Result<InstallmentBalance, PaymentError> {
        let company_id = conn.scope().stamp(None)?;

        let installment = Self::find_scoped(conn, input.installment_id, true).await?;
        let payments = Self::linked_payments(conn, installment.id).await?;
        let allocated = allocated_total(&payments.iter().map(|p| p.amount).collect::<Vec<_>>());
        let open = residual(installment.rate_amount, allocated);

        validate_new_payment(input.amount, open, input.policy)?;

        let cause = Self::find_ordinary_cause(conn, company_id, &input.cause_code).await?;
        Self::check_settlement_account(conn, company_id, input.financial_account_id).await?;

        // The movement direction follows the installment: receivables are
        // settled by inflows, payables by outflows.
        let movement = match InstallmentKind::from(installment.kind) {
            InstallmentKind::Receivable => MovementKind::Inflow,
            InstallmentKind::Payable => MovementKind::Outflow,
        };

        let entry = JournalEntry {
            id: JournalEntryId::new(),
            company_id,
            entry_date: input.entry_date,
            amount: input.amount,
            movement,
            cause_code: cause.code,
            financial_account_id: Some(FinancialAccountId::from_uuid(input.financial_account_id)),
            operating_account_id: None,
            party_id: installment.party_id.map(PartyId::from_uuid),
            site_id: None,
            installment_id: Some(InstallmentId::from_uuid(installment.id)),
            transfer_id: None,
            reverses_transfer_id: None,
            description: input.description,
        };
        JournalRepository::insert_entry(conn, &entry).await?;

        tracing::debug!(
            company_id = %company_id,
            installment_id = %installment.id,
            amount = %input.amount,
            "payment registered"
        );

        Self::balance_for(conn, installment).await
    }

    /// Amends the amount of an existing payment.
    ///
    /// The allocated total is recomputed over all *other* payments linked
    /// to the same installment before the new amount is accepted.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound`, `NotAPayment`, or allocation errors.
    pub async fn amend_payment(
        conn: &TenantConn,
        payment_id: Uuid,
        new_amount: Decimal,
        policy: AllocationPolicy,
    ) -> Result<InstallmentBalance, PaymentError> {
        let Some(company_id) = conn.company_id() else {
            return Err(PaymentError::PaymentNotFound(payment_id));
        };

        let payment = journal_entries::Entity::find_by_id(payment_id)
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        let installment_id = payment
            .installment_id
            .ok_or(PaymentError::NotAPayment(payment_id))?;

        let installment = Self::find_scoped(conn, installment_id, true).await?;
        let others: Vec<Decimal> = Self::linked_payments(conn, installment.id)
            .await?
            .into_iter()
            .filter(|p| p.id != payment_id)
            .map(|p| p.amount)
            .collect();

        validate_amended_payment(
            new_amount,
            installment.rate_amount,
            allocated_total(&others),
            policy,
        )?;

        let mut model: journal_entries::ActiveModel = payment.into();
        model.amount = Set(new_amount);
        model.updated_at = Set(Utc::now().into());
        model.update(conn.transaction()).await?;

        Self::balance_for(conn, installment).await
    }

    /// Deletes a payment.
    ///
    /// The installment's allocated total is derived, so removal lowers it
    /// implicitly; the installment itself is never deleted.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` or `NotAPayment`.
    pub async fn delete_payment(conn: &TenantConn, payment_id: Uuid) -> Result<(), PaymentError> {
        let Some(company_id) = conn.company_id() else {
            return Err(PaymentError::PaymentNotFound(payment_id));
        };

        let payment = journal_entries::Entity::find_by_id(payment_id)
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        if payment.installment_id.is_none() {
            return Err(PaymentError::NotAPayment(payment_id));
        }

        journal_entries::Entity::delete_by_id(payment_id)
            .exec(conn.transaction())
            .await?;
        Ok(())
    }

    /// Records a personnel expiry deadline.
    ///
    /// # Errors
    ///
    /// Returns `Tenant` with no active scope.
    pub async fn create_personnel_expiry(
        conn: &TenantConn,
        employee_name: String,
        description: String,
        expiry_date: NaiveDate,
    ) -> Result<personnel_expiries::Model, PaymentError> {
        let company_id = conn.scope().stamp(None)?;

        let now = Utc::now().into();
        let model = personnel_expiries::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            employee_name: Set(employee_name),
            description: Set(description),
            expiry_date: Set(expiry_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Lists personnel expiries of the active company, nearest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_personnel_expiries(
        conn: &TenantConn,
    ) -> Result<Vec<personnel_expiries::Model>, PaymentError> {
        let Some(company_id) = conn.company_id() else {
            return Ok(Vec::new());
        };

        Ok(personnel_expiries::Entity::find()
            .filter(personnel_expiries::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(personnel_expiries::Column::ExpiryDate)
            .all(conn.transaction())
            .await?)
    }

    /// Creates an installment backed by a personnel expiry.
    ///
    /// # Errors
    ///
    /// Returns `ExpiryNotFound` for missing or foreign expiries.
    pub async fn create_for_personnel_expiry(
        conn: &TenantConn,
        input: PersonnelInstallmentInput,
    ) -> Result<installments::Model, PaymentError> {
        let company_id = conn.scope().stamp(None)?;

        let expiry = personnel_expiries::Entity::find_by_id(input.personnel_expiry_id)
            .filter(personnel_expiries::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(PaymentError::ExpiryNotFound(input.personnel_expiry_id))?;

        let now = Utc::now().into();
        let model = installments::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            due_date: Set(input.due_date),
            rate_amount: Set(input.rate_amount),
            kind: Set(enums::InstallmentKind::from(input.kind)),
            party_id: Set(input.party_id),
            document_id: Set(None),
            personnel_expiry_id: Set(Some(expiry.id)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn.transaction()).await?)
    }

    /// Loads an installment of the active company, optionally locking the
    /// row (`FOR UPDATE`) for a read-validate-write sequence.
    async fn find_scoped(
        conn: &TenantConn,
        installment_id: Uuid,
        lock: bool,
    ) -> Result<installments::Model, PaymentError> {
        let Some(company_id) = conn.company_id() else {
            return Err(PaymentError::InstallmentNotFound(installment_id));
        };

        let mut query = installments::Entity::find_by_id(installment_id)
            .filter(installments::Column::CompanyId.eq(company_id.into_inner()));
        if lock {
            query = query.lock_exclusive();
        }

        query
            .one(conn.transaction())
            .await?
            .ok_or(PaymentError::InstallmentNotFound(installment_id))
    }

    async fn linked_payments(
        conn: &TenantConn,
        installment_id: Uuid,
    ) -> Result<Vec<journal_entries::Model>, PaymentError> {
        Ok(journal_entries::Entity::find()
            .filter(journal_entries::Column::InstallmentId.eq(installment_id))
            .order_by_asc(journal_entries::Column::EntryDate)
            .all(conn.transaction())
            .await?)
    }

    async fn balance_for(
        conn: &TenantConn,
        installment: installments::Model,
    ) -> Result<InstallmentBalance, PaymentError> {
        let payments = Self::linked_payments(conn, installment.id).await?;
        let allocated = allocated_total(&payments.iter().map(|p| p.amount).collect::<Vec<_>>());
        let status = settlement_status(installment.rate_amount, allocated)?;
        let open = residual(installment.rate_amount, allocated);

        Ok(InstallmentBalance { installment, allocated, residual: open, status })
    }

    async fn find_ordinary_cause(
        conn: &TenantConn,
        company_id: CompanyId,
        code: &str,
    ) -> Result<crate::entities::causes::Model, PaymentError> {
        let cause = crate::entities::causes::Entity::find()
            .filter(crate::entities::causes::Column::CompanyId.eq(company_id.into_inner()))
            .filter(crate::entities::causes::Column::Code.eq(code.trim().to_uppercase()))
            .filter(crate::entities::causes::Column::IsActive.eq(true))
            .one(conn.transaction())
            .await?
            .ok_or_else(|| PaymentError::CauseNotFound(code.to_string()))?;

        if cause.kind != enums::CauseKind::Ordinary {
            return Err(PaymentError::CauseNotOrdinary(cause.code));
        }
        Ok(cause)
    }

    async fn check_settlement_account(
        conn: &TenantConn,
        company_id: CompanyId,
        account_id: Uuid,
    ) -> Result<(), PaymentError> {
        let account = financial_accounts::Entity::find_by_id(account_id)
            .filter(financial_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(conn.transaction())
            .await?
            .ok_or(PaymentError::AccountNotFound(account_id))?;

        if !account.is_active {
            return Err(PaymentError::AccountInactive(account_id));
        }
        Ok(())
    }
}
