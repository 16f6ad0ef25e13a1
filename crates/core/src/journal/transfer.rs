//! Posting engine for ordinary movements and internal transfers.
//!
//! This engine contains pure business logic with no database dependencies:
//! account existence and activity are injected as lookups, mirroring how the
//! repositories consult scoped queries before persisting.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use gestra_shared::types::{
    CompanyId, FinancialAccountId, InstallmentId, JournalEntryId, OperatingAccountId, PartyId,
    SiteId, TransferId,
};

use super::error::JournalError;
use super::types::{CauseKind, JournalEntry, MovementKind};

/// Input for posting a journal movement.
///
/// The cause kind selects the posting mode. For transfers the movement kind
/// must be absent (the engine derives it) and the account pair is taken from
/// `source_account_id` / `destination_account_id`; for ordinary movements
/// exactly one of `financial_account_id` / `operating_account_id` is used.
#[derive(Debug, Clone)]
pub struct PostMovementInput {
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Transaction cause code.
    pub cause_code: String,
    /// Posting mode derived from the cause code.
    pub cause_kind: CauseKind,
    /// Movement kind; required for ordinary entries, forbidden for transfers.
    pub movement: Option<MovementKind>,
    /// Cash/bank account for ordinary financial movements.
    pub financial_account_id: Option<FinancialAccountId>,
    /// Cost-center account for ordinary operating movements.
    pub operating_account_id: Option<OperatingAccountId>,
    /// Transfer source account.
    pub source_account_id: Option<FinancialAccountId>,
    /// Transfer destination account.
    pub destination_account_id: Option<FinancialAccountId>,
    /// Optional counterparty tag (ordinary movements only).
    pub party_id: Option<PartyId>,
    /// Optional job-site tag (ordinary movements only).
    pub site_id: Option<SiteId>,
    /// Installment being settled, when the movement is a payment.
    pub installment_id: Option<InstallmentId>,
    /// Free-text description.
    pub description: String,
}

/// The two legs of an internal transfer, always handled as a unit.
#[derive(Debug, Clone)]
pub struct TransferPair {
    /// Identifier shared by both legs.
    pub transfer_id: TransferId,
    /// The leg debiting the source account.
    pub outflow: JournalEntry,
    /// The leg crediting the destination account.
    pub inflow: JournalEntry,
}

impl TransferPair {
    /// Reconstructs a pair from two stored legs, verifying they actually
    /// belong together.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotATransferPair` when the rows do not share a
    /// transfer id, company, amount, and date with opposite movements.
    pub fn from_entries(a: JournalEntry, b: JournalEntry) -> Result<Self, JournalError> {
        let (outflow, inflow) = match (a.movement, b.movement) {
            (MovementKind::Outflow, MovementKind::Inflow) => (a, b),
            (MovementKind::Inflow, MovementKind::Outflow) => (b, a),
            _ => return Err(JournalError::NotATransferPair),
        };

        let consistent = outflow.transfer_id.is_some()
            && outflow.transfer_id == inflow.transfer_id
            && outflow.company_id == inflow.company_id
            && outflow.amount == inflow.amount
            && outflow.entry_date == inflow.entry_date;
        if !consistent {
            return Err(JournalError::NotATransferPair);
        }

        // Checked Some above.
        let transfer_id = outflow.transfer_id.ok_or(JournalError::NotATransferPair)?;
        Ok(Self { transfer_id, outflow, inflow })
    }

    /// Consumes the pair into its two legs, outflow first.
    #[must_use]
    pub fn into_entries(self) -> [JournalEntry; 2] {
        [self.outflow, self.inflow]
    }
}

/// Result of a posting: one entry, or a transfer pair.
#[derive(Debug, Clone)]
pub enum Posting {
    /// Ordinary movement: a single entry.
    Movement(JournalEntry),
    /// Internal transfer: two linked entries.
    Transfer(TransferPair),
}

impl Posting {
    /// Consumes the posting into the entries to persist.
    #[must_use]
    pub fn into_entries(self) -> Vec<JournalEntry> {
        match self {
            Self::Movement(entry) => vec![entry],
            Self::Transfer(pair) => pair.into_entries().into(),
        }
    }
}

/// Input for amending a posted transfer as a unit.
#[derive(Debug, Clone)]
pub struct AmendTransferInput {
    /// New entry date for both legs.
    pub entry_date: NaiveDate,
    /// New amount for both legs.
    pub amount: Decimal,
    /// New source account.
    pub source_account_id: FinancialAccountId,
    /// New destination account.
    pub destination_account_id: FinancialAccountId,
    /// New description for both legs.
    pub description: String,
}

/// Posting engine for journal movements.
///
/// Validation is ordered so messages match the actual scenario: cause-code
/// classification first, then account checks, then movement requirements.
pub struct TransferEngine;

impl TransferEngine {
    /// Validates and builds the entries for a movement.
    ///
    /// `financial_gate` / `operating_gate` report whether an account exists
    /// in the active scope and is open to new postings.
    ///
    /// # Errors
    ///
    /// Returns `JournalError` describing the first failed check of the
    /// selected posting mode.
    pub fn post<F, O>(
        company_id: CompanyId,
        input: &PostMovementInput,
        financial_gate: F,
        operating_gate: O,
    ) -> Result<Posting, JournalError>
    where
        F: Fn(FinancialAccountId) -> Result<(), JournalError>,
        O: Fn(OperatingAccountId) -> Result<(), JournalError>,
    {
        match input.cause_kind {
            CauseKind::Transfer => {
                Self::post_transfer(company_id, input, &financial_gate).map(Posting::Transfer)
            }
            CauseKind::Ordinary => {
                Self::post_ordinary(company_id, input, &financial_gate, &operating_gate)
                    .map(Posting::Movement)
            }
        }
    }

    fn post_transfer<F>(
        company_id: CompanyId,
        input: &PostMovementInput,
        financial_gate: &F,
    ) -> Result<TransferPair, JournalError>
    where
        F: Fn(FinancialAccountId) -> Result<(), JournalError>,
    {
        let source = input
            .source_account_id
            .ok_or(JournalError::SourceAccountRequired)?;
        let destination = input
            .destination_account_id
            .ok_or(JournalError::DestinationAccountRequired)?;
        if source == destination {
            return Err(JournalError::SameAccountTransfer);
        }
        if input.movement.is_some() {
            return Err(JournalError::MovementNotAllowed);
        }
        if input.amount <= Decimal::ZERO {
            return Err(JournalError::NonPositiveAmount);
        }
        financial_gate(source)?;
        financial_gate(destination)?;

        let transfer_id = TransferId::new();
        let leg = |account: FinancialAccountId, movement: MovementKind| JournalEntry {
            id: JournalEntryId::new(),
            company_id,
            entry_date: input.entry_date,
            amount: input.amount,
            movement,
            cause_code: input.cause_code.clone(),
            financial_account_id: Some(account),
            operating_account_id: None,
            party_id: None,
            site_id: None,
            installment_id: None,
            transfer_id: Some(transfer_id),
            reverses_transfer_id: None,
            description: input.description.clone(),
        };

        Ok(TransferPair {
            transfer_id,
            outflow: leg(source, MovementKind::Outflow),
            inflow: leg(destination, MovementKind::Inflow),
        })
    }

    fn post_ordinary<F, O>(
        company_id: CompanyId,
        input: &PostMovementInput,
        financial_gate: &F,
        operating_gate: &O,
    ) -> Result<JournalEntry, JournalError>
    where
        F: Fn(FinancialAccountId) -> Result<(), JournalError>,
        O: Fn(OperatingAccountId) -> Result<(), JournalError>,
    {
        match (input.financial_account_id, input.operating_account_id) {
            (Some(_), Some(_)) | (None, None) => return Err(JournalError::AccountRequired),
            (Some(account), None) => financial_gate(account)?,
            (None, Some(account)) => operating_gate(account)?,
        }

        let movement = input.movement.ok_or(JournalError::MovementRequired)?;
        if input.amount <= Decimal::ZERO {
            return Err(JournalError::NonPositiveAmount);
        }

        Ok(JournalEntry {
            id: JournalEntryId::new(),
            company_id,
            entry_date: input.entry_date,
            amount: input.amount,
            movement,
            cause_code: input.cause_code.clone(),
            financial_account_id: input.financial_account_id,
            operating_account_id: input.operating_account_id,
            party_id: input.party_id,
            site_id: input.site_id,
            installment_id: input.installment_id,
            transfer_id: None,
            reverses_transfer_id: None,
            description: input.description.clone(),
        })
    }

    /// Rewrites both legs of a posted transfer under the same transfer id.
    ///
    /// Leg and transfer identifiers are preserved so the amendment is an
    /// update of the existing rows, never a partial rewrite of one leg.
    ///
    /// # Errors
    ///
    /// Returns `JournalError` when the new account pair or amount is invalid.
    pub fn amend<F>(
        existing: &TransferPair,
        input: &AmendTransferInput,
        financial_gate: F,
    ) -> Result<TransferPair, JournalError>
    where
        F: Fn(FinancialAccountId) -> Result<(), JournalError>,
    {
        if input.source_account_id == input.destination_account_id {
            return Err(JournalError::SameAccountTransfer);
        }
        if input.amount <= Decimal::ZERO {
            return Err(JournalError::NonPositiveAmount);
        }
        financial_gate(input.source_account_id)?;
        financial_gate(input.destination_account_id)?;

        let rewrite = |leg: &JournalEntry, account: FinancialAccountId| JournalEntry {
            id: leg.id,
            company_id: leg.company_id,
            entry_date: input.entry_date,
            amount: input.amount,
            movement: leg.movement,
            cause_code: leg.cause_code.clone(),
            financial_account_id: Some(account),
            operating_account_id: None,
            party_id: None,
            site_id: None,
            installment_id: None,
            transfer_id: leg.transfer_id,
            reverses_transfer_id: leg.reverses_transfer_id,
            description: input.description.clone(),
        };

        Ok(TransferPair {
            transfer_id: existing.transfer_id,
            outflow: rewrite(&existing.outflow, input.source_account_id),
            inflow: rewrite(&existing.inflow, input.destination_account_id),
        })
    }

    /// Builds the reversal pair for a posted transfer.
    ///
    /// The reversal is a new pair under a fresh transfer id with the
    /// movements swapped (funds flow back from the destination to the
    /// source); both legs carry `reverses_transfer_id`. A transfer can be
    /// reversed at most once — the repository reports whether a reversal
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::AlreadyReversed` when a reversal exists.
    pub fn reverse(
        existing: &TransferPair,
        reversal_date: NaiveDate,
        description: String,
        already_reversed: bool,
    ) -> Result<TransferPair, JournalError> {
        if already_reversed {
            return Err(JournalError::AlreadyReversed(existing.transfer_id));
        }

        let transfer_id = TransferId::new();
        let leg = |template: &JournalEntry, movement: MovementKind| JournalEntry {
            id: JournalEntryId::new(),
            company_id: template.company_id,
            entry_date: reversal_date,
            amount: template.amount,
            movement,
            cause_code: template.cause_code.clone(),
            financial_account_id: template.financial_account_id,
            operating_account_id: None,
            party_id: None,
            site_id: None,
            installment_id: None,
            transfer_id: Some(transfer_id),
            reverses_transfer_id: Some(existing.transfer_id),
            description: description.clone(),
        };

        // Funds return: the original destination pays out, the source takes
        // the money back in.
        Ok(TransferPair {
            transfer_id,
            outflow: leg(&existing.inflow, MovementKind::Outflow),
            inflow: leg(&existing.outflow, MovementKind::Inflow),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ok_financial(_id: FinancialAccountId) -> Result<(), JournalError> {
        Ok(())
    }

    fn ok_operating(_id: OperatingAccountId) -> Result<(), JournalError> {
        Ok(())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn transfer_input(
        source: Option<FinancialAccountId>,
        destination: Option<FinancialAccountId>,
        amount: Decimal,
    ) -> PostMovementInput {
        PostMovementInput {
            entry_date: date(),
            amount,
            cause_code: "GIRO".to_string(),
            cause_kind: CauseKind::Transfer,
            movement: None,
            financial_account_id: None,
            operating_account_id: None,
            source_account_id: source,
            destination_account_id: destination,
            party_id: None,
            site_id: None,
            installment_id: None,
            description: "cash to bank".to_string(),
        }
    }

    fn ordinary_input(
        movement: Option<MovementKind>,
        financial: Option<FinancialAccountId>,
        operating: Option<OperatingAccountId>,
    ) -> PostMovementInput {
        PostMovementInput {
            entry_date: date(),
            amount: dec!(100.00),
            cause_code: "EXP".to_string(),
            cause_kind: CauseKind::Ordinary,
            movement,
            financial_account_id: financial,
            operating_account_id: operating,
            source_account_id: None,
            destination_account_id: None,
            party_id: None,
            site_id: None,
            installment_id: None,
            description: "fuel".to_string(),
        }
    }

    fn post(input: &PostMovementInput) -> Result<Posting, JournalError> {
        TransferEngine::post(CompanyId::new(), input, ok_financial, ok_operating)
    }

    #[test]
    fn test_transfer_produces_two_linked_legs() {
        let source = FinancialAccountId::new();
        let destination = FinancialAccountId::new();
        let input = transfer_input(Some(source), Some(destination), dec!(250.00));

        let Posting::Transfer(pair) = post(&input).unwrap() else {
            panic!("expected a transfer pair");
        };

        assert_eq!(pair.outflow.movement, MovementKind::Outflow);
        assert_eq!(pair.outflow.financial_account_id, Some(source));
        assert_eq!(pair.inflow.movement, MovementKind::Inflow);
        assert_eq!(pair.inflow.financial_account_id, Some(destination));

        assert_eq!(pair.outflow.amount, dec!(250.00));
        assert_eq!(pair.inflow.amount, dec!(250.00));
        assert_eq!(pair.outflow.entry_date, pair.inflow.entry_date);
        assert_eq!(pair.outflow.transfer_id, Some(pair.transfer_id));
        assert_eq!(pair.inflow.transfer_id, Some(pair.transfer_id));
    }

    #[test]
    fn test_transfer_to_same_account_rejected() {
        let account = FinancialAccountId::new();
        let input = transfer_input(Some(account), Some(account), dec!(250.00));

        let err = post(&input).unwrap_err();
        assert_eq!(err, JournalError::SameAccountTransfer);
        assert_eq!(err.field(), Some("destination_account"));
    }

    #[test]
    fn test_transfer_requires_both_accounts() {
        let account = FinancialAccountId::new();
        assert_eq!(
            post(&transfer_input(None, Some(account), dec!(10))).unwrap_err(),
            JournalError::SourceAccountRequired
        );
        assert_eq!(
            post(&transfer_input(Some(account), None, dec!(10))).unwrap_err(),
            JournalError::DestinationAccountRequired
        );
    }

    #[test]
    fn test_transfer_rejects_supplied_movement() {
        let mut input = transfer_input(
            Some(FinancialAccountId::new()),
            Some(FinancialAccountId::new()),
            dec!(10),
        );
        input.movement = Some(MovementKind::Inflow);

        assert_eq!(post(&input).unwrap_err(), JournalError::MovementNotAllowed);
    }

    #[test]
    fn test_transfer_rejects_non_positive_amount() {
        let input = transfer_input(
            Some(FinancialAccountId::new()),
            Some(FinancialAccountId::new()),
            Decimal::ZERO,
        );
        assert_eq!(post(&input).unwrap_err(), JournalError::NonPositiveAmount);
    }

    #[test]
    fn test_transfer_rejects_inactive_account() {
        let source = FinancialAccountId::new();
        let destination = FinancialAccountId::new();
        let input = transfer_input(Some(source), Some(destination), dec!(10));

        let gate = |id: FinancialAccountId| -> Result<(), JournalError> {
            if id == destination {
                Err(JournalError::AccountInactive(id))
            } else {
                Ok(())
            }
        };

        let err = TransferEngine::post(CompanyId::new(), &input, gate, ok_operating).unwrap_err();
        assert_eq!(err, JournalError::AccountInactive(destination));
    }

    #[test]
    fn test_ordinary_movement_posts_one_entry() {
        let account = FinancialAccountId::new();
        let input = ordinary_input(Some(MovementKind::Outflow), Some(account), None);

        let Posting::Movement(entry) = post(&input).unwrap() else {
            panic!("expected a single movement");
        };
        assert_eq!(entry.movement, MovementKind::Outflow);
        assert_eq!(entry.financial_account_id, Some(account));
        assert!(entry.transfer_id.is_none());
    }

    #[test]
    fn test_ordinary_movement_requires_movement_kind() {
        let input = ordinary_input(None, Some(FinancialAccountId::new()), None);
        let err = post(&input).unwrap_err();
        assert_eq!(err, JournalError::MovementRequired);
        assert_eq!(err.field(), Some("movement"));
    }

    #[test]
    fn test_ordinary_movement_requires_exactly_one_account() {
        assert_eq!(
            post(&ordinary_input(Some(MovementKind::Inflow), None, None)).unwrap_err(),
            JournalError::AccountRequired
        );
        assert_eq!(
            post(&ordinary_input(
                Some(MovementKind::Inflow),
                Some(FinancialAccountId::new()),
                Some(OperatingAccountId::new()),
            ))
            .unwrap_err(),
            JournalError::AccountRequired
        );
    }

    #[test]
    fn test_pair_reconstruction_validates_consistency() {
        let input = transfer_input(
            Some(FinancialAccountId::new()),
            Some(FinancialAccountId::new()),
            dec!(99.00),
        );
        let Posting::Transfer(pair) = post(&input).unwrap() else {
            panic!("expected a transfer pair");
        };

        let [outflow, inflow] = pair.clone().into_entries();
        let rebuilt = TransferPair::from_entries(inflow.clone(), outflow.clone()).unwrap();
        assert_eq!(rebuilt.transfer_id, pair.transfer_id);

        let mut tampered = inflow;
        tampered.amount = dec!(98.00);
        assert_eq!(
            TransferPair::from_entries(outflow, tampered).unwrap_err(),
            JournalError::NotATransferPair
        );
    }

    #[test]
    fn test_amend_rewrites_both_legs_in_place() {
        let source = FinancialAccountId::new();
        let destination = FinancialAccountId::new();
        let Posting::Transfer(pair) =
            post(&transfer_input(Some(source), Some(destination), dec!(100.00))).unwrap()
        else {
            panic!("expected a transfer pair");
        };

        let new_destination = FinancialAccountId::new();
        let amended = TransferEngine::amend(
            &pair,
            &AmendTransferInput {
                entry_date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                amount: dec!(150.00),
                source_account_id: source,
                destination_account_id: new_destination,
                description: "corrected".to_string(),
            },
            ok_financial,
        )
        .unwrap();

        // Same rows, same group: only the content changed.
        assert_eq!(amended.transfer_id, pair.transfer_id);
        assert_eq!(amended.outflow.id, pair.outflow.id);
        assert_eq!(amended.inflow.id, pair.inflow.id);
        assert_eq!(amended.outflow.amount, dec!(150.00));
        assert_eq!(amended.inflow.amount, dec!(150.00));
        assert_eq!(amended.inflow.financial_account_id, Some(new_destination));
    }

    #[test]
    fn test_amend_validates_account_pair() {
        let account = FinancialAccountId::new();
        let Posting::Transfer(pair) = post(&transfer_input(
            Some(FinancialAccountId::new()),
            Some(FinancialAccountId::new()),
            dec!(100.00),
        ))
        .unwrap() else {
            panic!("expected a transfer pair");
        };

        let err = TransferEngine::amend(
            &pair,
            &AmendTransferInput {
                entry_date: date(),
                amount: dec!(100.00),
                source_account_id: account,
                destination_account_id: account,
                description: String::new(),
            },
            ok_financial,
        )
        .unwrap_err();
        assert_eq!(err, JournalError::SameAccountTransfer);
    }

    #[test]
    fn test_reverse_swaps_movements_and_links_back() {
        let source = FinancialAccountId::new();
        let destination = FinancialAccountId::new();
        let Posting::Transfer(pair) =
            post(&transfer_input(Some(source), Some(destination), dec!(250.00))).unwrap()
        else {
            panic!("expected a transfer pair");
        };

        let reversal_date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let reversal =
            TransferEngine::reverse(&pair, reversal_date, "undo".to_string(), false).unwrap();

        assert_ne!(reversal.transfer_id, pair.transfer_id);
        // Funds flow back: destination pays out, source receives.
        assert_eq!(reversal.outflow.financial_account_id, Some(destination));
        assert_eq!(reversal.inflow.financial_account_id, Some(source));
        assert_eq!(reversal.outflow.amount, dec!(250.00));
        assert_eq!(
            reversal.outflow.reverses_transfer_id,
            Some(pair.transfer_id)
        );
        assert_eq!(reversal.inflow.reverses_transfer_id, Some(pair.transfer_id));
        assert_eq!(reversal.outflow.entry_date, reversal_date);
    }

    #[test]
    fn test_reverse_only_once() {
        let Posting::Transfer(pair) = post(&transfer_input(
            Some(FinancialAccountId::new()),
            Some(FinancialAccountId::new()),
            dec!(50.00),
        ))
        .unwrap() else {
            panic!("expected a transfer pair");
        };

        assert_eq!(
            TransferEngine::reverse(&pair, date(), String::new(), true).unwrap_err(),
            JournalError::AlreadyReversed(pair.transfer_id)
        );
    }
}
