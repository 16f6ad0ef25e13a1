//! Per-company uniqueness of counterparty identifiers.

use gestra_shared::FieldErrors;
use gestra_shared::types::PartyId;

use super::normalize::{normalize_fiscal_code, normalize_vat_number};

/// The identifying fields of a counterparty, as used by uniqueness checks.
///
/// The same shape describes both the candidate under validation and its
/// same-company siblings; the repository supplies the sibling set already
/// restricted to the active scope.
#[derive(Debug, Clone)]
pub struct PartyIdentity {
    /// The party id, absent for a record not yet created.
    pub id: Option<PartyId>,
    /// Display name, used to point at the conflicting record in messages.
    pub name: String,
    /// VAT number, possibly un-normalized.
    pub vat_number: Option<String>,
    /// Fiscal code, possibly un-normalized.
    pub fiscal_code: Option<String>,
}

impl PartyIdentity {
    fn normalized_vat(&self) -> Option<String> {
        self.vat_number
            .as_deref()
            .map(normalize_vat_number)
            .filter(|v| !v.is_empty())
    }

    fn normalized_fiscal_code(&self) -> Option<String> {
        self.fiscal_code
            .as_deref()
            .map(normalize_fiscal_code)
            .filter(|v| !v.is_empty())
    }
}

/// Validates that the candidate's identifiers are unique within its company.
///
/// Both identifier fields are checked in one pass and violations are
/// collected together, so a submission with two conflicting identifiers is
/// corrected in a single round trip. The record under update (matching
/// `candidate.id`) is excluded from the comparison.
///
/// # Errors
///
/// Returns `FieldErrors` naming, per field, the counterparty already using
/// the identifier.
pub fn check_unique_identifiers(
    candidate: &PartyIdentity,
    siblings: &[PartyIdentity],
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let candidate_vat = candidate.normalized_vat();
    let candidate_code = candidate.normalized_fiscal_code();

    for sibling in siblings {
        if candidate.id.is_some() && sibling.id == candidate.id {
            continue;
        }

        if let (Some(vat), Some(other)) = (&candidate_vat, sibling.normalized_vat())
            && *vat == other
        {
            errors.add(
                "vat_number",
                format!("VAT number already used by counterparty \"{}\"", sibling.name),
            );
        }

        if let (Some(code), Some(other)) = (&candidate_code, sibling.normalized_fiscal_code())
            && *code == other
        {
            errors.add(
                "fiscal_code",
                format!("fiscal code already used by counterparty \"{}\"", sibling.name),
            );
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(id: Option<PartyId>, name: &str, vat: Option<&str>, code: Option<&str>) -> PartyIdentity {
        PartyIdentity {
            id,
            name: name.to_string(),
            vat_number: vat.map(ToString::to_string),
            fiscal_code: code.map(ToString::to_string),
        }
    }

    #[test]
    fn test_unique_identifiers_pass() {
        let candidate = party(None, "Rossi SRL", Some("01234567890"), None);
        let siblings = vec![party(
            Some(PartyId::new()),
            "Bianchi SPA",
            Some("09876543210"),
            None,
        )];

        assert!(check_unique_identifiers(&candidate, &siblings).is_ok());
    }

    #[test]
    fn test_duplicate_vat_detected_across_formats() {
        // Same VAT number, one stored with country prefix and spaces.
        let candidate = party(None, "Rossi SRL", Some("IT 01234567890"), None);
        let siblings = vec![party(
            Some(PartyId::new()),
            "Bianchi SPA",
            Some("01234567890"),
            None,
        )];

        let errors = check_unique_identifiers(&candidate, &siblings).unwrap_err();
        let messages = errors.messages("vat_number");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Bianchi SPA"));
    }

    #[test]
    fn test_both_fields_reported_together() {
        let candidate = party(
            None,
            "Rossi SRL",
            Some("01234567890"),
            Some("RSSMRA80A01H501U"),
        );
        let siblings = vec![
            party(Some(PartyId::new()), "Bianchi SPA", Some("01234567890"), None),
            party(
                Some(PartyId::new()),
                "Verdi SNC",
                None,
                Some("rssmra80a01h501u"),
            ),
        ];

        let errors = check_unique_identifiers(&candidate, &siblings).unwrap_err();
        assert_eq!(errors.messages("vat_number").len(), 1);
        assert_eq!(errors.messages("fiscal_code").len(), 1);
    }

    #[test]
    fn test_record_under_update_is_excluded() {
        let id = PartyId::new();
        let candidate = party(Some(id), "Rossi SRL", Some("01234567890"), None);
        // The stored version of the same record obviously shares its own VAT.
        let siblings = vec![party(Some(id), "Rossi SRL", Some("01234567890"), None)];

        assert!(check_unique_identifiers(&candidate, &siblings).is_ok());
    }

    #[test]
    fn test_empty_identifiers_never_conflict() {
        let candidate = party(None, "Rossi SRL", None, None);
        let siblings = vec![party(Some(PartyId::new()), "Bianchi SPA", None, None)];

        assert!(check_unique_identifiers(&candidate, &siblings).is_ok());
    }
}
