//! Identifier normalization.
//!
//! All identifiers are normalized before any uniqueness comparison and
//! before storage. Normalization is idempotent: re-normalizing an already
//! normalized value is a no-op.

/// Normalizes a VAT number by stripping every non-ASCII-digit character.
///
/// Country prefixes, spaces, and punctuation are dropped:
/// `"IT 01234567890"` becomes `"01234567890"`.
#[must_use]
pub fn normalize_vat_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a fiscal code: uppercased, non-alphanumerics stripped.
#[must_use]
pub fn normalize_fiscal_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("IT 01234567890", "01234567890")]
    #[case("IT01234567890", "01234567890")]
    #[case("01234567890", "01234567890")]
    #[case("  012-345.678 90 ", "01234567890")]
    #[case("", "")]
    fn test_normalize_vat_number(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_vat_number(raw), expected);
    }

    #[rstest]
    #[case("rssmra80a01h501u", "RSSMRA80A01H501U")]
    #[case("RSS MRA 80A01 H501U", "RSSMRA80A01H501U")]
    #[case("RSSMRA80A01H501U", "RSSMRA80A01H501U")]
    fn test_normalize_fiscal_code(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_fiscal_code(raw), expected);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let vat = normalize_vat_number("IT 01234567890");
        assert_eq!(normalize_vat_number(&vat), vat);

        let code = normalize_fiscal_code("rss mra 80a01 h501u");
        assert_eq!(normalize_fiscal_code(&code), code);
    }
}
