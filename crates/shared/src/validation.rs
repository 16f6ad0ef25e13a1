//! Field-scoped validation errors.
//!
//! Validation failures are collected per field and returned together, so a
//! caller submitting a form with several bad fields gets all of them in one
//! round trip. Checks that are deliberately sequenced (the transfer engine)
//! return a single-field error instead.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A collection of validation messages keyed by field name.
///
/// `BTreeMap` keeps field ordering stable for API responses and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding a single message for one field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Adds a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Merges another collection into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Returns true if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the messages recorded for a field (empty if none).
    #[must_use]
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.errors.get(field).cloned().unwrap_or_default()
    }

    /// Returns an iterator over (field, messages) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Converts the collection into a result: `Ok(())` when empty,
    /// `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the collection itself when at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_collects_multiple_fields() {
        let mut errors = FieldErrors::new();
        errors.add("vat_number", "already in use");
        errors.add("fiscal_code", "already in use");
        errors.add("vat_number", "invalid length");

        assert!(!errors.is_empty());
        assert_eq!(errors.messages("vat_number").len(), 2);
        assert_eq!(errors.messages("fiscal_code").len(), 1);
        assert!(errors.messages("missing").is_empty());
    }

    #[test]
    fn test_merge() {
        let mut a = FieldErrors::single("amount", "must be positive");
        let b = FieldErrors::single("date", "required");
        a.merge(b);
        assert_eq!(a.iter().count(), 2);
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.add("amount", "must be positive");
        errors.add("date", "required");
        assert_eq!(errors.to_string(), "amount: must be positive; date: required");
    }

    #[test]
    fn test_into_result_err() {
        let errors = FieldErrors::single("amount", "must be positive");
        assert_eq!(errors.clone().into_result(), Err(errors));
    }
}
