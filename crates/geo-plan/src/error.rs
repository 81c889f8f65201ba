//! Validation error types
//!
//! A plan is rejected with every offending field, not just the first.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// One structural problem with a raw plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field (`$` for the document root)
    pub field: String,
    /// Human-readable problem description
    pub message: String,
}

impl FieldError {
    /// Create field error
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structured validation failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a failure with a single field error
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a field error
    #[inline]
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// All recorded errors, in detection order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether a given field was reported
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Number of errors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no errors were recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(value)` if empty, otherwise `Err(self)`
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid analysis plan")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("analysisType", "is required");
        errors.push("outputs", "must not be empty");

        assert_eq!(
            errors.to_string(),
            "invalid analysis plan: analysisType: is required; outputs: must not be empty"
        );
        assert!(errors.has_field("outputs"));
        assert!(!errors.has_field("location"));
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.into_result(|| 7), Ok(7));

        let errors = ValidationErrors::single("$", "not an object");
        assert!(errors.into_result(|| 7).is_err());
    }
}
