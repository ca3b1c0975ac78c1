//! Error types for RoboBox Core

use crate::validation::ValidationError;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// A discount result outside the accepted shape
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    /// One or more form fields failed validation
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for CoreError {
    fn from(errors: Vec<ValidationError>) -> Self {
        CoreError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_joins_fields() {
        let err = CoreError::Validation(vec![
            ValidationError::TooShort {
                field: "schoolName".to_string(),
                min: 2,
            },
            ValidationError::InvalidEmail {
                field: "email".to_string(),
            },
        ]);

        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("schoolName must be at least 2 characters"));
        assert!(msg.contains("email must be a valid email address"));
    }
}
