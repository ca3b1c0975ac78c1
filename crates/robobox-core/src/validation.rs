//! Form validation
//!
//! Field checks are collected rather than short-circuited, so a caller gets
//! every problem with a submitted form in one pass.

use serde::Serialize;
use thiserror::Error;
use url::Url;

/// A single field validation failure
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Field is shorter than its minimum length
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Required field is empty
    #[error("{field} is required")]
    Required { field: String },

    /// Not a usable email address
    #[error("{field} must be a valid email address")]
    InvalidEmail { field: String },

    /// Not an absolute http(s) URL
    #[error("{field} must be a valid URL")]
    InvalidUrl { field: String },

    /// Numeric field outside its accepted range
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::TooShort { field, .. }
            | ValidationError::Required { field }
            | ValidationError::InvalidEmail { field }
            | ValidationError::InvalidUrl { field }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// Types that can check themselves before being written to the store
pub trait Validate {
    /// Validate every field, returning all failures
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Accumulates field check failures
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<ValidationError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least `min` characters
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.errors.push(ValidationError::TooShort {
                field: field.to_string(),
                min,
            });
        }
        self
    }

    /// Require a non-blank value
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(ValidationError::Required {
                field: field.to_string(),
            });
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.errors.push(ValidationError::InvalidEmail {
                field: field.to_string(),
            });
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_url(value) {
            self.errors.push(ValidationError::InvalidUrl {
                field: field.to_string(),
            });
        }
        self
    }

    /// Require `min <= value <= max`
    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !(value >= min && value <= max) {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                min,
                max,
            });
        }
        self
    }

    /// Finish checking
    pub fn finish(&mut self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

/// Loose structural email check: `local@domain.tld`, no whitespace
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// Absolute URL with an http or https scheme
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("principal@school.edu"));
        assert!(is_valid_email("a.b+c@robobox.co.in"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@domain.com"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@domain.c"));
        assert!(!is_valid_email("user name@domain.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://images.example.com/kit.png"));
        assert!(is_valid_url("http://localhost:3000/a.jpg"));

        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("/relative/path.png"));
        assert!(!is_valid_url("ftp://files.example.com/kit.png"));
    }

    #[test]
    fn test_field_checks_collects_all_errors() {
        let result = FieldChecks::new()
            .min_len("name", "A", 2)
            .range("price", -1.0, 0.0, f64::MAX)
            .required("venue", "   ")
            .finish();

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field(), "name");
        assert_eq!(errors[1].field(), "price");
        assert_eq!(errors[2].field(), "venue");
    }

    #[test]
    fn test_min_len_counts_characters_not_bytes() {
        assert!(FieldChecks::new().min_len("name", "éé", 2).finish().is_ok());
    }

    #[test]
    fn test_range_rejects_nan() {
        assert!(FieldChecks::new()
            .range("price", f64::NAN, 0.0, 10.0)
            .finish()
            .is_err());
    }
}
