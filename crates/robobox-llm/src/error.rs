//! Error types for the RoboBox prompt flows

use std::time::Duration;
use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// LLM module errors
#[derive(Debug, Error)]
pub enum LLMError {
    /// External API call failed
    #[error("External API call failed: {0}")]
    ApiCallFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Response parsed but broke the flow's output contract
    #[error("Output schema violation: {0}")]
    SchemaViolation(String),

    /// Model call did not finish in time
    #[error("Model call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Every attempt produced an invalid result
    #[error("Generation failed after {attempts} attempts: {last_error}")]
    GenerationFailed { attempts: u32, last_error: String },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LLMError {
    /// Errors caused by the output itself, worth re-prompting for
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            LLMError::SchemaViolation(_)
                | LLMError::InvalidResponse(_)
                | LLMError::SerializationError(_)
        )
    }
}

impl From<String> for LLMError {
    fn from(s: String) -> Self {
        LLMError::Other(s)
    }
}

impl From<&str> for LLMError {
    fn from(s: &str) -> Self {
        LLMError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_errors() {
        assert!(LLMError::SchemaViolation("x".into()).is_output_error());
        assert!(LLMError::InvalidResponse("x".into()).is_output_error());
        assert!(!LLMError::ApiCallFailed("x".into()).is_output_error());
        assert!(!LLMError::Timeout(Duration::from_secs(5)).is_output_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LLMError::Timeout(Duration::from_millis(5000)).to_string(),
            "Model call timed out after 5000ms"
        );
        assert_eq!(
            LLMError::GenerationFailed {
                attempts: 3,
                last_error: "percentage 0".to_string()
            }
            .to_string(),
            "Generation failed after 3 attempts: percentage 0"
        );
    }
}
