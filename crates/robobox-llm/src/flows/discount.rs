//! Discount code generation

use crate::client::{ChatMessage, LLMClient, LLMRequest};
use crate::error::{LLMError, Result};
use crate::flows::json_extractor::extract_json_object;
use crate::flows::prompt_templates::{
    DISCOUNT_PROMPT, DISCOUNT_RETRY_PROMPT, DISCOUNT_SYSTEM_MESSAGE,
};
use crate::flows::{call_with_timeout, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use robobox_core::models::{MAX_DISCOUNT_PERCENTAGE, MIN_DISCOUNT_PERCENTAGE};
use robobox_core::DiscountResult;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for discount generation
#[derive(Debug, Clone)]
pub struct DiscountFlowConfig {
    /// Model to use for generation
    pub model: String,
    /// Maximum tokens for response
    pub max_tokens: Option<u32>,
    /// Temperature; high, since codes should vary
    pub temperature: Option<f32>,
    /// Model calls allowed per `generate`, re-prompting on invalid output
    pub max_attempts: u32,
    /// Bound on each model call
    pub timeout: Duration,
}

impl Default for DiscountFlowConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(256),
            temperature: Some(1.0),
            max_attempts: 3,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DiscountFlowConfig {
    /// Create a new configuration with a specific model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Asks the model for a discount code and validates the result
///
/// No caching: every `generate` is a fresh model call.
pub struct DiscountFlow {
    client: Arc<dyn LLMClient>,
    config: DiscountFlowConfig,
}

impl DiscountFlow {
    pub fn new(client: Arc<dyn LLMClient>, config: DiscountFlowConfig) -> Self {
        Self { client, config }
    }

    /// Create with default configuration
    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Self {
        Self::new(client, DiscountFlowConfig::default())
    }

    pub fn config(&self) -> &DiscountFlowConfig {
        &self.config
    }

    /// Generate one discount
    ///
    /// # Returns
    /// * `Ok(DiscountResult)` - A code with a percentage in [1, 99]
    /// * `Err(LLMError::Timeout | ApiCallFailed | HttpError)` - Transport failure, not retried
    /// * `Err(LLMError::GenerationFailed)` - Every attempt broke the output contract
    pub async fn generate(&self) -> Result<DiscountResult> {
        let attempts = self.config.max_attempts.max(1);
        let mut history = Vec::new();
        let mut prompt = DISCOUNT_PROMPT.to_string();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let request = LLMRequest {
                prompt: prompt.clone(),
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
                system: Some(DISCOUNT_SYSTEM_MESSAGE.to_string()),
                history: history.clone(),
                json_output: true,
            };

            let response =
                call_with_timeout(self.client.as_ref(), request, self.config.timeout).await?;

            match parse_discount(&response.content) {
                Ok(discount) => {
                    info!(
                        "Generated discount {} ({}%) on attempt {}",
                        discount.code, discount.percentage, attempt
                    );
                    return Ok(discount);
                }
                Err(e) if e.is_output_error() => {
                    warn!("Discount attempt {}/{} rejected: {}", attempt, attempts, e);
                    last_error = e.to_string();
                    history.push(ChatMessage::user(prompt));
                    history.push(ChatMessage::assistant(response.content));
                    prompt = DISCOUNT_RETRY_PROMPT.replace("{error}", &last_error);
                }
                Err(e) => return Err(e),
            }
        }

        Err(LLMError::GenerationFailed {
            attempts,
            last_error,
        })
    }
}

/// Parse and validate `{"discountCode", "discountPercentage"}`
///
/// Percentages are never clamped: out-of-range or fractional values are
/// schema violations.
pub fn parse_discount(content: &str) -> Result<DiscountResult> {
    let value = extract_json_object(content)?;

    let code = value
        .get("discountCode")
        .and_then(Value::as_str)
        .ok_or_else(|| LLMError::SchemaViolation("discountCode must be a string".to_string()))?;

    let percentage = value
        .get("discountPercentage")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            LLMError::SchemaViolation("discountPercentage must be a number".to_string())
        })?;

    if percentage.fract() != 0.0 {
        return Err(LLMError::SchemaViolation(format!(
            "discountPercentage {} is not a whole number",
            percentage
        )));
    }
    if percentage < MIN_DISCOUNT_PERCENTAGE as f64 || percentage > MAX_DISCOUNT_PERCENTAGE as f64 {
        return Err(LLMError::SchemaViolation(format!(
            "discountPercentage {} outside [{}, {}]",
            percentage, MIN_DISCOUNT_PERCENTAGE, MAX_DISCOUNT_PERCENTAGE
        )));
    }

    debug!("Parsed discount reply");
    DiscountResult::new(code, percentage as i64)
        .map_err(|e| LLMError::SchemaViolation(e.to_string()))
}
