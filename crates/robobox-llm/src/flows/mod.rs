//! Prompt flows
//!
//! Each flow wraps one prompt contract around an [`LLMClient`]:
//! - Discount: a code plus a percentage in [1, 99]
//! - FAQ: an answer grounded by the `getQAPairs` tool
//!
//! # Example
//! ```no_run
//! use robobox_llm::{DiscountFlow, FaqFlow, MockProvider};
//! use std::sync::Arc;
//!
//! # async fn example() -> robobox_llm::Result<()> {
//! let provider = Arc::new(MockProvider::scripted([
//!     r#"{"discountCode": "ROBO-SPARK", "discountPercentage": 25}"#,
//!     r#"{"answer": "Robotics kits and workshops."}"#,
//! ]));
//!
//! let discount = DiscountFlow::with_defaults(provider.clone()).generate().await?;
//! println!("{} for {}% off", discount.code, discount.percentage);
//!
//! let faq = FaqFlow::with_defaults(provider);
//! let answer = faq.answer("What products does RoboBox Reimagined offer?").await?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```

pub mod discount;
pub mod faq;
pub mod json_extractor;
pub mod prompt_templates;
pub mod retriever;

pub use discount::{DiscountFlow, DiscountFlowConfig};
pub use faq::{FaqFlow, FaqFlowConfig};
pub use json_extractor::extract_json_object;
pub use retriever::{KeywordQaRetriever, QaRetriever, StaticQaRetriever};

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use std::time::Duration;

/// Default model for both flows
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default bound on a single model call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One model call, failing with `Timeout` once `timeout` elapses
pub(crate) async fn call_with_timeout(
    client: &dyn LLMClient,
    request: LLMRequest,
    timeout: Duration,
) -> Result<LLMResponse> {
    match tokio::time::timeout(timeout, client.call(request)).await {
        Ok(result) => result,
        Err(_) => Err(LLMError::Timeout(timeout)),
    }
}
