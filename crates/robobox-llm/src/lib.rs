//! RoboBox prompt flows
//!
//! This crate connects the RoboBox site to a generative text model:
//! - Discount flow: an opaque code with a percentage in [1, 99]
//! - FAQ flow: answers grounded by prior Q&A pairs through a tool callback
//!
//! Providers sit behind [`LLMClient`]; [`MockProvider`] serves tests and
//! offline runs.

// Re-export core types
pub use client::{ChatMessage, LLMClient, LLMRequest, LLMResponse, Role};
pub use error::{LLMError, Result};

// Re-export providers
pub use provider::{
    AnthropicProvider, GeminiProvider, LLMProvider, MockProvider, OpenAIProvider, Responder,
};

// Re-export flows
pub use flows::{
    DiscountFlow, DiscountFlowConfig, FaqFlow, FaqFlowConfig, KeywordQaRetriever, QaRetriever,
    StaticQaRetriever, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};

pub mod client;
pub mod error;
pub mod flows;
pub mod provider;
