//! FAQ assistant with the `getQAPairs` tool

use crate::client::{ChatMessage, LLMClient, LLMRequest};
use crate::error::{LLMError, Result};
use crate::flows::json_extractor::extract_json_object;
use crate::flows::prompt_templates::{
    FAQ_FINAL_ROUND_NOTE, FAQ_PROMPT, FAQ_SYSTEM_MESSAGE, FAQ_TOOL_RESULT_PROMPT,
};
use crate::flows::retriever::{QaRetriever, StaticQaRetriever};
use crate::flows::{call_with_timeout, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use robobox_core::FaqAnswer;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Name of the only tool the FAQ model may call
pub const QA_TOOL_NAME: &str = "getQAPairs";

/// Configuration for the FAQ flow
#[derive(Debug, Clone)]
pub struct FaqFlowConfig {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Tool calls allowed before an answer is demanded
    pub max_tool_rounds: u32,
    /// Bound on each model call
    pub timeout: Duration,
}

impl Default for FaqFlowConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(512),
            temperature: Some(0.3),
            max_tool_rounds: 2,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FaqFlowConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One parsed model turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqReply {
    Answer(String),
    ToolCall { question: String },
}

/// Answers free-text questions, offering the model prior Q&A pairs
pub struct FaqFlow {
    client: Arc<dyn LLMClient>,
    retriever: Arc<dyn QaRetriever>,
    config: FaqFlowConfig,
}

impl FaqFlow {
    pub fn new(
        client: Arc<dyn LLMClient>,
        retriever: Arc<dyn QaRetriever>,
        config: FaqFlowConfig,
    ) -> Self {
        Self {
            client,
            retriever,
            config,
        }
    }

    /// Default config, grounded by the two built-in sample pairs
    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Self {
        Self::new(
            client,
            Arc::new(StaticQaRetriever::default()),
            FaqFlowConfig::default(),
        )
    }

    pub fn config(&self) -> &FaqFlowConfig {
        &self.config
    }

    /// Answer one question
    ///
    /// The model may call the tool up to `max_tool_rounds` times; the reply
    /// after that must be an answer.
    pub async fn answer(&self, question: &str) -> Result<FaqAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(LLMError::Other("Question must not be empty".to_string()));
        }

        let mut history: Vec<ChatMessage> = Vec::new();
        let mut prompt = FAQ_PROMPT.replace("{question}", question);
        let mut tool_rounds = 0u32;

        loop {
            let request = LLMRequest {
                prompt: prompt.clone(),
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
                system: Some(FAQ_SYSTEM_MESSAGE.to_string()),
                history: history.clone(),
                json_output: true,
            };

            let response =
                call_with_timeout(self.client.as_ref(), request, self.config.timeout).await?;

            match parse_faq_reply(&response.content, question)? {
                FaqReply::Answer(answer) => {
                    info!("Answered FAQ after {} tool call(s)", tool_rounds);
                    return Ok(FaqAnswer { answer });
                }
                FaqReply::ToolCall { question: lookup } => {
                    if tool_rounds >= self.config.max_tool_rounds {
                        return Err(LLMError::SchemaViolation(format!(
                            "model kept calling {} after {} rounds",
                            QA_TOOL_NAME, tool_rounds
                        )));
                    }
                    tool_rounds += 1;

                    let pairs = self.retriever.retrieve(&lookup).await?;
                    debug!(
                        "{} round {} for '{}' returned {} pair(s)",
                        QA_TOOL_NAME,
                        tool_rounds,
                        lookup,
                        pairs.len()
                    );

                    history.push(ChatMessage::user(prompt));
                    history.push(ChatMessage::assistant(response.content));

                    let result = serde_json::to_string(&pairs)?;
                    prompt = FAQ_TOOL_RESULT_PROMPT.replace("{result}", &result);
                    if tool_rounds >= self.config.max_tool_rounds {
                        prompt.push_str(FAQ_FINAL_ROUND_NOTE);
                    }
                }
            }
        }
    }
}

/// Interpret a model turn
///
/// Prose with no JSON object counts as the answer itself. A tool call with no
/// question looks up the user's question.
pub fn parse_faq_reply(content: &str, user_question: &str) -> Result<FaqReply> {
    let value = match extract_json_object(content) {
        Ok(value) => value,
        Err(_) => {
            let text = content.trim();
            if text.is_empty() {
                return Err(LLMError::SchemaViolation("empty answer".to_string()));
            }
            return Ok(FaqReply::Answer(text.to_string()));
        }
    };

    if let Some(answer) = value.get("answer") {
        let answer = answer
            .as_str()
            .map(str::trim)
            .ok_or_else(|| LLMError::SchemaViolation("answer must be a string".to_string()))?;
        if answer.is_empty() {
            return Err(LLMError::SchemaViolation("empty answer".to_string()));
        }
        return Ok(FaqReply::Answer(answer.to_string()));
    }

    match value.get("tool").and_then(Value::as_str) {
        Some(QA_TOOL_NAME) => {
            let question = value
                .get("question")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .unwrap_or(user_question);
            Ok(FaqReply::ToolCall {
                question: question.to_string(),
            })
        }
        Some(other) => Err(LLMError::SchemaViolation(format!("unknown tool {}", other))),
        None => Err(LLMError::SchemaViolation(
            "reply has neither answer nor tool".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    #[test]
    fn test_parse_answer_and_tool() {
        assert_eq!(
            parse_faq_reply(r#"{"answer": " Kits. "}"#, "q").unwrap(),
            FaqReply::Answer("Kits.".to_string())
        );
        assert_eq!(
            parse_faq_reply(r#"{"tool": "getQAPairs", "question": "kits"}"#, "q").unwrap(),
            FaqReply::ToolCall {
                question: "kits".to_string()
            }
        );
        assert_eq!(
            parse_faq_reply(r#"{"tool": "getQAPairs"}"#, "user q").unwrap(),
            FaqReply::ToolCall {
                question: "user q".to_string()
            }
        );
        assert_eq!(
            parse_faq_reply("We sell robotics kits.", "q").unwrap(),
            FaqReply::Answer("We sell robotics kits.".to_string())
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert!(parse_faq_reply(r#"{"answer": "  "}"#, "q").is_err());
        assert!(parse_faq_reply(r#"{"answer": 3}"#, "q").is_err());
        assert!(parse_faq_reply(r#"{"tool": "search"}"#, "q").is_err());
        assert!(parse_faq_reply(r#"{"foo": 1}"#, "q").is_err());
        assert!(parse_faq_reply("   ", "q").is_err());
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(MockProvider::scripted([r#"{"answer": "Robotics kits."}"#]));
        let flow = FaqFlow::with_defaults(provider.clone());
        let answer = flow.answer("What do you sell?").await.unwrap();
        assert_eq!(answer.answer, "Robotics kits.");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let provider = Arc::new(MockProvider::scripted([
            r#"{"tool": "getQAPairs", "question": "products on offer"}"#,
            r#"{"answer": "RoboBox Reimagined offers robotics kits and educational resources."}"#,
        ]));
        let flow = FaqFlow::with_defaults(provider.clone());
        let answer = flow
            .answer("What products does RoboBox Reimagined offer?")
            .await
            .unwrap();
        assert!(!answer.answer.is_empty());

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].history.len(), 2);
        assert!(requests[1].prompt.contains("variety of robotics kits"));
    }

    #[tokio::test]
    async fn test_tool_budget() {
        let tool = r#"{"tool": "getQAPairs", "question": "x"}"#;
        let provider = Arc::new(MockProvider::scripted([tool, tool, tool]));
        let flow = FaqFlow::with_defaults(provider.clone());

        let err = flow.answer("Anything?").await.unwrap_err();
        assert!(matches!(err, LLMError::SchemaViolation(_)));
        assert_eq!(provider.call_count(), 3);
        assert!(provider.requests()[2].prompt.contains("no longer available"));
    }

    #[tokio::test]
    async fn test_blank_question() {
        let provider = Arc::new(MockProvider::new());
        let flow = FaqFlow::with_defaults(provider.clone());
        assert!(flow.answer("  ").await.is_err());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let provider = Arc::new(MockProvider::failing("503"));
        let flow = FaqFlow::with_defaults(provider);
        assert!(matches!(
            flow.answer("Hello?").await,
            Err(LLMError::ApiCallFailed(_))
        ));
    }
}
