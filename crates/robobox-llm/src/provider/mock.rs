//! Mock LLM provider for testing and offline runs

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::LLMProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Computes a reply from the request when the script is empty
pub type Responder = Box<dyn Fn(&LLMRequest) -> String + Send + Sync>;

enum Reply {
    Text(String),
    Fail(String),
}

/// Mock LLM provider
///
/// Scripted replies are served first, in order. Once the script runs out the
/// responder (or the fixed default response) answers.
pub struct MockProvider {
    name: String,
    default_response: String,
    responder: Option<Responder>,
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<LLMRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    failing: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self::with_response("Mock LLM response".to_string())
    }

    /// Create with custom default response
    pub fn with_response(response: String) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: response,
            responder: None,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
            failing: None,
        }
    }

    /// Create with a function computing every unscripted reply
    pub fn with_responder(responder: Responder) -> Self {
        let mut provider = Self::new();
        provider.responder = Some(responder);
        provider
    }

    /// A provider whose every call fails with `ApiCallFailed`
    pub fn failing(message: impl Into<String>) -> Self {
        let mut provider = Self::new();
        provider.failing = Some(message.into());
        provider
    }

    /// Queue replies, served before the default
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for reply in replies {
            provider.push_response(reply);
        }
        provider
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_response(&self, response: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Reply::Text(response.into()));
        }
    }

    /// Queue one failing call
    pub fn push_error(&self, message: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Reply::Fail(message.into()));
        }
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, oldest first
    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self, request: &LLMRequest) -> Reply {
        if let Some(message) = &self.failing {
            return Reply::Fail(message.clone());
        }
        if let Some(reply) = self.script.lock().ok().and_then(|mut s| s.pop_front()) {
            return reply;
        }
        match &self.responder {
            Some(responder) => Reply::Text(responder(request)),
            None => Reply::Text(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply(&request) {
            Reply::Text(content) => Ok(LLMResponse::new(content, request.model)
                .with_tokens(10)
                .with_finish_reason("stop".to_string())),
            Reply::Fail(message) => Err(LLMError::ApiCallFailed(message)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LLMProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LLMRequest {
        LLMRequest::new("Test".to_string(), "mock-model".to_string())
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider::new();
        let response = provider.call(request()).await.unwrap();
        assert_eq!(response.content, "Mock LLM response");
        assert_eq!(response.model, "mock-model");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_script_then_default() {
        let provider = MockProvider::scripted(["first", "second"]);
        provider.push_error("boom");

        assert_eq!(provider.call(request()).await.unwrap().content, "first");
        assert_eq!(provider.call(request()).await.unwrap().content, "second");
        assert!(matches!(
            provider.call(request()).await,
            Err(LLMError::ApiCallFailed(m)) if m == "boom"
        ));
        assert_eq!(provider.call(request()).await.unwrap().content, "Mock LLM response");
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_responder_sees_request() {
        let provider =
            MockProvider::with_responder(Box::new(|req| format!("echo: {}", req.prompt)));
        assert_eq!(provider.call(request()).await.unwrap().content, "echo: Test");
        assert_eq!(provider.requests()[0].prompt, "Test");
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockProvider::failing("offline");
        provider.push_response("never served");
        assert!(provider.call(request()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let provider = MockProvider::new().with_delay(Duration::from_secs(3));
        let start = tokio::time::Instant::now();
        provider.call(request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
