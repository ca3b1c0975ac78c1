//! Server configuration

use robobox_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Text generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Offline canned replies; no API key needed
    #[default]
    Mock,
    OpenAI,
    Anthropic,
    Gemini,
}

impl LlmProviderKind {
    /// Environment variable consulted when no key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProviderKind::Mock => None,
            LlmProviderKind::OpenAI => Some("OPENAI_API_KEY"),
            LlmProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProviderKind::Gemini => Some("GEMINI_API_KEY"),
        }
    }
}

/// Prompt flow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,

    /// Model used by both flows
    pub model: String,

    /// API key; falls back to the provider's environment variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Override for the provider endpoint
    pub base_url: Option<String>,

    /// Discount flow temperature
    pub temperature: Option<f32>,

    /// Bound on each model call
    pub timeout_ms: u64,

    pub discount_max_attempts: u32,

    pub faq_max_tool_rounds: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: robobox_llm::DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            temperature: None,
            timeout_ms: robobox_llm::DEFAULT_TIMEOUT.as_millis() as u64,
            discount_max_attempts: 3,
            faq_max_tool_rounds: 2,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configured key, else the provider's environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.provider
                    .api_key_env()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The one email routed to the back-office
    pub admin_email: String,

    /// Lifetime of a phone verification code
    pub otp_ttl_secs: u64,

    /// Shared secret for signed federated assertions; federated sign-in is
    /// refused when unset
    #[serde(skip_serializing)]
    pub federated_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: robobox_core::auth::DEFAULT_ADMIN_EMAIL.to_string(),
            otp_ttl_secs: robobox_core::auth::OTP_TTL.as_secs(),
            federated_secret: None,
        }
    }
}

/// Geometry and lifetime of scratch-reveal sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub width: u32,
    pub height: u32,
    pub brush_radius: f64,

    /// Sessions untouched for this long are dropped
    pub idle_timeout_secs: u64,

    /// Upper bound on live sessions; the least recently used go first
    pub max_sessions: u64,
}

impl RevealConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 160,
            brush_radius: robobox_core::reveal::DEFAULT_BRUSH_RADIUS,
            idle_timeout_secs: 15 * 60,
            max_sessions: 1_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    /// YAML file of Q&A pairs; the built-in samples are used when unset
    pub knowledge_base_path: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level
    pub log_level: String,

    pub llm: LlmConfig,

    pub store: StoreConfig,

    pub auth: AuthConfig,

    pub reveal: RevealConfig,

    pub faq: FaqConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            llm: LlmConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            reveal: RevealConfig::default(),
            faq: FaqConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    ///
    /// Nested keys use a double underscore, e.g. `ROBOBOX_LLM__PROVIDER=openai`.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(
                config::Environment::with_prefix("ROBOBOX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.llm.provider, LlmProviderKind::Mock);
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.timeout(), Duration::from_secs(5));
        assert_eq!(config.auth.admin_email, "admin@example.com");
        assert_eq!(config.auth.otp_ttl_secs, 300);
        assert!(config.faq.knowledge_base_path.is_none());
    }

    #[test]
    fn test_provider_key_env() {
        assert_eq!(LlmProviderKind::Mock.api_key_env(), None);
        assert_eq!(LlmProviderKind::OpenAI.api_key_env(), Some("OPENAI_API_KEY"));
        assert_eq!(LlmProviderKind::Gemini.api_key_env(), Some("GEMINI_API_KEY"));
    }

    #[test]
    fn test_configured_key_wins() {
        let config = LlmConfig {
            provider: LlmProviderKind::Mock,
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("sk-test"));

        let blank = LlmConfig {
            provider: LlmProviderKind::Mock,
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.resolved_api_key(), None);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = LlmConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
