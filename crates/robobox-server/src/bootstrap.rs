//! Application state assembly
//!
//! Turns a [`ServerConfig`] into the provider, flows, store and identity
//! provider the handlers share.

use crate::api::rest::AppState;
use crate::config::{FaqConfig, LlmConfig, LlmProviderKind, ServerConfig};
use crate::reveal_sessions::RevealSessions;
use anyhow::{Context, Result};
use rand::Rng;
use robobox_core::auth::{
    AdminPolicy, IdentityProvider, LocalIdentityProvider, SharedSecretVerifier,
};
use robobox_core::search::SearchIndex;
use robobox_core::QaPair;
use robobox_llm::flows::prompt_templates::DISCOUNT_SYSTEM_MESSAGE;
use robobox_llm::{
    AnthropicProvider, DiscountFlow, DiscountFlowConfig, FaqFlow, FaqFlowConfig, GeminiProvider,
    KeywordQaRetriever, LLMClient, LLMRequest, MockProvider, OpenAIProvider, QaRetriever,
    StaticQaRetriever,
};
use robobox_store::{DocumentStore, EnquiryBook, ProductCatalog, WorkshopDirectory};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const OFFLINE_FAQ_FALLBACK: &str =
    "RoboBox Reimagined offers robotics kits, workshops and school programs. \
     Please contact us for details.";

/// Build everything from configuration
pub async fn init_state(config: &ServerConfig) -> Result<AppState> {
    let client = build_client(&config.llm)?;
    let retriever = build_retriever(&config.faq).await?;
    let store = config
        .store
        .open()
        .await
        .context("Failed to open document store")?;
    info!("Document store ready ({})", store.name());

    let mut identity = LocalIdentityProvider::new()
        .with_otp_ttl(Duration::from_secs(config.auth.otp_ttl_secs));
    match config.auth.federated_secret.as_deref().filter(|s| !s.is_empty()) {
        Some(secret) => {
            identity =
                identity.with_federated_verifier(Box::new(SharedSecretVerifier::new(secret)));
        }
        None => info!("No federated secret configured; federated sign-in disabled"),
    }

    Ok(assemble(config, client, retriever, store, Arc::new(identity)))
}

/// Wire prebuilt parts into handler state
pub fn assemble(
    config: &ServerConfig,
    client: Arc<dyn LLMClient>,
    retriever: Arc<dyn QaRetriever>,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
) -> AppState {
    let llm = &config.llm;

    let mut discount_config = DiscountFlowConfig::new(llm.model.clone())
        .with_max_attempts(llm.discount_max_attempts)
        .with_timeout(llm.timeout());
    if let Some(temperature) = llm.temperature {
        discount_config = discount_config.with_temperature(temperature);
    }
    let discount = Arc::new(DiscountFlow::new(client.clone(), discount_config));

    let faq_config = FaqFlowConfig::new(llm.model.clone())
        .with_max_tool_rounds(llm.faq_max_tool_rounds)
        .with_timeout(llm.timeout());
    let faq = Arc::new(FaqFlow::new(client, retriever, faq_config));

    AppState {
        faq,
        reveals: Arc::new(RevealSessions::new(discount, config.reveal.clone())),
        products: ProductCatalog::new(store.clone()),
        workshops: WorkshopDirectory::new(store.clone()),
        enquiries: EnquiryBook::new(store),
        identity,
        admin: Arc::new(AdminPolicy::new(config.auth.admin_email.clone())),
        search: Arc::new(SearchIndex::site()),
    }
}

/// Provider for the configured backend
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LLMClient>> {
    if config.provider == LlmProviderKind::Mock {
        info!("Using offline mock provider");
        return Ok(Arc::new(offline_provider()));
    }

    let Some(api_key) = config.resolved_api_key() else {
        let var = config.provider.api_key_env().unwrap_or("api_key");
        return Err(anyhow::anyhow!(
            "No API key for provider {:?}; set llm.api_key or {}",
            config.provider,
            var
        ));
    };

    let client: Arc<dyn LLMClient> = match (config.provider, config.base_url.clone()) {
        (LlmProviderKind::OpenAI, Some(url)) => {
            Arc::new(OpenAIProvider::with_base_url(api_key, url))
        }
        (LlmProviderKind::OpenAI, None) => Arc::new(OpenAIProvider::new(api_key)),
        (LlmProviderKind::Anthropic, Some(url)) => {
            Arc::new(AnthropicProvider::with_base_url(api_key, url))
        }
        (LlmProviderKind::Anthropic, None) => Arc::new(AnthropicProvider::new(api_key)),
        (LlmProviderKind::Gemini, Some(url)) => {
            Arc::new(GeminiProvider::with_base_url(api_key, url))
        }
        (LlmProviderKind::Gemini, None) => Arc::new(GeminiProvider::new(api_key)),
        (LlmProviderKind::Mock, _) => Arc::new(offline_provider()),
    };

    info!("Using {} provider with model {}", client.name(), config.model);
    Ok(client)
}

/// Knowledge base from YAML when configured, else the built-in samples
pub async fn build_retriever(config: &FaqConfig) -> Result<Arc<dyn QaRetriever>> {
    match &config.knowledge_base_path {
        Some(path) => {
            let retriever = KeywordQaRetriever::from_yaml_file(path)
                .await
                .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;
            info!(
                "Loaded {} Q&A pair(s) from {}",
                retriever.len(),
                path.display()
            );
            Ok(Arc::new(retriever))
        }
        None => Ok(Arc::new(StaticQaRetriever::default())),
    }
}

/// Mock provider that plays both prompt contracts without a network
///
/// Discount requests get a random code; FAQ requests call the tool once and
/// then answer with the best pair it returned.
pub fn offline_provider() -> MockProvider {
    MockProvider::with_responder(Box::new(|request: &LLMRequest| {
        if request.system.as_deref() == Some(DISCOUNT_SYSTEM_MESSAGE) {
            return offline_discount();
        }
        if request.history.is_empty() {
            return json!({ "tool": "getQAPairs" }).to_string();
        }
        let answer = first_tool_answer(&request.prompt).unwrap_or_else(|| {
            warn!("Offline provider found no Q&A pairs in tool result");
            OFFLINE_FAQ_FALLBACK.to_string()
        });
        json!({ "answer": answer }).to_string()
    }))
}

fn offline_discount() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..36u8);
            char::from(if idx < 10 { b'0' + idx } else { b'A' + idx - 10 })
        })
        .collect();
    json!({
        "discountCode": format!("ROBO-{}", suffix),
        "discountPercentage": rng.gen_range(5..=50),
    })
    .to_string()
}

/// First answer in a `getQAPairs returned:` prompt
fn first_tool_answer(prompt: &str) -> Option<String> {
    let rest = prompt.strip_prefix("getQAPairs returned:")?.trim_start();
    let pairs: Vec<QaPair> = serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<QaPair>>()
        .next()?
        .ok()?;
    pairs.into_iter().next().map(|pair| pair.answer)
}
