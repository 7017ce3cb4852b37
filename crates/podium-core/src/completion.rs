//! Language-model completions.
//!
//! The intent classifier and the knowledge capabilities only need a
//! `system + user -> text` round trip, so that is all [`CompletionService`]
//! exposes. [`OpenRouterClient`] implements it over the OpenRouter
//! chat-completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::PodiumConfig;
use crate::error::{Result, ServiceError};

const PROVIDER: &str = "openrouter";

/// Which model a request should go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// The regular, most capable model.
    Primary,
    /// Cheaper model used after the primary is rate limited.
    Fallback,
}

/// A text completion backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the model's reply to a single system + user exchange.
    async fn complete(&self, tier: ModelTier, system_prompt: &str, user_prompt: &str)
        -> Result<String>;
}

/// OpenRouter chat-completions client.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    primary_model: String,
    fallback_model: String,
    timeout: Duration,
    max_tokens: u32,
}

impl OpenRouterClient {
    /// Create a client with default models and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_OPENROUTER_BASE_URL.to_string(),
            primary_model: crate::config::DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: crate::config::DEFAULT_FALLBACK_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 500,
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotConfigured` without an API key.
    pub fn from_config(config: &PodiumConfig) -> Result<Self> {
        let api_key = config
            .openrouter_api_key
            .clone()
            .ok_or_else(|| ServiceError::NotConfigured(PROVIDER.to_string()))?;

        Ok(Self::new(api_key)
            .with_base_url(&config.openrouter_base_url)
            .with_models(&config.primary_model, &config.fallback_model)
            .with_timeout(config.request_timeout))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, primary: &str, fallback: &str) -> Self {
        self.primary_model = primary.to_string();
        self.fallback_model = fallback.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model identifier used for a tier.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Primary => &self.primary_model,
            ModelTier::Fallback => &self.fallback_model,
        }
    }
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    async fn complete(
        &self,
        tier: ModelTier,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model_for(tier),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.2,
        };

        trace!(model = %request.model, "Sending chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Title", "Podium")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, self.timeout.as_secs()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!(model = %request.model, "OpenRouter rate limit");
            return Err(ServiceError::RateLimited(PROVIDER.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ServiceError::Parse("no content in response".to_string()))?;

        debug!(
            model = %request.model,
            tokens = parsed.usage.map_or(0, |u| u.total_tokens),
            "Chat response received"
        );
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}
