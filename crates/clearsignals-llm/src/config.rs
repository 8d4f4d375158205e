// Configuration layer for provider-agnostic client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::openai::{OpenAIClient, OPENAI_API_BASE, OPENROUTER_API_BASE};

/// Type of LLM provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenRouter,
    OpenAI,
}

impl ProviderType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenRouter => OPENROUTER_API_BASE,
            ProviderType::OpenAI => OPENAI_API_BASE,
        }
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default base URL (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenRouter,
            api_key: api_key.into(),
            base_url: None,
            timeout_secs: None,
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

/// Factory for creating clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    fn build(config: &ProviderConfig) -> Result<OpenAIClient> {
        let mut builder = OpenAIClient::builder()
            .api_key(config.api_key.clone())
            .base_url(config.resolved_base_url());

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if config.provider == ProviderType::OpenRouter {
            builder = builder.attribution("https://clearsignals.ai", "ClearSignals AI");
        }

        builder.build()
    }

    /// Create a chat client from provider configuration
    pub fn create_chat_client(config: &ProviderConfig) -> Result<Arc<dyn crate::traits::ChatClient>> {
        Ok(Arc::new(Self::build(config)?))
    }

    /// Create an embedding client from provider configuration
    pub fn create_embedding_client(
        config: &ProviderConfig,
    ) -> Result<Arc<dyn crate::traits::EmbeddingClient>> {
        Ok(Arc::new(Self::build(config)?))
    }
}
