use std::sync::Arc;

use anyhow::Context;
use clearsignals_llm::{ChatClient, ClientFactory, ProviderConfig};
use clearsignals_memory::DealMemory;
use clearsignals_pipeline::Pipeline;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state passed to all handlers
///
/// Either collaborator may be absent when its credentials are missing;
/// handlers that need it reject the request instead of the process failing to start.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Option<Arc<Pipeline>>,
    pub memory: Option<Arc<DealMemory>>,
}

impl AppState {
    pub fn new(
        config: Config,
        chat_client: Option<Arc<dyn ChatClient>>,
        memory: Option<Arc<DealMemory>>,
    ) -> Self {
        let pipeline = chat_client.map(|client| {
            Arc::new(Pipeline::new(
                client,
                config.llm.catalog(),
                config.llm.pipeline_config(),
            ))
        });

        Self {
            config: Arc::new(config),
            pipeline,
            memory,
        }
    }

    /// Build the real OpenRouter client and Pinecone-backed memory from whatever credentials are present
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let chat_client = match config.openrouter_api_key.as_deref() {
            Some(key) => {
                let mut provider = ProviderConfig::openrouter(key).with_timeout_secs(config.llm.timeout_secs);
                if let Some(base_url) = &config.llm.base_url {
                    provider = provider.with_base_url(base_url);
                }
                Some(ClientFactory::create_chat_client(&provider).context("Failed to create chat client")?)
            }
            None => {
                tracing::warn!("OPENROUTER_API_KEY not set; /api/analyze will be rejected");
                None
            }
        };

        let memory = match config.memory_credentials() {
            Some((openai_key, pinecone_key)) => {
                let memory = DealMemory::builder()
                    .from_config(&config.memory, openai_key, pinecone_key)
                    .and_then(|builder| builder.build())
                    .context("Failed to create deal memory")?;
                Some(Arc::new(memory))
            }
            None => {
                tracing::warn!("OPENAI_API_KEY or PINECONE_API_KEY not set; deal memory disabled");
                None
            }
        };

        Ok(Self::new(config, chat_client, memory))
    }

    pub fn pipeline(&self) -> Result<&Pipeline, ApiError> {
        self.pipeline
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("OPENROUTER_API_KEY is not set".to_string()))
    }

    pub fn memory(&self) -> Result<&DealMemory, ApiError> {
        self.memory.as_deref().ok_or(ApiError::MemoryUnavailable)
    }
}
