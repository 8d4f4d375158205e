use std::sync::Arc;

use anyhow::{anyhow, Result};
use clearsignals_llm::ChatClient;
use clearsignals_types::{ModelCatalog, PipelineConfig};

use crate::pipeline::Pipeline;

/// Builder for constructing a Pipeline with optional overrides
pub struct PipelineBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    catalog: ModelCatalog,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            catalog: ModelCatalog::default(),
            config: PipelineConfig::default(),
        }
    }

    /// Set the chat-completion client used for every stage
    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let client = self
            .chat_client
            .ok_or_else(|| anyhow!("Chat client is required"))?;

        Ok(Pipeline::new(client, self.catalog, self.config))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
