use std::sync::Arc;
use std::time::Duration;

use clearsignals_llm::{ClientFactory, ProviderConfig};

use crate::client::{DealMemory, DEFAULT_REMEMBER_TIMEOUT, DEFAULT_SIMILAR_TOP_K};
use crate::config::MemoryConfig;
use crate::dbs::PineconeIndex;
use crate::embedder::OpenAIEmbedder;
use crate::error::{MemoryError, Result};
use crate::trait_client::{Embedder, VectorIndex};

pub struct DealMemoryBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    similar_top_k: usize,
    remember_timeout: Duration,
}

impl DealMemoryBuilder {
    pub fn new() -> Self {
        Self {
            embedder: None,
            index: None,
            similar_top_k: DEFAULT_SIMILAR_TOP_K,
            remember_timeout: DEFAULT_REMEMBER_TIMEOUT,
        }
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn similar_top_k(mut self, top_k: usize) -> Self {
        self.similar_top_k = top_k;
        self
    }

    /// OpenAI embeddings + Pinecone index from configuration and keys.
    /// The index itself is contacted lazily, on first use.
    pub fn from_config(
        mut self,
        config: &MemoryConfig,
        openai_api_key: &str,
        pinecone_api_key: &str,
    ) -> Result<Self> {
        let client = ClientFactory::create_embedding_client(&ProviderConfig::openai(openai_api_key))
            .map_err(|e| MemoryError::Configuration(format!("{:#}", e)))?;

        self.embedder = Some(Arc::new(OpenAIEmbedder::new(
            client,
            &config.embedding_model,
            config.dimension,
            config.max_input_chars,
        )));
        self.index = Some(Arc::new(PineconeIndex::new(pinecone_api_key, config.clone())?));
        self.similar_top_k = config.similar_top_k;
        self.remember_timeout = Duration::from_secs(config.remember_timeout_secs);
        Ok(self)
    }

    pub fn build(self) -> Result<DealMemory> {
        let embedder = self
            .embedder
            .ok_or_else(|| MemoryError::Configuration("embedder is required".to_string()))?;
        let index = self
            .index
            .ok_or_else(|| MemoryError::Configuration("vector index is required".to_string()))?;

        Ok(DealMemory::new(embedder, index)
            .with_similar_top_k(self.similar_top_k)
            .with_remember_timeout(self.remember_timeout))
    }
}

impl Default for DealMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
