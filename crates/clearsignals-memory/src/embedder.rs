use std::sync::Arc;

use async_trait::async_trait;
use clearsignals_llm::{EmbeddingClient, EmbeddingRequest};

use crate::error::{MemoryError, Result};
use crate::trait_client::Embedder;

/// First `max_chars` characters of `text`
pub fn cap_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
pub struct OpenAIEmbedder {
    client: Arc<dyn EmbeddingClient>,
    model: String,
    dimension: usize,
    max_input_chars: usize,
}

impl OpenAIEmbedder {
    pub fn new(
        client: Arc<dyn EmbeddingClient>,
        model: impl Into<String>,
        dimension: usize,
        max_input_chars: usize,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            dimension,
            max_input_chars,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = cap_input(text, self.max_input_chars);
        if input.trim().is_empty() {
            return Err(MemoryError::Embedding("cannot embed empty text".to_string()));
        }

        let response = self
            .client
            .embed(EmbeddingRequest::new(&self.model, input))
            .await
            .map_err(|e| MemoryError::Embedding(format!("{:#}", e)))?;

        if response.embedding.len() != self.dimension {
            return Err(MemoryError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.dimension,
                response.embedding.len()
            )));
        }

        Ok(response.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
