use async_trait::async_trait;

use crate::error::Result;
use crate::models::{IndexStats, Match, MetadataFilter, VectorRecord};

/// Turns text into a fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}

/// Trait for vector-index backends
///
/// Implementations own their connection setup; callers never create indexes.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records by id
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Nearest neighbours by cosine similarity, best first
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Match>>;

    /// Fetch one record by id
    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>>;

    async fn stats(&self) -> Result<IndexStats>;
}
