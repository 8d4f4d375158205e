use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{MemoryError, Result};
use crate::models::{IndexStats, Match, MetadataFilter, NamespaceStats, VectorRecord};
use crate::trait_client::VectorIndex;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Process-local index with brute-force cosine search, for tests and local runs
pub struct InMemoryIndex {
    dimension: usize,
    records: RwLock<BTreeMap<String, VectorRecord>>,
}

impl InMemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        if let Some(bad) = records.iter().find(|r| r.values.len() != self.dimension) {
            return Err(MemoryError::Index {
                status: 400,
                body: format!(
                    "vector {} has dimension {}, index expects {}",
                    bad.id,
                    bad.values.len(),
                    self.dimension
                ),
            });
        }

        let mut guard = self.records.write().await;
        for record in records {
            guard.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Match>> {
        let guard = self.records.read().await;
        let mut matches: Vec<Match> = guard
            .values()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.metadata)))
            .map(|r| Match {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                metadata: r.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let count = self.records.read().await.len() as u64;
        let mut namespaces = BTreeMap::new();
        namespaces.insert(String::new(), NamespaceStats { vector_count: count });

        Ok(IndexStats {
            dimension: Some(self.dimension),
            index_fullness: 0.0,
            total_vector_count: count,
            namespaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>, kind: &str) -> VectorRecord {
        let mut metadata = crate::models::Metadata::new();
        metadata.insert("kind".into(), json!(kind));
        VectorRecord {
            id: id.to_string(),
            values,
            metadata,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_orders_filters_and_truncates() {
        let index = InMemoryIndex::new(2);
        index
            .upsert(vec![
                record("a", vec![1.0, 0.0], "deal"),
                record("b", vec![0.7, 0.7], "deal"),
                record("c", vec![1.0, 0.01], "cpp"),
            ])
            .await
            .unwrap();

        let all = index.query(&[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(all[0].id, "a");

        let deals = index
            .query(&[1.0, 0.0], 1, Some(&MetadataFilter::eq("kind", "deal")))
            .await
            .unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, "a");
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_rejects_wrong_dimension() {
        let index = InMemoryIndex::new(2);
        index.upsert(vec![record("a", vec![1.0, 0.0], "deal")]).await.unwrap();
        index.upsert(vec![record("a", vec![0.0, 1.0], "deal")]).await.unwrap();
        assert_eq!(index.len().await, 1);
        assert_eq!(index.fetch("a").await.unwrap().unwrap().values, vec![0.0, 1.0]);

        assert!(index.upsert(vec![record("x", vec![1.0], "deal")]).await.is_err());
        assert_eq!(index.stats().await.unwrap().total_vector_count, 1);
    }
}
