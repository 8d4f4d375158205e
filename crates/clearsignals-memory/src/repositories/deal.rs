use std::sync::Arc;

use chrono::Utc;
use clearsignals_types::AnalysisResult;
use serde_json::json;

use crate::error::Result;
use crate::models::{Metadata, MetadataFilter, SimilarDeal, VectorRecord};
use crate::trait_client::{Embedder, VectorIndex};

pub const DEAL_KIND: &str = "deal";
const RESULT_JSON_FIELD: &str = "result_json";
/// Pinecone caps metadata at 40 KB per vector
const MAX_RESULT_JSON_BYTES: usize = 30_000;

/// Flat metadata describing a stored deal
pub fn deal_metadata(result: &AnalysisResult) -> Metadata {
    let fin = &result.final_assessment;
    let mut metadata = Metadata::new();
    metadata.insert("kind".into(), json!(DEAL_KIND));
    metadata.insert("contact_name".into(), json!(result.contact_name));
    metadata.insert("company_name".into(), json!(result.company_name));
    metadata.insert("rep_name".into(), json!(result.rep_name));
    metadata.insert("intent".into(), json!(fin.intent));
    metadata.insert("win_pct".into(), json!(fin.win_pct));
    metadata.insert("deal_stage".into(), json!(fin.deal_stage.as_str()));
    metadata.insert("summary".into(), json!(fin.summary));
    metadata.insert("email_count".into(), json!(result.email_count()));
    metadata.insert("stored_at".into(), json!(Utc::now().to_rfc3339()));

    match serde_json::to_string(result) {
        Ok(serialized) if serialized.len() <= MAX_RESULT_JSON_BYTES => {
            metadata.insert(RESULT_JSON_FIELD.into(), json!(serialized));
        }
        Ok(serialized) => {
            tracing::debug!(bytes = serialized.len(), "analysis too large for metadata, storing summary only");
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize analysis for metadata"),
    }

    metadata
}

#[derive(Clone)]
pub struct DealRepository {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl DealRepository {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed the deal fingerprint and upsert it under `id`
    pub async fn store(&self, id: &str, result: &AnalysisResult) -> Result<()> {
        let values = self.embedder.embed(&result.fingerprint()).await?;
        self.index
            .upsert(vec![VectorRecord {
                id: id.to_string(),
                values,
                metadata: deal_metadata(result),
            }])
            .await?;

        tracing::info!(deal_id = %id, "stored deal analysis");
        Ok(())
    }

    /// Nearest stored deals to `text`, best first
    pub async fn find_similar(&self, text: &str, top_k: usize) -> Result<Vec<SimilarDeal>> {
        let vector = self.embedder.embed(text).await?;
        let matches = self
            .index
            .query(&vector, top_k, Some(&MetadataFilter::eq("kind", DEAL_KIND)))
            .await?;

        Ok(matches
            .into_iter()
            .map(|mut m| {
                m.metadata.remove(RESULT_JSON_FIELD);
                SimilarDeal::from(m)
            })
            .collect())
    }

    /// Full stored analysis for `id`, when it fit into metadata
    pub async fn get(&self, id: &str) -> Result<Option<AnalysisResult>> {
        let Some(record) = self.index.fetch(id).await? else {
            return Ok(None);
        };

        match record.metadata.get(RESULT_JSON_FIELD).and_then(|v| v.as_str()) {
            Some(serialized) => Ok(Some(serde_json::from_str(serialized)?)),
            None => Ok(None),
        }
    }
}
