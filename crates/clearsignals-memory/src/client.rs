use std::sync::Arc;
use std::time::Duration;

use clearsignals_types::{AnalysisResult, CommunicationProfile};

use crate::error::Result;
use crate::models::{IndexStats, MemoryReport, SimilarDeal};
use crate::repositories::{DealRepository, ProfileRepository};
use crate::trait_client::{Embedder, VectorIndex};

pub const DEFAULT_SIMILAR_TOP_K: usize = 5;
pub const DEFAULT_REMEMBER_TIMEOUT: Duration = Duration::from_secs(20);

/// Deal memory: stores analysed deals and communication profiles in one vector index
pub struct DealMemory {
    deals: DealRepository,
    profiles: ProfileRepository,
    index: Arc<dyn VectorIndex>,
    similar_top_k: usize,
    remember_timeout: Duration,
}

impl DealMemory {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            deals: DealRepository::new(Arc::clone(&embedder), Arc::clone(&index)),
            profiles: ProfileRepository::new(embedder, Arc::clone(&index)),
            index,
            similar_top_k: DEFAULT_SIMILAR_TOP_K,
            remember_timeout: DEFAULT_REMEMBER_TIMEOUT,
        }
    }

    pub fn builder() -> crate::builder::DealMemoryBuilder {
        crate::builder::DealMemoryBuilder::new()
    }

    pub fn with_similar_top_k(mut self, top_k: usize) -> Self {
        self.similar_top_k = top_k;
        self
    }

    pub fn with_remember_timeout(mut self, timeout: Duration) -> Self {
        self.remember_timeout = timeout;
        self
    }

    pub fn deals(&self) -> &DealRepository {
        &self.deals
    }

    pub fn profiles(&self) -> &ProfileRepository {
        &self.profiles
    }

    pub async fn store_deal(&self, id: &str, result: &AnalysisResult) -> Result<()> {
        self.deals.store(id, result).await
    }

    pub async fn find_similar(&self, text: &str, top_k: usize) -> Result<Vec<SimilarDeal>> {
        self.deals.find_similar(text, top_k).await
    }

    pub async fn store_profile(&self, profile: &CommunicationProfile) -> Result<()> {
        self.profiles.store(profile).await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<CommunicationProfile>> {
        self.profiles.get(user_id).await
    }

    /// Aggregate `results` into a profile and store it. `None` when there is nothing to aggregate.
    pub async fn build_profile(
        &self,
        user_id: &str,
        results: &[AnalysisResult],
    ) -> Result<Option<CommunicationProfile>> {
        let Some(profile) = CommunicationProfile::build(user_id, results) else {
            return Ok(None);
        };
        self.profiles.store(&profile).await?;
        Ok(Some(profile))
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.index.stats().await
    }

    /// Store a fresh analysis under a new id and look up its nearest prior deals.
    ///
    /// Both calls run concurrently under the remember timeout; any failure
    /// or an elapsed timeout yields `{stored: false}`.
    pub async fn remember(&self, result: &AnalysisResult) -> MemoryReport {
        let id = uuid::Uuid::new_v4().to_string();
        let fingerprint = result.fingerprint();
        let top_k = self.similar_top_k;

        let joined = tokio::time::timeout(self.remember_timeout, async {
            tokio::join!(
                self.deals.store(&id, result),
                self.deals.find_similar(&fingerprint, top_k + 1)
            )
        })
        .await;

        let Ok((stored, similar)) = joined else {
            tracing::warn!(
                timeout_ms = self.remember_timeout.as_millis() as u64,
                "deal memory timed out, analysis not stored"
            );
            return MemoryReport::not_stored();
        };

        match (stored, similar) {
            (Ok(()), Ok(similar)) => {
                let similar: Vec<SimilarDeal> = similar
                    .into_iter()
                    .filter(|s| s.id != id)
                    .take(top_k)
                    .collect();
                MemoryReport {
                    stored: true,
                    id: Some(id),
                    similar,
                }
            }
            (stored, similar) => {
                if let Err(e) = stored {
                    tracing::warn!(error = %e, "failed to store deal in memory");
                }
                if let Err(e) = similar {
                    tracing::warn!(error = %e, "similar-deal lookup failed");
                }
                MemoryReport::not_stored()
            }
        }
    }
}
