use std::sync::Arc;

use clearsignals_types::CommunicationProfile;
use serde_json::json;

use crate::error::{MemoryError, Result};
use crate::models::{Metadata, VectorRecord};
use crate::trait_client::{Embedder, VectorIndex};

pub const PROFILE_KIND: &str = "cpp";
const PROFILE_JSON_FIELD: &str = "profile_json";

pub fn profile_id(user_id: &str) -> String {
    format!("{}:{}", PROFILE_KIND, user_id)
}

/// Text embedded for a profile, so profiles are searchable alongside deals
fn profile_text(profile: &CommunicationProfile) -> String {
    let stages = profile
        .deal_stages
        .iter()
        .map(|(stage, count)| format!("{} {}", stage, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Communication profile over {} deals. Average intent {:.1}, average win {:.1}%. \
         Relationship {:?}, trend {:?}. Cultural violations {}, competitive mentions {}. Stages: {}.",
        profile.deal_count,
        profile.avg_intent,
        profile.avg_win_pct,
        profile.relationship_health,
        profile.trend_direction,
        profile.cultural_violation_count,
        profile.competitive_mention_count,
        stages
    )
}

#[derive(Clone)]
pub struct ProfileRepository {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl ProfileRepository {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub async fn store(&self, profile: &CommunicationProfile) -> Result<()> {
        let values = self.embedder.embed(&profile_text(profile)).await?;

        let mut metadata = Metadata::new();
        metadata.insert("kind".into(), json!(PROFILE_KIND));
        metadata.insert("user_id".into(), json!(profile.user_id));
        metadata.insert("deal_count".into(), json!(profile.deal_count));
        metadata.insert("relationship_health".into(), serde_json::to_value(profile.relationship_health)?);
        metadata.insert("trend_direction".into(), serde_json::to_value(profile.trend_direction)?);
        metadata.insert("updated_at".into(), json!(profile.updated_at.to_rfc3339()));
        metadata.insert(PROFILE_JSON_FIELD.into(), json!(serde_json::to_string(profile)?));

        self.index
            .upsert(vec![VectorRecord {
                id: profile_id(&profile.user_id),
                values,
                metadata,
            }])
            .await?;

        tracing::info!(user_id = %profile.user_id, deals = profile.deal_count, "stored communication profile");
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<CommunicationProfile>> {
        let Some(record) = self.index.fetch(&profile_id(user_id)).await? else {
            return Ok(None);
        };

        let serialized = record
            .metadata
            .get(PROFILE_JSON_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| MemoryError::Decode(format!("profile {} has no stored body", user_id)))?;

        Ok(Some(serde_json::from_str(serialized)?))
    }
}
