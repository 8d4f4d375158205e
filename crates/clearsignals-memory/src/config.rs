use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_NAME: &str = "clearsignals-deals";
pub const DEFAULT_DIMENSION: usize = 1536;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const PINECONE_CONTROL_PLANE: &str = "https://api.pinecone.io";

/// Settings for the deal memory: index identity, embedding model, limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub index_name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub control_plane_url: String,
    pub embedding_model: String,
    /// Embedding input is cut to this many characters
    pub max_input_chars: usize,
    pub similar_top_k: usize,
    pub timeout_secs: u64,
    pub ready_poll_attempts: u32,
    pub ready_poll_interval_ms: u64,
    /// Upper bound on the store-and-lookup done after each analysis
    pub remember_timeout_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            dimension: DEFAULT_DIMENSION,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_plane_url: PINECONE_CONTROL_PLANE.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_input_chars: 8000,
            similar_top_k: 5,
            timeout_secs: 30,
            ready_poll_attempts: 30,
            ready_poll_interval_ms: 2000,
            remember_timeout_secs: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MemoryConfig = serde_json::from_str(r#"{"index_name": "staging-deals"}"#).unwrap();
        assert_eq!(config.index_name, "staging-deals");
        assert_eq!(config.dimension, 1536);
        assert_eq!(config.metric, "cosine");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.remember_timeout_secs, 20);
    }
}
