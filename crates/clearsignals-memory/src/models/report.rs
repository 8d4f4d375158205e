use serde::{Deserialize, Serialize};

use super::record::{Match, Metadata};

/// A prior deal returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDeal {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

impl From<Match> for SimilarDeal {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            score: m.score,
            metadata: m.metadata,
        }
    }
}

/// Outcome of storing a fresh analysis and looking up its neighbours.
/// Any failure collapses to `{"stored": false}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub stored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<SimilarDeal>,
}

impl MemoryReport {
    pub fn not_stored() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_as_stored_false_only() {
        let json = serde_json::to_value(MemoryReport::not_stored()).unwrap();
        assert_eq!(json, serde_json::json!({"stored": false}));
    }
}
