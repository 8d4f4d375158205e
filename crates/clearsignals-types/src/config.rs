use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MODEL_KEY: &str = "sonnet";
pub const STAGE1_MODEL: &str = "anthropic/claude-3.5-haiku";

/// Token budgets and fallback switch for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_stage1_max_tokens")]
    pub stage1_max_tokens: u32,
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
}

fn default_stage1_max_tokens() -> u32 {
    4000
}

fn default_analysis_max_tokens() -> u32 {
    8000
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage1_max_tokens: default_stage1_max_tokens(),
            analysis_max_tokens: default_analysis_max_tokens(),
            enable_fallback: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage1_max_tokens(mut self, tokens: u32) -> Self {
        self.stage1_max_tokens = tokens;
        self
    }

    pub fn with_analysis_max_tokens(mut self, tokens: u32) -> Self {
        self.analysis_max_tokens = tokens;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }
}

/// A catalog key resolved to the identifier sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModel {
    pub key: String,
    pub identifier: String,
}

/// Short model names callers may pass, mapped to provider identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default = "default_models")]
    pub models: BTreeMap<String, String>,
    #[serde(default = "default_key")]
    pub default_key: String,
    #[serde(default = "default_stage1_model")]
    pub stage1_model: String,
}

fn default_models() -> BTreeMap<String, String> {
    [
        ("sonnet", "anthropic/claude-sonnet-4"),
        ("opus", "anthropic/claude-opus-4"),
        ("haiku", "anthropic/claude-3.5-haiku"),
        ("gpt4o", "openai/gpt-4o"),
        ("gemini", "google/gemini-2.5-pro"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_key() -> String {
    DEFAULT_MODEL_KEY.to_string()
}

fn default_stage1_model() -> String {
    STAGE1_MODEL.to_string()
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            models: default_models(),
            default_key: default_key(),
            stage1_model: default_stage1_model(),
        }
    }
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, key: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.models.insert(key.into().to_ascii_lowercase(), identifier.into());
        self
    }

    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = key.into();
        self
    }

    pub fn with_stage1_model(mut self, identifier: impl Into<String>) -> Self {
        self.stage1_model = identifier.into();
        self
    }

    pub fn stage1_model(&self) -> &str {
        &self.stage1_model
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Resolve a caller-supplied key; unknown or missing keys fall back to the default.
    pub fn resolve(&self, key: Option<&str>) -> ResolvedModel {
        let requested = key.map(|k| k.trim().to_ascii_lowercase()).unwrap_or_default();

        if let Some(identifier) = self.models.get(&requested) {
            return ResolvedModel {
                key: requested,
                identifier: identifier.clone(),
            };
        }

        let identifier = self
            .models
            .get(&self.default_key)
            .cloned()
            .unwrap_or_else(|| "anthropic/claude-sonnet-4".to_string());

        ResolvedModel {
            key: self.default_key.clone(),
            identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.resolve(Some("opus")).identifier, "anthropic/claude-opus-4");
        assert_eq!(catalog.resolve(Some(" GPT4O ")).identifier, "openai/gpt-4o");
        assert_eq!(catalog.resolve(Some("gemini")).identifier, "google/gemini-2.5-pro");
    }

    #[test]
    fn test_unknown_and_missing_keys_use_default() {
        let catalog = ModelCatalog::default();
        let unknown = catalog.resolve(Some("llama-70b"));
        assert_eq!(unknown.key, "sonnet");
        assert_eq!(unknown.identifier, "anthropic/claude-sonnet-4");
        assert_eq!(catalog.resolve(None), unknown);
    }

    #[test]
    fn test_overrides() {
        let catalog = ModelCatalog::new()
            .with_model("local", "meta/llama-3")
            .with_default_key("local")
            .with_stage1_model("openai/gpt-4o-mini");

        assert_eq!(catalog.resolve(Some("nope")).identifier, "meta/llama-3");
        assert_eq!(catalog.stage1_model(), "openai/gpt-4o-mini");
        assert_eq!(catalog.keys().count(), 6);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let catalog: ModelCatalog = serde_json::from_str(r#"{"default_key": "haiku"}"#).unwrap();
        assert_eq!(catalog.resolve(None).identifier, STAGE1_MODEL);
        assert_eq!(catalog.stage1_model(), STAGE1_MODEL);

        let pipeline: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(pipeline.stage1_max_tokens, 4000);
        assert_eq!(pipeline.analysis_max_tokens, 8000);
        assert!(pipeline.enable_fallback);
    }
}
