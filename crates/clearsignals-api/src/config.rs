use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use clearsignals_memory::MemoryConfig;
use clearsignals_types::{ModelCatalog, PipelineConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openrouter_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub pinecone_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Overrides the OpenRouter base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    pub default_model: String,
    pub stage1_model: String,
    pub stage1_max_tokens: u32,
    pub analysis_max_tokens: u32,
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
    /// Extra or replacement catalog entries, key -> provider identifier
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl LlmConfig {
    pub fn catalog(&self) -> ModelCatalog {
        self.models
            .iter()
            .fold(ModelCatalog::new(), |catalog, (key, identifier)| {
                catalog.with_model(key, identifier)
            })
            .with_default_key(self.default_model.to_ascii_lowercase())
            .with_stage1_model(&self.stage1_model)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_stage1_max_tokens(self.stage1_max_tokens)
            .with_analysis_max_tokens(self.analysis_max_tokens)
            .with_fallback(self.enable_fallback)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (`CLEARSIGNALS_SERVER__PORT`, `CLEARSIGNALS_MEMORY__INDEX_NAME`, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CLEARSIGNALS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.load_secrets();
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }

    /// Secrets come from the environment only. Missing ones are not fatal here:
    /// health reports them and requests that need them are rejected.
    fn load_secrets(&mut self) {
        self.openrouter_api_key = secret("OPENROUTER_API_KEY");
        self.openai_api_key = secret("OPENAI_API_KEY");
        self.pinecone_api_key = secret("PINECONE_API_KEY");
    }

    pub fn memory_credentials(&self) -> Option<(&str, &str)> {
        Some((self.openai_api_key.as_deref()?, self.pinecone_api_key.as_deref()?))
    }
}

fn secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:5173"]

        [llm]
        default_model = "Opus"
        stage1_model = "openai/gpt-4o-mini"
        stage1_max_tokens = 2000
        analysis_max_tokens = 6000
        enable_fallback = false

        [llm.models]
        local = "meta/llama-3.1-70b"

        [memory]
        index_name = "test-deals"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.memory.index_name, "test-deals");
        assert_eq!(config.memory.dimension, 1536);
        assert!(config.openrouter_api_key.is_none());
        assert!(config.memory_credentials().is_none());
    }

    #[test]
    fn test_llm_section_drives_catalog_and_budgets() {
        let config: Config = toml::from_str(TOML).unwrap();

        let catalog = config.llm.catalog();
        assert_eq!(catalog.resolve(None).identifier, "anthropic/claude-opus-4");
        assert_eq!(catalog.resolve(Some("local")).identifier, "meta/llama-3.1-70b");
        assert_eq!(catalog.stage1_model(), "openai/gpt-4o-mini");

        let pipeline = config.llm.pipeline_config();
        assert_eq!(pipeline.stage1_max_tokens, 2000);
        assert_eq!(pipeline.analysis_max_tokens, 6000);
        assert!(!pipeline.enable_fallback);
    }

    #[test]
    fn test_default_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.llm.default_model, "sonnet");
        assert_eq!(config.llm.stage1_max_tokens, 4000);
        assert_eq!(config.memory.index_name, "clearsignals-deals");
        assert_eq!(config.memory.remember_timeout_secs, 20);
    }
}
