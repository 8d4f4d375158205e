use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::MemoryConfig;
use crate::dbs::pinecone::models::{
    CreateIndexRequest, FetchResponse, IndexDescription, IndexList, IndexSpec, QueryRequest,
    QueryResponse, ServerlessSpec, UpsertRequest,
};
use crate::error::{MemoryError, Result};
use crate::models::{IndexStats, Match, MetadataFilter, VectorRecord};
use crate::trait_client::VectorIndex;

const API_VERSION: &str = "2024-07";
const BODY_EXCERPT_CHARS: usize = 300;

/// Pinecone serverless index over REST.
///
/// The data-plane host is resolved on first use (listing indexes, creating
/// the index when absent) and cached for the life of the process.
pub struct PineconeIndex {
    http: reqwest::Client,
    config: MemoryConfig,
    host: OnceCell<String>,
}

impl PineconeIndex {
    pub fn new(api_key: &str, config: MemoryConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(MemoryError::Configuration("Pinecone API key is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key)
                .map_err(|_| MemoryError::Configuration("Invalid Pinecone API key format".to_string()))?,
        );
        headers.insert("X-Pinecone-API-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            host: OnceCell::new(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn control_url(&self, path: &str) -> String {
        format!("{}{}", self.config.control_plane_url.trim_end_matches('/'), path)
    }

    async fn data_url(&self, path: &str) -> Result<String> {
        let host = self.host.get_or_try_init(|| self.resolve_host()).await?;
        Ok(format!("{}{}", host, path))
    }

    /// Find the index host, creating the index if it does not exist yet
    async fn resolve_host(&self) -> Result<String> {
        let list: IndexList = self.get(&self.control_url("/indexes")).await?;

        let description = match list
            .indexes
            .into_iter()
            .find(|i| i.name == self.config.index_name)
        {
            Some(existing) => existing,
            None => self.create_index().await?,
        };

        let description = if description.is_ready() && description.usable_host().is_some() {
            description
        } else {
            self.wait_until_ready().await?
        };

        let host = description
            .usable_host()
            .ok_or_else(|| MemoryError::Decode("index description has no host".to_string()))?;

        Ok(normalize_host(host))
    }

    async fn create_index(&self) -> Result<IndexDescription> {
        tracing::info!(
            index = %self.config.index_name,
            dimension = self.config.dimension,
            "creating Pinecone index"
        );

        let request = CreateIndexRequest {
            name: &self.config.index_name,
            dimension: self.config.dimension,
            metric: &self.config.metric,
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &self.config.cloud,
                    region: &self.config.region,
                },
            },
        };

        self.post(&self.control_url("/indexes"), &request).await
    }

    async fn wait_until_ready(&self) -> Result<IndexDescription> {
        let url = self.control_url(&format!("/indexes/{}", self.config.index_name));
        let interval = Duration::from_millis(self.config.ready_poll_interval_ms);

        for attempt in 1..=self.config.ready_poll_attempts.max(1) {
            let description: IndexDescription = self.get(&url).await?;
            if description.is_ready() && description.usable_host().is_some() {
                return Ok(description);
            }
            tracing::debug!(index = %self.config.index_name, attempt, "waiting for index to become ready");
            tokio::time::sleep(interval).await;
        }

        Err(MemoryError::Configuration(format!(
            "index {} did not become ready",
            self.config.index_name
        )))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = match text.char_indices().nth(BODY_EXCERPT_CHARS) {
                Some((cut, _)) => text[..cut].to_string(),
                None => text,
            };
            return Err(MemoryError::Index {
                status: status.as_u16(),
                body,
            });
        }

        // upsert answers with a bare count; an empty body decodes as `{}`
        let text = if text.trim().is_empty() { "{}".to_string() } else { text };
        serde_json::from_str(&text).map_err(MemoryError::from)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let url = self.data_url("/vectors/upsert").await?;
        let count = records.len();
        let _: serde_json::Value = self.post(&url, &UpsertRequest { vectors: records }).await?;
        tracing::debug!(count, "upserted vectors");
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Match>> {
        let url = self.data_url("/query").await?;
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter: filter.map(MetadataFilter::to_pinecone),
        };
        let response: QueryResponse = self.post(&url, &request).await?;
        Ok(response.matches)
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>> {
        let url = self.data_url("/vectors/fetch").await?;
        let response = self.http.get(&url).query(&[("ids", id)]).send().await?;
        let mut fetched: FetchResponse = Self::decode(response).await?;
        Ok(fetched.vectors.remove(id))
    }

    async fn stats(&self) -> Result<IndexStats> {
        let url = self.data_url("/describe_index_stats").await?;
        self.post(&url, &serde_json::json!({})).await
    }
}
