use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use clearsignals_memory::IndexStats;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// Presence of each external credential
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub openrouter: bool,
    pub openai: bool,
    pub pinecone: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub services: ServiceStatus,
    pub memory_enabled: bool,
    /// Index statistics; null when memory is disabled or unreachable
    #[schema(value_type = Option<Object>)]
    pub memory: Option<IndexStats>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses((status = 200, description = "Process status", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;

    let memory = match &state.memory {
        Some(memory) => match tokio::time::timeout(STATS_TIMEOUT, memory.stats()).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "memory stats unavailable");
                None
            }
            Err(_) => {
                tracing::warn!("memory stats timed out");
                None
            }
        },
        None => None,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        services: ServiceStatus {
            openrouter: config.openrouter_api_key.is_some(),
            openai: config.openai_api_key.is_some(),
            pinecone: config.pinecone_api_key.is_some(),
        },
        memory_enabled: state.memory.is_some(),
        memory,
    })
}
