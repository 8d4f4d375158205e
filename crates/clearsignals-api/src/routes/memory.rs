use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use clearsignals_memory::{IndexStats, SimilarDeal};
use clearsignals_types::{AnalysisResult, CommunicationProfile};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;

const MAX_TOP_K: usize = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SimilarRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimilarResponse {
    #[schema(value_type = Vec<Object>)]
    pub matches: Vec<SimilarDeal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<AnalysisResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub stored: bool,
    #[schema(value_type = Object)]
    pub profile: CommunicationProfile,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Nearest stored deals to a piece of text
#[utoipa::path(
    post,
    path = "/api/memory/similar",
    tag = "memory",
    request_body = SimilarRequest,
    responses(
        (status = 200, description = "Nearest deals", body = SimilarResponse),
        (status = 400, description = "No text provided", body = ErrorBody),
        (status = 503, description = "Memory not configured", body = ErrorBody)
    )
)]
pub async fn similar(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimilarRequest>, JsonRejection>,
) -> ApiResult<Json<SimilarResponse>> {
    let memory = state.memory()?;
    let request = json_body(payload)?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }

    let top_k = request
        .top_k
        .unwrap_or(state.config.memory.similar_top_k)
        .clamp(1, MAX_TOP_K);

    let matches = memory.find_similar(text, top_k).await?;
    Ok(Json(SimilarResponse { matches }))
}

/// Aggregate analyses into a communication profile and store it
#[utoipa::path(
    post,
    path = "/api/memory/cpp",
    tag = "memory",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile stored", body = ProfileResponse),
        (status = 400, description = "Missing user id or results", body = ErrorBody),
        (status = 503, description = "Memory not configured", body = ErrorBody)
    )
)]
pub async fn store_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let memory = state.memory()?;
    let request = json_body(payload)?;

    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("No user_id provided".to_string()));
    }

    let profile = memory
        .build_profile(user_id, &request.results)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No analysis results provided".to_string()))?;

    tracing::info!(user_id, deal_count = profile.deal_count, "communication profile stored");

    Ok(Json(ProfileResponse {
        stored: true,
        profile,
    }))
}

#[utoipa::path(
    get,
    path = "/api/memory/cpp/{user_id}",
    tag = "memory",
    params(("user_id" = String, Path, description = "Owner of the profile")),
    responses(
        (status = 200, description = "Stored profile"),
        (status = 404, description = "No profile for this user", body = ErrorBody),
        (status = 503, description = "Memory not configured", body = ErrorBody)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CommunicationProfile>> {
    let memory = state.memory()?;

    memory
        .get_profile(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No profile for user {}", user_id)))
}

#[utoipa::path(
    get,
    path = "/api/memory/stats",
    tag = "memory",
    responses(
        (status = 200, description = "Index statistics"),
        (status = 503, description = "Memory not configured", body = ErrorBody)
    )
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<IndexStats>> {
    let memory = state.memory()?;
    Ok(Json(memory.stats().await?))
}
