use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use clearsignals_memory::MemoryReport;
use clearsignals_pipeline::{AnalysisResult, PipelineRun};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;

pub const NO_TEXT: &str = "No email text provided";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Raw pasted email thread
    #[serde(default)]
    pub text: Option<String>,
    /// Model key, e.g. `sonnet`, `opus`, `gpt4o`; unknown keys use the default
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    #[schema(value_type = Object)]
    pub result: AnalysisResult,
    /// Provider identifier that scored the thread
    pub model: String,
    /// `two-stage` or `fallback-single`
    pub pipeline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage1_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage2_ms: Option<u64>,
    pub total_ms: u64,
    pub email_count: usize,
    pub analysis_count: usize,
    /// False when the analysis does not cover every parsed email
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage1_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub memory: Option<MemoryReport>,
}

impl AnalyzeResponse {
    fn new(run: PipelineRun, memory: Option<MemoryReport>) -> Self {
        Self {
            result: run.result,
            model: run.model,
            pipeline: run.pipeline.as_str().to_string(),
            stage1_ms: run.stage1_ms,
            stage2_ms: run.stage2_ms,
            total_ms: run.total_ms,
            email_count: run.email_count,
            analysis_count: run.analysis_count,
            complete: run.complete,
            stage1_error: run.stage1_error,
            memory,
        }
    }
}

/// Score a pasted email thread
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Thread analysed", body = AnalyzeResponse),
        (status = 400, description = "No email text provided", body = ErrorBody),
        (status = 500, description = "Missing credential or unrecovered pipeline error", body = ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest(NO_TEXT.to_string()))?;

    let pipeline = state.pipeline()?;
    let run = pipeline.run(text, request.model.as_deref()).await?;

    let memory = match &state.memory {
        Some(memory) => Some(memory.remember(&run.result).await),
        None => None,
    };

    tracing::info!(
        model = %run.model,
        pipeline = run.pipeline.as_str(),
        email_count = run.email_count,
        analysis_count = run.analysis_count,
        complete = run.complete,
        total_ms = run.total_ms,
        "analysis served"
    );

    Ok(Json(AnalyzeResponse::new(run, memory)))
}
