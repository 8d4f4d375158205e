use clearsignals_types::{AnalysisResult, DealAnalysis, ResolvedModel, Thread};
use serde::{Deserialize, Serialize};

use crate::error::{excerpt, BODY_EXCERPT_CHARS};

/// Which path produced the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineKind {
    #[default]
    #[serde(rename = "two-stage")]
    TwoStage,
    #[serde(rename = "fallback-single")]
    FallbackSingle,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::TwoStage => "two-stage",
            PipelineKind::FallbackSingle => "fallback-single",
        }
    }
}

/// Mutable state threaded through the phases of one run
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub run_id: String,
    pub text: String,
    pub model: ResolvedModel,
    pub kind: PipelineKind,
    pub thread: Option<Thread>,
    pub analysis: Option<DealAnalysis>,
    pub result: Option<AnalysisResult>,
    pub stage1_ms: Option<u64>,
    pub stage2_ms: Option<u64>,
    pub stage1_error: Option<String>,
}

impl PipelineState {
    pub fn new(text: impl Into<String>, model: ResolvedModel) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            model,
            kind: PipelineKind::TwoStage,
            thread: None,
            analysis: None,
            result: None,
            stage1_ms: None,
            stage2_ms: None,
            stage1_error: None,
        }
    }

    pub fn record_stage1_error(&mut self, reason: &str) {
        self.stage1_error = Some(excerpt(reason, BODY_EXCERPT_CHARS));
    }
}

/// Outcome of a successful run, as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub result: AnalysisResult,
    /// Resolved model identifier used for scoring
    pub model: String,
    pub pipeline: PipelineKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage2_ms: Option<u64>,
    pub total_ms: u64,
    pub email_count: usize,
    pub analysis_count: usize,
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1_error: Option<String>,
}
