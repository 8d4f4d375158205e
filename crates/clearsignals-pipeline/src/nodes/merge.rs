use async_trait::async_trait;
use clearsignals_types::AnalysisResult;

use crate::error::{PipelineError, Result};
use crate::node::{Node, Outcome, Phase};
use crate::state::PipelineState;

/// Combines the parsed thread and its scores into the canonical result
pub struct MergeNode;

#[async_trait]
impl Node for MergeNode {
    async fn execute(&self, state: &mut PipelineState) -> Result<Outcome> {
        let (Some(thread), Some(analysis)) = (state.thread.as_ref(), state.analysis.take()) else {
            return Err(PipelineError::Schema {
                stage: "merge",
                message: "missing thread or analysis".to_string(),
            });
        };

        let result = AnalysisResult::merge(thread, analysis);
        if !result.is_complete() {
            tracing::warn!(
                run_id = %state.run_id,
                pipeline = state.kind.as_str(),
                email_count = result.email_count(),
                analysis_count = result.analysis_count(),
                "DataQualityWarning: per-message analysis count does not match message count"
            );
        }

        state.result = Some(result);
        Ok(Outcome::Merged)
    }

    fn phase(&self) -> Phase {
        Phase::Merge
    }
}
