use async_trait::async_trait;
use clearsignals_types::{DealAnalysis, Thread};

use crate::error::{PipelineError, Result};
use crate::gateway::ModelGateway;
use crate::node::{Node, Outcome, Phase};
use crate::prompts;
use crate::state::{PipelineKind, PipelineState};

pub const STAGE: &str = "single-call";

/// Parse and score raw text in one call; the substitute when Stage 1 yields nothing
pub struct SingleCallAnalyzer {
    gateway: ModelGateway,
    max_tokens: u32,
}

impl SingleCallAnalyzer {
    pub fn new(gateway: ModelGateway, max_tokens: u32) -> Self {
        Self { gateway, max_tokens }
    }

    /// One object carries both the segmented thread and the scores
    async fn analyze(&self, raw_text: &str, model: &str) -> Result<(Thread, DealAnalysis)> {
        let invocation = self
            .gateway
            .invoke(
                model,
                &prompts::single_call_system(),
                &prompts::single_call_user(raw_text),
                self.max_tokens,
            )
            .await?;

        let mut thread: Thread = serde_json::from_value(invocation.value.clone())
            .map_err(|e| PipelineError::schema(STAGE, e))?;
        thread.renumber();

        let analysis: DealAnalysis = serde_json::from_value(invocation.value)
            .map_err(|e| PipelineError::schema(STAGE, e))?;

        Ok((thread, analysis))
    }
}

#[async_trait]
impl Node for SingleCallAnalyzer {
    async fn execute(&self, state: &mut PipelineState) -> Result<Outcome> {
        state.kind = PipelineKind::FallbackSingle;

        let (thread, analysis) = self
            .analyze(&state.text, &state.model.identifier)
            .await?;
        tracing::info!(
            run_id = %state.run_id,
            messages = thread.len(),
            per_message = analysis.per_message.len(),
            "single-call analysis completed"
        );

        state.thread = Some(thread);
        state.analysis = Some(analysis);
        Ok(Outcome::Analysed)
    }

    fn phase(&self) -> Phase {
        Phase::Fallback
    }
}
