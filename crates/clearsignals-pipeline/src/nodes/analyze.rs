use std::time::Instant;

use async_trait::async_trait;
use clearsignals_types::{DealAnalysis, Thread};

use crate::error::{PipelineError, Result};
use crate::gateway::ModelGateway;
use crate::node::{Node, Outcome, Phase};
use crate::prompts;
use crate::state::PipelineState;

pub const STAGE: &str = "stage2";

/// Stage 2: scores an already segmented thread with the caller's model
pub struct Analyzer {
    gateway: ModelGateway,
    max_tokens: u32,
}

impl Analyzer {
    pub fn new(gateway: ModelGateway, max_tokens: u32) -> Self {
        Self { gateway, max_tokens }
    }

    /// The expected count goes into the prompt; the reply is not checked against it here
    pub async fn analyze(&self, thread: &Thread, expected_count: usize, model: &str) -> Result<DealAnalysis> {
        let invocation = self
            .gateway
            .invoke(
                model,
                &prompts::analysis_system(),
                &prompts::analysis_user(&thread.transcript(), expected_count),
                self.max_tokens,
            )
            .await?;

        serde_json::from_value(invocation.value).map_err(|e| PipelineError::schema(STAGE, e))
    }
}

#[async_trait]
impl Node for Analyzer {
    async fn execute(&self, state: &mut PipelineState) -> Result<Outcome> {
        let thread = state.thread.as_ref().ok_or_else(|| PipelineError::Schema {
            stage: STAGE,
            message: "no parsed thread to analyze".to_string(),
        })?;

        let started = Instant::now();
        let result = self
            .analyze(thread, thread.len(), &state.model.identifier)
            .await;
        state.stage2_ms = Some(started.elapsed().as_millis() as u64);

        let analysis = result?;
        tracing::info!(
            run_id = %state.run_id,
            per_message = analysis.per_message.len(),
            "stage 2 scored thread"
        );

        state.analysis = Some(analysis);
        Ok(Outcome::Analysed)
    }

    fn phase(&self) -> Phase {
        Phase::Stage2
    }
}
