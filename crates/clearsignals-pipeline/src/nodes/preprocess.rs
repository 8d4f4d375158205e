use std::time::Instant;

use async_trait::async_trait;
use clearsignals_types::Thread;

use crate::error::{PipelineError, Result};
use crate::gateway::ModelGateway;
use crate::node::{Node, Outcome, Phase};
use crate::prompts;
use crate::state::PipelineState;

pub const STAGE: &str = "stage1";

/// Stage 1: splits raw pasted text into clean, numbered messages on a cheap model
pub struct Preprocessor {
    gateway: ModelGateway,
    model: String,
    max_tokens: u32,
}

impl Preprocessor {
    pub fn new(gateway: ModelGateway, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            gateway,
            model: model.into(),
            max_tokens,
        }
    }

    pub async fn preprocess(&self, raw_text: &str) -> Result<Thread> {
        let invocation = self
            .gateway
            .invoke(
                &self.model,
                prompts::STAGE1_SYSTEM,
                &prompts::stage1_user(raw_text),
                self.max_tokens,
            )
            .await?;

        let mut thread: Thread = serde_json::from_value(invocation.value)
            .map_err(|e| PipelineError::schema(STAGE, e))?;
        thread.renumber();

        Ok(thread)
    }
}

#[async_trait]
impl Node for Preprocessor {
    async fn execute(&self, state: &mut PipelineState) -> Result<Outcome> {
        let started = Instant::now();
        let result = self.preprocess(&state.text).await;
        state.stage1_ms = Some(started.elapsed().as_millis() as u64);

        let thread = result?;
        let messages = thread.len();
        tracing::info!(run_id = %state.run_id, messages, "stage 1 parsed thread");

        state.thread = Some(thread);
        Ok(Outcome::Parsed { messages })
    }

    fn phase(&self) -> Phase {
        Phase::Stage1
    }
}
