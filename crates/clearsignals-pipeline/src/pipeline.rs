use std::sync::Arc;
use std::time::Instant;

use clearsignals_llm::ChatClient;
use clearsignals_types::{ModelCatalog, PipelineConfig};

use crate::error::{PipelineError, Result};
use crate::gateway::ModelGateway;
use crate::node::{Node, Outcome, Phase};
use crate::nodes::{Analyzer, MergeNode, Preprocessor, SingleCallAnalyzer};
use crate::router::{PipelineRouter, Router};
use crate::state::{PipelineRun, PipelineState};

/// Upper bound on phase transitions per run; the happy path takes four
const MAX_STEPS: usize = 8;

pub struct Pipeline {
    gateway: ModelGateway,
    catalog: ModelCatalog,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(client: Arc<dyn ChatClient>, catalog: ModelCatalog, config: PipelineConfig) -> Self {
        Self {
            gateway: ModelGateway::new(client),
            catalog,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::PipelineBuilder {
        crate::builder::PipelineBuilder::new()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze one raw thread. `model_key` is a catalog key; unknown keys use the default model.
    pub async fn run(&self, text: &str, model_key: Option<&str>) -> Result<PipelineRun> {
        let started = Instant::now();
        let mut state = PipelineState::new(text, self.catalog.resolve(model_key));

        let preprocessor = Preprocessor::new(
            self.gateway.clone(),
            self.catalog.stage1_model(),
            self.config.stage1_max_tokens,
        );
        let analyzer = Analyzer::new(self.gateway.clone(), self.config.analysis_max_tokens);
        let single_call = SingleCallAnalyzer::new(self.gateway.clone(), self.config.analysis_max_tokens);
        let router = PipelineRouter::new(self.config.enable_fallback);

        tracing::info!(
            run_id = %state.run_id,
            model = %state.model.identifier,
            chars = text.chars().count(),
            "pipeline run started"
        );

        let mut phase = Phase::Start;
        let mut last_error: Option<PipelineError> = None;

        for _ in 0..MAX_STEPS {
            let node: Option<&dyn Node> = match phase {
                Phase::Start => None,
                Phase::Stage1 => Some(&preprocessor as &dyn Node),
                Phase::Stage2 => Some(&analyzer as &dyn Node),
                Phase::Fallback => Some(&single_call as &dyn Node),
                Phase::Merge => Some(&MergeNode as &dyn Node),
                Phase::Done => return Self::finish(state, started),
                Phase::Failed => {
                    return Err(last_error.unwrap_or_else(|| {
                        PipelineError::Configuration("pipeline failed without an error".to_string())
                    }))
                }
            };

            let outcome = match node {
                None => Outcome::Started,
                Some(node) => match node.execute(&mut state).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        if node.phase() == Phase::Stage1 {
                            tracing::warn!(run_id = %state.run_id, error = %err, "stage 1 failed");
                            state.record_stage1_error(&err.to_string());
                        } else {
                            tracing::error!(run_id = %state.run_id, phase = ?node.phase(), error = %err, "pipeline phase failed");
                        }
                        last_error = Some(err);
                        Outcome::Error
                    }
                },
            };

            if let (Phase::Stage1, Outcome::Parsed { messages: 0 }) = (phase, outcome) {
                tracing::warn!(run_id = %state.run_id, "stage 1 returned no messages");
                state.record_stage1_error("stage 1 returned no messages");
                last_error = Some(PipelineError::Schema {
                    stage: "stage1",
                    message: "thread contained no messages".to_string(),
                });
            }

            let next = router.next(phase, outcome);
            tracing::debug!(run_id = %state.run_id, from = ?phase, to = ?next, "pipeline transition");
            phase = next;
        }

        Err(PipelineError::Configuration(format!(
            "pipeline did not finish within {} steps",
            MAX_STEPS
        )))
    }

    fn finish(state: PipelineState, started: Instant) -> Result<PipelineRun> {
        let result = state.result.ok_or_else(|| {
            PipelineError::Configuration("pipeline finished without a result".to_string())
        })?;

        let email_count = result.email_count();
        let analysis_count = result.analysis_count();
        let total_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            run_id = %state.run_id,
            pipeline = state.kind.as_str(),
            email_count,
            analysis_count,
            total_ms,
            "pipeline run finished"
        );

        Ok(PipelineRun {
            result,
            model: state.model.identifier,
            pipeline: state.kind,
            stage1_ms: state.stage1_ms,
            stage2_ms: state.stage2_ms,
            total_ms,
            email_count,
            analysis_count,
            complete: email_count == analysis_count,
            stage1_error: state.stage1_error,
        })
    }
}
