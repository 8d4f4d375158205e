use async_trait::async_trait;

use crate::error::Result;
use crate::state::PipelineState;

/// Core abstraction for one step of a pipeline run
#[async_trait]
pub trait Node: Send + Sync {
    /// Run the step against the shared run state and report what happened
    async fn execute(&self, state: &mut PipelineState) -> Result<Outcome>;

    fn phase(&self) -> Phase;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Stage1,
    Stage2,
    Fallback,
    Merge,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

/// What a phase produced; the router maps (phase, outcome) to the next phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Started,
    Parsed { messages: usize },
    Analysed,
    Merged,
    Error,
}
