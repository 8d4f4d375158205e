use crate::node::{Outcome, Phase};

/// Decides which phase runs next from the phase that just ran and its outcome
pub trait Router: Send + Sync {
    fn next(&self, current: Phase, outcome: Outcome) -> Phase;
}

/// Two-stage router: Stage1 -> Stage2 -> Merge, with a one-shot
/// substitution of the single-call analyzer when Stage1 yields nothing.
#[derive(Debug, Clone, Copy)]
pub struct PipelineRouter {
    fallback_enabled: bool,
}

impl PipelineRouter {
    pub fn new(fallback_enabled: bool) -> Self {
        Self { fallback_enabled }
    }

    fn fallback(&self) -> Phase {
        if self.fallback_enabled {
            Phase::Fallback
        } else {
            Phase::Failed
        }
    }
}

impl Default for PipelineRouter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Router for PipelineRouter {
    fn next(&self, current: Phase, outcome: Outcome) -> Phase {
        match (current, outcome) {
            (Phase::Start, Outcome::Started) => Phase::Stage1,

            (Phase::Stage1, Outcome::Parsed { messages: 0 }) => self.fallback(),
            (Phase::Stage1, Outcome::Parsed { .. }) => Phase::Stage2,
            (Phase::Stage1, Outcome::Error) => self.fallback(),

            (Phase::Stage2, Outcome::Analysed) => Phase::Merge,
            (Phase::Fallback, Outcome::Analysed) => Phase::Merge,

            (Phase::Merge, Outcome::Merged) => Phase::Done,

            (Phase::Done, _) => Phase::Done,
            _ => Phase::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let router = PipelineRouter::default();
        assert_eq!(router.next(Phase::Start, Outcome::Started), Phase::Stage1);
        assert_eq!(router.next(Phase::Stage1, Outcome::Parsed { messages: 3 }), Phase::Stage2);
        assert_eq!(router.next(Phase::Stage2, Outcome::Analysed), Phase::Merge);
        assert_eq!(router.next(Phase::Merge, Outcome::Merged), Phase::Done);
    }

    #[test]
    fn test_stage1_problems_fall_back() {
        let router = PipelineRouter::default();
        assert_eq!(router.next(Phase::Stage1, Outcome::Parsed { messages: 0 }), Phase::Fallback);
        assert_eq!(router.next(Phase::Stage1, Outcome::Error), Phase::Fallback);
        assert_eq!(router.next(Phase::Fallback, Outcome::Analysed), Phase::Merge);
    }

    #[test]
    fn test_later_errors_are_fatal() {
        let router = PipelineRouter::default();
        assert_eq!(router.next(Phase::Stage2, Outcome::Error), Phase::Failed);
        assert_eq!(router.next(Phase::Fallback, Outcome::Error), Phase::Failed);
        assert_eq!(router.next(Phase::Fallback, Outcome::Parsed { messages: 0 }), Phase::Failed);
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let router = PipelineRouter::new(false);
        assert_eq!(router.next(Phase::Stage1, Outcome::Error), Phase::Failed);
        assert_eq!(router.next(Phase::Stage1, Outcome::Parsed { messages: 0 }), Phase::Failed);
    }

    #[test]
    fn test_terminal_phases_stay_put() {
        let router = PipelineRouter::default();
        assert_eq!(router.next(Phase::Done, Outcome::Started), Phase::Done);
        assert_eq!(router.next(Phase::Failed, Outcome::Started), Phase::Failed);
    }
}
