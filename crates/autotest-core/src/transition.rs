//! Transition evaluator for the generation loop

use crate::state::PipelineState;
use std::fmt;

/// Outcome of the loop guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// At least one case is pending
    ContinueGeneration,
    /// Nothing left; publish the buffer
    Finalize,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContinueGeneration => write!(f, "continue_generation"),
            Self::Finalize => write!(f, "finalize"),
        }
    }
}

/// Continue iff the pending queue exists and is non-empty
#[must_use]
pub fn should_continue_generating(state: &PipelineState) -> Decision {
    if state.pending_len() > 0 {
        Decision::ContinueGeneration
    } else {
        Decision::Finalize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpectedOutcome, TestCase, TestInputs};
    use crate::state::PendingQueue;

    #[test]
    fn absent_queue_finalizes() {
        let state = PipelineState::new("a.py", "f");
        assert_eq!(should_continue_generating(&state), Decision::Finalize);
    }

    #[test]
    fn empty_queue_finalizes() {
        let state = PipelineState::new("a.py", "f").with_queue(PendingQueue::new(), String::new());
        assert_eq!(should_continue_generating(&state), Decision::Finalize);
    }

    #[test]
    fn pending_case_continues() {
        let case = TestCase::new("c", TestInputs::Unresolved, ExpectedOutcome::raises("TypeError"));
        let state = PipelineState::new("a.py", "f").with_queue(im::vector![case], String::new());
        assert_eq!(should_continue_generating(&state), Decision::ContinueGeneration);
    }

    #[test]
    fn decisions_display_as_edge_labels() {
        assert_eq!(Decision::ContinueGeneration.to_string(), "continue_generation");
        assert_eq!(Decision::Finalize.to_string(), "finalize");
    }
}
