//! Pipeline state snapshot
//!
//! A [`PipelineState`] is an owned value. Stages read one snapshot and build
//! the next with the `with_*` helpers below, which consume `self`; the caller
//! clones first, so the snapshot a stage was handed is never touched. The
//! pending queue is an [`im::Vector`], so those clones share structure
//! instead of copying every case.

use crate::model::{TestCase, TestSuite};
use autotest_extract::FunctionDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent queue of cases awaiting generation
pub type PendingQueue = im::Vector<TestCase>;

/// Snapshot of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub(crate) file_path: PathBuf,
    pub(crate) function_name: String,
    pub(crate) function_code: Option<String>,
    pub(crate) analysis: Option<FunctionDescriptor>,
    pub(crate) test_plan: Option<TestSuite>,
    pub(crate) pending_test_cases: Option<PendingQueue>,
    pub(crate) accumulated_code: Option<String>,
    pub(crate) last_processed_case: Option<String>,
    pub(crate) generated_test_code: Option<String>,
    pub(crate) iteration_count: u32,
}

impl PipelineState {
    /// Initial state for a run: everything but the target is unset
    pub fn new(file_path: impl Into<PathBuf>, function_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            function_name: function_name.into(),
            function_code: None,
            analysis: None,
            test_plan: None,
            pending_test_cases: None,
            accumulated_code: None,
            last_processed_case: None,
            generated_test_code: None,
            iteration_count: 0,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn function_code(&self) -> Option<&str> {
        self.function_code.as_deref()
    }

    pub fn analysis(&self) -> Option<&FunctionDescriptor> {
        self.analysis.as_ref()
    }

    pub fn test_plan(&self) -> Option<&TestSuite> {
        self.test_plan.as_ref()
    }

    pub fn pending_test_cases(&self) -> Option<&PendingQueue> {
        self.pending_test_cases.as_ref()
    }

    pub fn accumulated_code(&self) -> Option<&str> {
        self.accumulated_code.as_deref()
    }

    /// Pretty JSON of the case most recently handed to the writer
    pub fn last_processed_case(&self) -> Option<&str> {
        self.last_processed_case.as_deref()
    }

    pub fn generated_test_code(&self) -> Option<&str> {
        self.generated_test_code.as_deref()
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Number of cases still queued; an absent queue counts as empty
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending_test_cases.as_ref().map_or(0, im::Vector::len)
    }

    /// Check if the run has produced its output
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.generated_test_code.is_some()
    }

    pub(crate) fn with_analysis(mut self, descriptor: FunctionDescriptor) -> Self {
        self.function_code = Some(descriptor.code.clone());
        self.analysis = Some(descriptor);
        self.iteration_count = 0;
        self
    }

    pub(crate) fn with_test_plan(mut self, plan: TestSuite) -> Self {
        self.test_plan = Some(plan);
        self.next_iteration()
    }

    pub(crate) fn with_queue(mut self, queue: PendingQueue, seed: String) -> Self {
        self.pending_test_cases = Some(queue);
        self.accumulated_code = Some(seed);
        self.next_iteration()
    }

    pub(crate) fn with_generated_case(
        mut self,
        queue: PendingQueue,
        accumulated: String,
        case_json: String,
    ) -> Self {
        self.pending_test_cases = Some(queue);
        self.accumulated_code = Some(accumulated);
        self.last_processed_case = Some(case_json);
        self.next_iteration()
    }

    pub(crate) fn with_output(mut self, code: String) -> Self {
        self.generated_test_code = Some(code);
        self.next_iteration()
    }

    fn next_iteration(mut self) -> Self {
        self.iteration_count = self.iteration_count.saturating_add(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpectedOutcome, TestInputs};

    fn case(n: i64) -> TestCase {
        TestCase::new(
            format!("case {n}"),
            TestInputs::Resolved(Default::default()),
            ExpectedOutcome::returns(n),
        )
    }

    #[test]
    fn new_state_is_empty() {
        let state = PipelineState::new("src/code.py", "add");
        assert_eq!(state.file_path(), Path::new("src/code.py"));
        assert_eq!(state.function_name(), "add");
        assert_eq!(state.iteration_count(), 0);
        assert_eq!(state.pending_len(), 0);
        assert!(!state.is_finalized());
        assert!(state.analysis().is_none());
    }

    #[test]
    fn clones_do_not_share_queue_mutations() {
        let queue: PendingQueue = (0..3).map(case).collect();
        let original = PipelineState::new("a.py", "f").with_queue(queue, String::new());

        let mut shorter = original.pending_test_cases().cloned().unwrap();
        shorter.pop_front();
        let next = original
            .clone()
            .with_generated_case(shorter, "x".into(), "{}".into());

        assert_eq!(original.pending_len(), 3);
        assert_eq!(next.pending_len(), 2);
        assert_eq!(original.accumulated_code(), Some(""));
    }

    #[test]
    fn counter_increments_per_update() {
        let state = PipelineState::new("a.py", "f")
            .with_test_plan(TestSuite::default())
            .with_queue(PendingQueue::new(), String::new())
            .with_output(String::new());
        assert_eq!(state.iteration_count(), 3);
        assert!(state.is_finalized());
    }

    #[test]
    fn analysis_resets_counter() {
        let mut state = PipelineState::new("a.py", "f");
        state.iteration_count = 7;
        let state = state.with_analysis(FunctionDescriptor::new("def f():\n    pass", "def f():", None));
        assert_eq!(state.iteration_count(), 0);
        assert_eq!(state.function_code(), Some("def f():\n    pass"));
    }

    #[test]
    fn state_round_trips_through_json() {
        let queue: PendingQueue = (0..2).map(case).collect();
        let state = PipelineState::new("a.py", "f").with_queue(queue, "import pytest\n".into());

        let json = serde_json::to_string(&state).unwrap();
        let back: PipelineState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
