//! Pipeline graph and executor
//!
//! The graph is a static transition table over [`Node`]. The executor runs
//! the stage of the current node, replaces its state with the returned
//! snapshot, then resolves the outgoing [`Edge`]. Only
//! [`Node::PrepareIteration`] and [`Node::GenerateSingleTest`] branch, both
//! through [`should_continue_generating`].

use crate::error::PipelineError;
use crate::generation::{TestPlanner, TestWriter};
use crate::stages;
use crate::state::PipelineState;
use crate::transition::{should_continue_generating, Decision};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Pipeline node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Analyze,
    Plan,
    PrepareIteration,
    GenerateSingleTest,
    Finalize,
    /// Terminal sink; runs nothing
    Done,
}

/// Outgoing edge of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Unconditional successor
    Fixed(Node),
    /// Successor chosen by the loop guard
    Guarded { on_continue: Node, on_finalize: Node },
    /// No successor
    Terminal,
}

impl Node {
    /// Entry point of every run
    pub const ENTRY: Self = Self::Analyze;

    /// All nodes in declaration order
    pub const ALL: [Self; 6] = [
        Self::Analyze,
        Self::Plan,
        Self::PrepareIteration,
        Self::GenerateSingleTest,
        Self::Finalize,
        Self::Done,
    ];

    /// Transition table
    #[must_use]
    pub const fn edge(self) -> Edge {
        match self {
            Self::Analyze => Edge::Fixed(Self::Plan),
            Self::Plan => Edge::Fixed(Self::PrepareIteration),
            Self::PrepareIteration | Self::GenerateSingleTest => Edge::Guarded {
                on_continue: Self::GenerateSingleTest,
                on_finalize: Self::Finalize,
            },
            Self::Finalize => Edge::Fixed(Self::Done),
            Self::Done => Edge::Terminal,
        }
    }

    /// Stable node name, used in logs and the Mermaid rendering
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analyze => "analyze_function",
            Self::Plan => "plan_tests",
            Self::PrepareIteration => "prepare_iteration",
            Self::GenerateSingleTest => "generate_single_test",
            Self::Finalize => "finalize_file",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Edge {
    /// Resolve the successor for a freshly produced state
    #[must_use]
    pub fn next(self, state: &PipelineState) -> Option<Node> {
        match self {
            Self::Fixed(node) => Some(node),
            Self::Guarded {
                on_continue,
                on_finalize,
            } => Some(match should_continue_generating(state) {
                Decision::ContinueGeneration => on_continue,
                Decision::Finalize => on_finalize,
            }),
            Self::Terminal => None,
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Stages executed, in order
    pub visited: Vec<Node>,
    /// Number of GenerateSingleTest executions
    pub generation_steps: usize,
    pub elapsed_ms: u64,
}

/// Final state plus run summary
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    pub summary: RunSummary,
}

/// Drives a [`PipelineState`] through the graph
///
/// Collaborators are injected once and shared by every run.
#[derive(Clone)]
pub struct GraphExecutor {
    planner: Arc<dyn TestPlanner>,
    writer: Arc<dyn TestWriter>,
}

impl fmt::Debug for GraphExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphExecutor").finish_non_exhaustive()
    }
}

impl GraphExecutor {
    /// Create a new executor
    pub fn new(planner: Arc<dyn TestPlanner>, writer: Arc<dyn TestWriter>) -> Self {
        Self { planner, writer }
    }

    /// Run one node's stage against a snapshot
    ///
    /// [`Node::Done`] returns the snapshot unchanged.
    ///
    /// # Errors
    /// Whatever the stage returns.
    pub async fn execute_stage(
        &self,
        node: Node,
        state: &PipelineState,
    ) -> Result<PipelineState, PipelineError> {
        match node {
            Node::Analyze => stages::analyze(state),
            Node::Plan => stages::plan(state, self.planner.as_ref()).await,
            Node::PrepareIteration => stages::prepare_iteration(state),
            Node::GenerateSingleTest => {
                stages::generate_single_test(state, self.writer.as_ref()).await
            }
            Node::Finalize => stages::finalize(state),
            Node::Done => Ok(state.clone()),
        }
    }

    /// Begin a stepwise run
    ///
    /// A state that is already finalized starts at [`Node::Done`].
    pub fn start(&self, initial: PipelineState) -> PipelineRun<'_> {
        let current = if initial.is_finalized() {
            tracing::info!("State already finalized, nothing to run");
            Node::Done
        } else {
            Node::ENTRY
        };
        PipelineRun {
            executor: self,
            current,
            state: initial,
            summary: RunSummary::default(),
            started: Instant::now(),
        }
    }

    /// Run a state to completion
    ///
    /// # Errors
    /// The first stage error; the run stops there.
    pub async fn run(&self, initial: PipelineState) -> Result<PipelineOutcome, PipelineError> {
        let mut run = self.start(initial);
        while !run.is_done() {
            run.step().await?;
        }
        let outcome = run.into_outcome();
        tracing::info!(
            "Pipeline finished: {} stages, {} tests generated in {} ms",
            outcome.summary.visited.len(),
            outcome.summary.generation_steps,
            outcome.summary.elapsed_ms
        );
        Ok(outcome)
    }

    /// Mermaid flowchart text of the transition table
    #[must_use]
    pub fn mermaid() -> String {
        let mut lines = vec![
            "flowchart TD".to_string(),
            format!("    __start__([start]) --> {}", Node::ENTRY),
        ];
        for node in Node::ALL {
            match node.edge() {
                Edge::Fixed(next) => lines.push(format!("    {node} --> {next}")),
                Edge::Guarded {
                    on_continue,
                    on_finalize,
                } => {
                    lines.push(format!("    {node} -->|{}| {on_continue}", Decision::ContinueGeneration));
                    lines.push(format!("    {node} -->|{}| {on_finalize}", Decision::Finalize));
                }
                Edge::Terminal => lines.push(format!("    {node} --> __end__([end])")),
            }
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// A run in progress
///
/// Dropping it between steps cancels the run; the last completed snapshot is
/// available through [`PipelineRun::state`].
#[derive(Debug)]
pub struct PipelineRun<'e> {
    executor: &'e GraphExecutor,
    current: Node,
    state: PipelineState,
    summary: RunSummary,
    started: Instant,
}

impl PipelineRun<'_> {
    /// Node that the next [`step`](Self::step) will execute
    pub fn current(&self) -> Node {
        self.current
    }

    /// Latest committed snapshot
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn is_done(&self) -> bool {
        self.current == Node::Done
    }

    /// Execute the current node and advance
    ///
    /// On error the committed snapshot stays the one before the failed
    /// stage and the run does not advance.
    ///
    /// # Errors
    /// The stage error.
    pub async fn step(&mut self) -> Result<Node, PipelineError> {
        if self.is_done() {
            return Ok(Node::Done);
        }

        let node = self.current;
        tracing::debug!("Entering stage {}", node);
        let next_state = self.executor.execute_stage(node, &self.state).await?;

        let next = node.edge().next(&next_state).unwrap_or(Node::Done);
        self.state = next_state;
        self.summary.visited.push(node);
        if node == Node::GenerateSingleTest {
            self.summary.generation_steps += 1;
        }
        tracing::debug!("Stage {} complete, next {}", node, next);

        self.current = next;
        Ok(next)
    }

    /// Consume the run, stamping the elapsed time
    pub fn into_outcome(mut self) -> PipelineOutcome {
        self.summary.elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        PipelineOutcome {
            state: self.state,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{MockTestPlanner, MockTestWriter};
    use crate::model::{ExpectedOutcome, TestCase, TestInputs, TestSuite};
    use crate::state::PendingQueue;

    fn executor(planner: MockTestPlanner, writer: MockTestWriter) -> GraphExecutor {
        GraphExecutor::new(Arc::new(planner), Arc::new(writer))
    }

    #[test]
    fn table_branches_only_in_loop() {
        assert_eq!(Node::Analyze.edge(), Edge::Fixed(Node::Plan));
        assert_eq!(Node::Finalize.edge(), Edge::Fixed(Node::Done));
        assert_eq!(Node::Done.edge(), Edge::Terminal);
        assert!(matches!(Node::PrepareIteration.edge(), Edge::Guarded { .. }));
        assert_eq!(Node::PrepareIteration.edge(), Node::GenerateSingleTest.edge());
    }

    #[test]
    fn guarded_edge_follows_queue() {
        let edge = Node::GenerateSingleTest.edge();
        let empty = PipelineState::new("a.py", "f").with_queue(PendingQueue::new(), String::new());
        assert_eq!(edge.next(&empty), Some(Node::Finalize));

        let case = TestCase::new("c", TestInputs::Unresolved, ExpectedOutcome::returns(1));
        let busy = PipelineState::new("a.py", "f").with_queue(im::vector![case], String::new());
        assert_eq!(edge.next(&busy), Some(Node::GenerateSingleTest));
    }

    #[test]
    fn mermaid_lists_every_edge() {
        let text = GraphExecutor::mermaid();
        assert!(text.starts_with("flowchart TD\n"));
        assert!(text.contains("analyze_function --> plan_tests"));
        assert!(text.contains("prepare_iteration -->|continue_generation| generate_single_test"));
        assert!(text.contains("generate_single_test -->|finalize| finalize_file"));
        assert!(text.contains("finalize_file --> done"));
        assert!(text.ends_with("    done --> __end__([end])\n"));
        assert_eq!(text.lines().count(), 9);
    }

    #[tokio::test]
    async fn finalized_state_runs_nothing() {
        let exec = executor(MockTestPlanner::new(), MockTestWriter::new());
        let state = PipelineState::new("a.py", "f")
            .with_queue(PendingQueue::new(), "x".into())
            .with_output("x".into());

        let outcome = exec.run(state.clone()).await.unwrap();
        assert_eq!(outcome.state, state);
        assert!(outcome.summary.visited.is_empty());
    }

    #[tokio::test]
    async fn failed_step_keeps_committed_state() {
        let mut planner = MockTestPlanner::new();
        planner.expect_plan().never();
        let exec = executor(planner, MockTestWriter::new());

        let initial = PipelineState::new("definitely/missing.py", "f");
        let mut run = exec.start(initial.clone());
        assert!(run.step().await.is_err());
        assert_eq!(run.current(), Node::Analyze);
        assert_eq!(run.state(), &initial);
    }

    #[tokio::test]
    async fn empty_plan_goes_straight_to_finalize() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        write!(file, "def f():\n    return 1\n").unwrap();

        let mut planner = MockTestPlanner::new();
        planner.expect_plan().returning(|_| Ok(TestSuite::default()));
        let mut writer = MockTestWriter::new();
        writer.expect_write_test().never();

        let outcome = executor(planner, writer)
            .run(PipelineState::new(file.path(), "f"))
            .await
            .unwrap();
        assert_eq!(
            outcome.summary.visited,
            vec![Node::Analyze, Node::Plan, Node::PrepareIteration, Node::Finalize]
        );
        assert_eq!(outcome.state.iteration_count(), 3);
        assert_eq!(
            outcome.state.generated_test_code(),
            outcome.state.accumulated_code()
        );
    }
}
