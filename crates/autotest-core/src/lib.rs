//! autotest Core - Test Generation Pipeline
//!
//! Derives a pytest module for one target function by running a fixed graph
//! of stages over an immutable state snapshot:
//!
//! ```text
//! Analyze → Plan → PrepareIteration ─┬─ continue ─→ GenerateSingleTest ─┐
//!                                    │                 ↑    (loop)     │
//!                                    │                 └── continue ───┤
//!                                    └─ finalize ─→ Finalize ←─────────┘
//!                                                      ↓
//!                                                     Done
//! ```
//!
//! - **Analyze** extracts the function through `autotest-extract`
//! - **Plan** asks a [`TestPlanner`] for a [`TestSuite`] and normalizes inputs
//! - **PrepareIteration** flattens the suite into the pending queue and seeds imports
//! - **GenerateSingleTest** pops one case and asks a [`TestWriter`] for its code
//! - **Finalize** publishes the accumulated module
//!
//! Every stage takes `&PipelineState` and returns a new state; no stage can
//! mutate the snapshot it was handed.
//!
//! # Example
//!
//! ```rust,ignore
//! use autotest_core::{GraphExecutor, PipelineState};
//!
//! # async fn example(planner: Arc<dyn TestPlanner>, writer: Arc<dyn TestWriter>) -> Result<(), Box<dyn std::error::Error>> {
//! let executor = GraphExecutor::new(planner, writer);
//! let outcome = executor
//!     .run(PipelineState::new("example_code/code.py", "add"))
//!     .await?;
//!
//! println!("{}", outcome.state.generated_test_code().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod generation;
pub mod graph;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod schema;
pub mod stages;
pub mod state;
pub mod transition;

// Re-exports for convenience
pub use config::{AutotestConfig, ConfigError};
pub use error::{GenerationError, MalformedTestCaseInput, PipelineError};
pub use generation::{PlanRequest, TestPlanner, TestWriter, WriteRequest};
pub use graph::{Edge, GraphExecutor, Node, PipelineOutcome, PipelineRun, RunSummary};
pub use llm::{ChatModel, ChatRequest, LlmTestPlanner, LlmTestWriter, OpenAiChatModel, ResponseFormat};
pub use model::{
    ExpectedError, ExpectedOutcome, ExpectedReturn, PlanValue, Primitive, TestCase, TestInputs,
    TestSuite,
};
pub use prompt::{DirectoryTemplates, InMemoryTemplates, PromptError, PromptTemplate, TemplateSource};
pub use schema::{SchemaError, SuiteValidator};
pub use state::{PendingQueue, PipelineState};
pub use transition::{should_continue_generating, Decision};

pub use autotest_extract::FunctionDescriptor;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the pipeline
    pub use crate::{
        Decision, GraphExecutor, Node, PipelineError, PipelineState, TestCase, TestPlanner,
        TestSuite, TestWriter,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
