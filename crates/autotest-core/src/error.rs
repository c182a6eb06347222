//! Error types for the test generation pipeline
//!
//! - [`PipelineError`]: anything that stops a run
//! - [`GenerationError`]: failures of the planner or writer collaborators
//! - [`MalformedTestCaseInput`]: inputs the planner serialized badly

use crate::config::ConfigError;
use crate::graph::Node;
use crate::prompt::PromptError;
use crate::schema::SchemaError;
use autotest_extract::ExtractError;
use std::path::PathBuf;

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Target function absent from the source file
    #[error("function '{function}' not found in '{path}'")]
    NotFound { function: String, path: PathBuf },

    /// Function located but its code could not be recovered
    #[error("function '{function}' could not be extracted")]
    ExtractionFailed { function: String },

    /// Source file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parser setup failure
    #[error("parser error: {0}")]
    Parser(String),

    /// Planner or writer failed
    #[error("{stage} failed: {source}")]
    GenerationFailed {
        stage: Node,
        #[source]
        source: GenerationError,
    },

    /// A stage ran before the field it reads was produced
    #[error("{stage} requires '{field}', which is not set")]
    MissingField { stage: Node, field: &'static str },

    /// GenerateSingleTest reached with nothing left to generate
    #[error("no pending test cases to generate")]
    EmptyQueue,

    /// A pending case still carries serialized inputs
    #[error("test case '{description}' has unparsed inputs")]
    UnresolvedInputs { description: String },

    /// Serializing a test case or descriptor failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create generation failure for a stage
    pub fn generation(stage: Node, source: GenerationError) -> Self {
        Self::GenerationFailed { stage, source }
    }

    /// Create missing field error
    pub fn missing(stage: Node, field: &'static str) -> Self {
        Self::MissingField { stage, field }
    }

    /// Check if the error ends the run
    ///
    /// Fixed policy: the core has no retry path, so this is `true` for every
    /// variant. Callers that retry do so around a whole run.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// Stage the error is attributed to, if known
    #[must_use]
    pub fn stage(&self) -> Option<Node> {
        match self {
            Self::NotFound { .. } | Self::ExtractionFailed { .. } | Self::Io { .. } | Self::Parser(_) => {
                Some(Node::Analyze)
            }
            Self::GenerationFailed { stage, .. } | Self::MissingField { stage, .. } => Some(*stage),
            Self::EmptyQueue | Self::UnresolvedInputs { .. } => Some(Node::GenerateSingleTest),
            Self::Serialization(_) => None,
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Io { path, source } => Self::Io { path, source },
            ExtractError::NotFound { function, path } => Self::NotFound { function, path },
            ExtractError::ExtractionFailed { function } => Self::ExtractionFailed { function },
            ExtractError::Parser(message) => Self::Parser(message),
        }
    }
}

/// Failures of the planner and writer collaborators
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Request never completed
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Service answered with a non-success status
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Response carried no content
    #[error("empty response from model")]
    EmptyResponse,

    /// Structured output did not match the test suite schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Prompt template could not be loaded or rendered
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Collaborator could not be configured
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything else a collaborator reports
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    /// Create free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// A test case whose serialized inputs are not a JSON object
#[derive(Debug, thiserror::Error)]
#[error("malformed test case inputs {input:?}: {source}")]
pub struct MalformedTestCaseInput {
    /// Raw inputs as sent by the planner
    pub input: String,
    #[source]
    pub source: serde_json::Error,
}
