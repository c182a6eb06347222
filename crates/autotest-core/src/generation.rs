//! Text-generation seams
//!
//! The pipeline never talks to a model directly. Plan goes through a
//! [`TestPlanner`], GenerateSingleTest through a [`TestWriter`]; both are
//! injected into the executor as trait objects.

use crate::error::GenerationError;
use crate::model::TestSuite;
use async_trait::async_trait;
use autotest_extract::FunctionDescriptor;
use serde::Serialize;

/// Docstring placeholder shown to the planner for undocumented functions
pub const NO_DOCSTRING: &str = "No docstring provided.";

/// Everything the planner sees about the target function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    /// Verbatim source of the function
    pub function_code: String,
    /// Pretty JSON object with `docstring` and `signature`
    pub analysis: String,
}

#[derive(Serialize)]
struct PlannerAnalysis<'a> {
    docstring: &'a str,
    signature: &'a str,
}

impl PlanRequest {
    /// Build the planner request from extraction results
    ///
    /// # Errors
    /// Returns the serializer error; not expected for string fields.
    pub fn from_descriptor(
        function_code: impl Into<String>,
        descriptor: &FunctionDescriptor,
    ) -> Result<Self, serde_json::Error> {
        let analysis = serde_json::to_string_pretty(&PlannerAnalysis {
            docstring: descriptor.docstring_or(NO_DOCSTRING),
            signature: &descriptor.signature,
        })?;
        Ok(Self {
            function_code: function_code.into(),
            analysis,
        })
    }
}

/// Everything the writer sees for one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub function_name: String,
    /// Pretty JSON of the case being generated
    pub test_case_json: String,
    /// Compact JSON of the full descriptor
    pub analysis: String,
}

/// Produces a categorized test plan for one function
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestPlanner: Send + Sync {
    /// Plan test cases
    ///
    /// Inputs in the returned suite may still be serialized; the Plan stage
    /// normalizes them.
    async fn plan(&self, request: PlanRequest) -> Result<TestSuite, GenerationError>;
}

/// Writes the pytest code for one test case
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestWriter: Send + Sync {
    /// Return the code of a single test function
    async fn write_test(&self, request: WriteRequest) -> Result<String, GenerationError>;
}
