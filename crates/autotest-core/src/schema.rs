//! Structured-output contract of the test planner
//!
//! The JSON schema is derived from [`TestSuite`] with schemars, sent to the
//! model as the response format, and enforced again on the answer with
//! jsonschema before serde sees it.

use crate::model::TestSuite;
use jsonschema::JSONSchema;
use serde_json::Value;

/// Errors turning a model answer into a [`TestSuite`]
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Answer is not JSON at all
    #[error("structured output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Generated schema could not be compiled
    #[error("test suite schema failed to compile: {0}")]
    Compile(String),

    /// Answer is JSON but violates the schema
    #[error("structured output violates the test suite schema: {}", .0.join("; "))]
    Violations(Vec<String>),

    /// Schema accepted the answer but it still does not deserialize
    #[error("structured output has an unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// JSON schema of [`TestSuite`]
#[must_use]
pub fn test_suite_schema() -> Value {
    let root = schemars::schema_for!(TestSuite);
    serde_json::to_value(root).unwrap_or(Value::Null)
}

/// Compiled validator for planner answers
pub struct SuiteValidator {
    schema: Value,
    compiled: JSONSchema,
}

impl std::fmt::Debug for SuiteValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteValidator").finish_non_exhaustive()
    }
}

impl SuiteValidator {
    /// Compile the [`TestSuite`] schema
    ///
    /// # Errors
    /// [`SchemaError::Compile`] if the derived schema is rejected.
    pub fn new() -> Result<Self, SchemaError> {
        let schema = test_suite_schema();
        let compiled =
            JSONSchema::compile(&schema).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { schema, compiled })
    }

    /// Schema sent as the response format
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a value against the schema, collecting every violation
    ///
    /// # Errors
    /// [`SchemaError::Violations`] listing `<instance path>: <message>`.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        self.compiled.validate(instance).map_err(|errors| {
            SchemaError::Violations(
                errors
                    .map(|e| format!("{}: {}", e.instance_path, e))
                    .collect(),
            )
        })
    }

    /// Parse and validate a raw JSON answer
    ///
    /// # Errors
    /// Any [`SchemaError`] except `Compile`.
    pub fn parse(&self, raw: &str) -> Result<TestSuite, SchemaError> {
        let value: Value = serde_json::from_str(raw).map_err(SchemaError::InvalidJson)?;
        self.validate(&value)?;
        serde_json::from_value(value).map_err(SchemaError::Shape)
    }
}

/// One-shot [`SuiteValidator::parse`]
///
/// # Errors
/// Any [`SchemaError`].
pub fn parse_test_suite(raw: &str) -> Result<TestSuite, SchemaError> {
    SuiteValidator::new()?.parse(raw)
}
