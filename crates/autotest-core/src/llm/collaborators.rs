use super::{strip_code_fences, ChatModel, ChatRequest};
use crate::error::GenerationError;
use crate::generation::{PlanRequest, TestPlanner, TestWriter, WriteRequest};
use crate::model::TestSuite;
use crate::prompt::{PromptTemplate, TemplateSource, TEST_PLANNER, TEST_WRITER};
use crate::schema::SuiteValidator;
use async_trait::async_trait;
use std::sync::Arc;

/// Planner asking a chat model for a schema-conforming [`TestSuite`]
pub struct LlmTestPlanner {
    model: Arc<dyn ChatModel>,
    template: PromptTemplate,
    validator: SuiteValidator,
}

impl std::fmt::Debug for LlmTestPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTestPlanner")
            .field("template", &self.template.name())
            .finish_non_exhaustive()
    }
}

impl LlmTestPlanner {
    /// Load the `test_planner` template and compile the answer schema
    ///
    /// # Errors
    /// [`GenerationError::Prompt`] if the template is missing,
    /// [`GenerationError::Schema`] if the schema does not compile.
    pub fn new(model: Arc<dyn ChatModel>, templates: &dyn TemplateSource) -> Result<Self, GenerationError> {
        Ok(Self {
            model,
            template: templates.load(TEST_PLANNER)?,
            validator: SuiteValidator::new()?,
        })
    }
}

#[async_trait]
impl TestPlanner for LlmTestPlanner {
    async fn plan(&self, request: PlanRequest) -> Result<TestSuite, GenerationError> {
        let prompt = self.template.render(&[
            ("function_code", request.function_code.as_str()),
            ("analysis", request.analysis.as_str()),
        ])?;

        let answer = self
            .model
            .complete(ChatRequest::json_schema(
                prompt,
                "TestSuite",
                self.validator.schema().clone(),
            ))
            .await?;
        tracing::debug!("Planner answer: {}", answer);

        Ok(self.validator.parse(&strip_code_fences(&answer))?)
    }
}

/// Writer asking a chat model for one pytest function
pub struct LlmTestWriter {
    model: Arc<dyn ChatModel>,
    template: PromptTemplate,
}

impl std::fmt::Debug for LlmTestWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTestWriter")
            .field("template", &self.template.name())
            .finish_non_exhaustive()
    }
}

impl LlmTestWriter {
    /// Load the `test_writer` template
    ///
    /// # Errors
    /// [`GenerationError::Prompt`] if the template is missing.
    pub fn new(model: Arc<dyn ChatModel>, templates: &dyn TemplateSource) -> Result<Self, GenerationError> {
        Ok(Self {
            model,
            template: templates.load(TEST_WRITER)?,
        })
    }
}

#[async_trait]
impl TestWriter for LlmTestWriter {
    async fn write_test(&self, request: WriteRequest) -> Result<String, GenerationError> {
        let prompt = self.template.render(&[
            ("function_name", request.function_name.as_str()),
            ("test_case_json", request.test_case_json.as_str()),
            ("analysis", request.analysis.as_str()),
        ])?;

        let answer = self.model.complete(ChatRequest::text(prompt)).await?;
        let code = strip_code_fences(&answer);
        if code.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(code)
    }
}
