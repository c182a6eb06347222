//! LLM-backed collaborators
//!
//! [`ChatModel`] is the only seam that talks to a model service; the planner
//! and writer built on it handle templates and answer parsing.

mod collaborators;
mod openai;

pub use collaborators::{LlmTestPlanner, LlmTestWriter};
pub use openai::OpenAiChatModel;

use crate::error::GenerationError;
use async_trait::async_trait;
use serde_json::Value;

/// Shape the answer must take
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free text
    Text,
    /// JSON object conforming to `schema`
    JsonSchema { name: String, schema: Value },
}

/// A single-message completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Rendered prompt, sent as the system message
    pub system: String,
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Free-text request
    pub fn text(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            response_format: ResponseFormat::Text,
        }
    }

    /// Structured request
    pub fn json_schema(system: impl Into<String>, name: impl Into<String>, schema: Value) -> Self {
        Self {
            system: system.into(),
            response_format: ResponseFormat::JsonSchema {
                name: name.into(),
                schema,
            },
        }
    }
}

/// Chat completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the content of the first completion choice
    async fn complete(&self, request: ChatRequest) -> Result<String, GenerationError>;
}

/// Remove a surrounding markdown code fence, if present
///
/// The info string on the opening fence (`python`, `json`) is dropped with
/// it. Text without a fence is trimmed and returned as-is.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_code() {
        let text = "```python\ndef test_add():\n    assert add(1, 2) == 3\n```\n";
        assert_eq!(strip_code_fences(text), "def test_add():\n    assert add(1, 2) == 3");
    }

    #[test]
    fn leaves_plain_text() {
        assert_eq!(strip_code_fences("  def test_x():\n    pass \n"), "def test_x():\n    pass");
    }

    #[test]
    fn handles_bare_fence_without_info() {
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
