//! Extraction result

use serde::{Deserialize, Serialize};

/// Structured description of one extracted function
///
/// Produced once by the extractor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Verbatim source of the definition, decorators included
    pub code: String,

    /// Normalized `def name(params):` rendering
    pub signature: String,

    /// Cleaned docstring, if the body opens with one
    pub docstring: Option<String>,
}

impl FunctionDescriptor {
    /// Create descriptor
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>, signature: impl Into<String>, docstring: Option<String>) -> Self {
        Self {
            code: code.into(),
            signature: signature.into(),
            docstring,
        }
    }

    /// Docstring or a placeholder for prompts
    #[inline]
    #[must_use]
    pub fn docstring_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.docstring.as_deref().unwrap_or(fallback)
    }
}
