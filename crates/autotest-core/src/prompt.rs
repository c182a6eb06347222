//! Prompt templates
//!
//! Templates live as `<dir>/<name>_prompt.md`. Placeholders are `{name}`;
//! `{{` and `}}` stand for literal braces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Template used by the test planner
pub const TEST_PLANNER: &str = "test_planner";

/// Template used by the test writer
pub const TEST_WRITER: &str = "test_writer";

/// Errors loading or rendering templates
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Template file does not exist
    #[error("prompt template not found: {path}")]
    NotFound { path: PathBuf },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Placeholder with no value supplied
    #[error("template '{template}' references unknown variable '{name}'")]
    MissingVariable { template: String, name: String },

    /// Unbalanced brace or invalid placeholder
    #[error("template '{template}' is malformed: {message}")]
    Malformed { template: String, message: String },
}

/// A loaded template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
}

impl PromptTemplate {
    /// Create template from text
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute placeholders
    ///
    /// Values are inserted verbatim; braces inside them are not interpreted.
    ///
    /// # Errors
    /// [`PromptError::MissingVariable`] for a placeholder without a value,
    /// [`PromptError::Malformed`] for a stray brace or an empty placeholder.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, PromptError> {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let start = i + 1;
                    let end = loop {
                        match chars.next() {
                            Some((j, '}')) => break j,
                            Some((_, '{')) | None => {
                                return Err(self.malformed(format!("unclosed '{{' at byte {i}")));
                            }
                            Some(_) => {}
                        }
                    };
                    let key = &self.text[start..end];
                    if !is_placeholder(key) {
                        return Err(self.malformed(format!("invalid placeholder '{{{key}}}'")));
                    }
                    let value = vars
                        .iter()
                        .find(|(name, _)| *name == key)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| PromptError::MissingVariable {
                            template: self.name.clone(),
                            name: key.to_string(),
                        })?;
                    out.push_str(value);
                }
                '}' => return Err(self.malformed(format!("single '}}' at byte {i}"))),
                other => out.push(other),
            }
        }

        Ok(out)
    }

    fn malformed(&self, message: String) -> PromptError {
        PromptError::Malformed {
            template: self.name.clone(),
            message,
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Where templates come from
pub trait TemplateSource: Send + Sync {
    /// Load a template by name
    ///
    /// # Errors
    /// [`PromptError::NotFound`] if no template has that name.
    fn load(&self, name: &str) -> Result<PromptTemplate, PromptError>;
}

/// Templates stored as markdown files in a directory
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a template name maps to
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}_prompt.md"))
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, name: &str) -> Result<PromptTemplate, PromptError> {
        let path = self.path_for(name);
        tracing::debug!("Loading prompt template {}", path.display());

        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(PromptTemplate::new(name, text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!("Prompt template missing: {}", path.display());
                Err(PromptError::NotFound { path })
            }
            Err(source) => Err(PromptError::Io { path, source }),
        }
    }
}

/// Templates held in memory, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    templates: HashMap<String, String>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for InMemoryTemplates {
    fn load(&self, name: &str) -> Result<PromptTemplate, PromptError> {
        self.templates
            .get(name)
            .map(|text| PromptTemplate::new(name, text.clone()))
            .ok_or_else(|| PromptError::NotFound {
                path: PathBuf::from(format!("{name}_prompt.md")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitutes_placeholders() {
        let t = PromptTemplate::new("t", "Write tests for {function_name}:\n{test_case_json}");
        let out = t
            .render(&[("function_name", "add"), ("test_case_json", "{\"a\": 1}")])
            .unwrap();
        assert_eq!(out, "Write tests for add:\n{\"a\": 1}");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let t = PromptTemplate::new("t", "{{\"returns\": {value}}}");
        assert_eq!(t.render(&[("value", "3")]).unwrap(), "{\"returns\": 3}");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let t = PromptTemplate::new("t", "{analysis}");
        let err = t.render(&[]).unwrap_err();
        assert!(matches!(err, PromptError::MissingVariable { ref name, .. } if name == "analysis"));
    }

    #[test]
    fn stray_braces_are_malformed() {
        for text in ["open {", "close }", "{not valid}", "{}", "{a{b}"] {
            let err = PromptTemplate::new("t", text).render(&[("a", "x")]).unwrap_err();
            assert!(matches!(err, PromptError::Malformed { .. }), "{text}");
        }
    }

    #[test]
    fn unused_variables_are_ignored() {
        let t = PromptTemplate::new("t", "plain");
        assert_eq!(t.render(&[("extra", "x")]).unwrap(), "plain");
    }

    #[test]
    fn directory_templates_load_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test_planner_prompt.md"), "Plan {function_code}").unwrap();

        let source = DirectoryTemplates::new(dir.path());
        let t = source.load(TEST_PLANNER).unwrap();
        assert_eq!(t.name(), "test_planner");
        assert_eq!(t.text(), "Plan {function_code}");

        let err = source.load(TEST_WRITER).unwrap_err();
        match err {
            PromptError::NotFound { path } => assert!(path.ends_with("test_writer_prompt.md")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn in_memory_templates() {
        let source = InMemoryTemplates::new().with(TEST_WRITER, "w");
        assert_eq!(source.load(TEST_WRITER).unwrap().text(), "w");
        assert!(matches!(source.load(TEST_PLANNER), Err(PromptError::NotFound { .. })));
    }
}
