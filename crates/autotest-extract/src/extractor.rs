//! Top-level function lookup
//!
//! [`ParsedSource`] owns the source text and its tree-sitter tree;
//! [`FunctionDef`] is a borrowed view over one top-level definition.

use crate::descriptor::FunctionDescriptor;
use crate::docstring::{clean_docstring, parse_string_literal};
use crate::error::ExtractError;
use crate::signature::{parameter_count, render_signature};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Python source parsed with tree-sitter
#[derive(Debug)]
pub struct ParsedSource {
    source: String,
    tree: Tree,
}

impl ParsedSource {
    /// Parse Python source text
    ///
    /// # Errors
    /// Returns [`ExtractError::Parser`] if the grammar cannot be loaded or no
    /// tree is produced. Syntax errors do not fail parsing; tree-sitter keeps
    /// them as error nodes.
    pub fn parse(source: impl Into<String>) -> Result<Self, ExtractError> {
        let source = source.into();

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ExtractError::Parser(e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ExtractError::Parser("parser produced no tree".to_string()))?;

        Ok(Self { source, tree })
    }

    /// Get source text
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether the tree contains syntax errors anywhere
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// All top-level function definitions in document order
    #[must_use]
    pub fn top_level_functions(&self) -> Vec<FunctionDef<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter_map(|node| FunctionDef::from_node(node, &self.source))
            .collect()
    }

    /// Last top-level definition named `name`
    ///
    /// Later definitions shadow earlier ones.
    #[must_use]
    pub fn find_last(&self, name: &str) -> Option<FunctionDef<'_>> {
        self.top_level_functions()
            .into_iter()
            .rfind(|def| def.name() == name)
    }
}

/// One top-level `def`, possibly wrapped in decorators
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef<'a> {
    /// `decorated_definition` or the definition itself
    outer: Node<'a>,
    /// The `function_definition` node
    definition: Node<'a>,
    source: &'a str,
}

impl<'a> FunctionDef<'a> {
    fn from_node(node: Node<'a>, source: &'a str) -> Option<Self> {
        let definition = match node.kind() {
            "function_definition" => node,
            "decorated_definition" => node
                .child_by_field_name("definition")
                .filter(|d| d.kind() == "function_definition")?,
            _ => return None,
        };
        Some(Self {
            outer: node,
            definition,
            source,
        })
    }

    /// Function name
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.definition
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source.as_bytes()).ok())
            .unwrap_or_default()
    }

    /// Declared as `async def`
    #[must_use]
    pub fn is_async(&self) -> bool {
        let mut cursor = self.definition.walk();
        let is_async = self
            .definition
            .children(&mut cursor)
            .take_while(|c| c.kind() != "def")
            .any(|c| c.kind() == "async");
        is_async
    }

    /// Exact source of the definition, decorators included
    #[must_use]
    pub fn code(&self) -> &'a str {
        self.source.get(self.outer.byte_range()).unwrap_or_default()
    }

    /// 1-based line the definition starts on
    #[must_use]
    pub fn line(&self) -> usize {
        self.outer.start_position().row + 1
    }

    /// Number of declared parameters
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.definition
            .child_by_field_name("parameters")
            .map(parameter_count)
            .unwrap_or(0)
    }

    /// Normalized signature line
    #[must_use]
    pub fn signature(&self) -> Option<String> {
        render_signature(self.definition, self.source, self.is_async())
    }

    /// Cleaned docstring, if the body opens with a plain string literal
    #[must_use]
    pub fn docstring(&self) -> Option<String> {
        let body = self.definition.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")?;

        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let mut cursor = first.walk();
        let literal = first.named_children(&mut cursor).next()?;

        let raw = match literal.kind() {
            "string" => self.literal_value(literal)?,
            "concatenated_string" => {
                let mut cursor = literal.walk();
                let parts = literal
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() == "string")
                    .map(|n| self.literal_value(n))
                    .collect::<Option<Vec<_>>>()?;
                parts.concat()
            }
            _ => return None,
        };

        Some(clean_docstring(&raw))
    }

    fn literal_value(&self, node: Node<'_>) -> Option<String> {
        let text = node.utf8_text(self.source.as_bytes()).ok()?;
        parse_string_literal(text)
    }

    /// Build the descriptor for this definition
    ///
    /// # Errors
    /// Returns [`ExtractError::ExtractionFailed`] if the definition contains
    /// parse errors or its text cannot be recovered.
    pub fn descriptor(&self) -> Result<FunctionDescriptor, ExtractError> {
        let name = self.name();
        let code = self.code();

        if code.trim().is_empty() || self.outer.has_error() {
            return Err(ExtractError::extraction_failed(name));
        }
        let signature = self
            .signature()
            .ok_or_else(|| ExtractError::extraction_failed(name))?;

        Ok(FunctionDescriptor::new(code, signature, self.docstring()))
    }
}

/// Extract `function_name` from the file at `file_path`
///
/// # Errors
/// - [`ExtractError::Io`] if the file cannot be read
/// - [`ExtractError::NotFound`] if no top-level definition matches
/// - [`ExtractError::ExtractionFailed`] if the match cannot be sliced back to text
pub fn extract(
    file_path: impl AsRef<Path>,
    function_name: &str,
) -> Result<FunctionDescriptor, ExtractError> {
    let path = file_path.as_ref();
    tracing::debug!("Reading source file '{}'", path.display());

    let source =
        std::fs::read_to_string(path).map_err(|e| ExtractError::io_error(path, e))?;
    extract_parsed(&ParsedSource::parse(source)?, function_name, path)
}

/// Extract `function_name` from in-memory source
///
/// # Errors
/// Same as [`extract`], minus IO. `NotFound` reports the path as `<source>`.
pub fn extract_from_source(
    source: &str,
    function_name: &str,
) -> Result<FunctionDescriptor, ExtractError> {
    extract_parsed(&ParsedSource::parse(source)?, function_name, Path::new("<source>"))
}

fn extract_parsed(
    parsed: &ParsedSource,
    function_name: &str,
    path: &Path,
) -> Result<FunctionDescriptor, ExtractError> {
    if parsed.has_errors() {
        tracing::warn!(
            "Syntax errors found in '{}'; continuing with recoverable definitions",
            path.display()
        );
    }

    let definitions = parsed.top_level_functions();
    let matches = definitions
        .iter()
        .filter(|def| def.name() == function_name)
        .count();
    if matches > 1 {
        tracing::debug!(
            "'{}' defined {} times in '{}'; using the last definition",
            function_name,
            matches,
            path.display()
        );
    }

    let Some(definition) = parsed.find_last(function_name) else {
        tracing::error!(
            "Function '{}' not found in '{}'",
            function_name,
            path.display()
        );
        return Err(ExtractError::not_found(function_name, path));
    };

    tracing::debug!(
        "Extracting '{}' from line {} of '{}'",
        function_name,
        definition.line(),
        path.display()
    );
    definition.descriptor()
}

/// Names of all top-level functions, in document order
///
/// # Errors
/// Returns [`ExtractError::Parser`] if the source cannot be parsed at all.
pub fn list_functions(source: &str) -> Result<Vec<String>, ExtractError> {
    let parsed = ParsedSource::parse(source)?;
    let names = parsed
        .top_level_functions()
        .iter()
        .map(|def| def.name().to_string())
        .collect();
    Ok(names)
}
