//! Signature rendering
//!
//! Rebuilds `def name(params):` from the parameter nodes, following the
//! spacing `ast.unparse` uses: `a: int`, `b=1`, `c: int=1`, `*args`, `**kw`.
//! Whitespace inside annotations and defaults collapses to single spaces; the
//! return annotation is not part of the rendering.

use tree_sitter::Node;

/// Render the signature line of a `function_definition` node
#[must_use]
pub fn render_signature(definition: Node<'_>, source: &str, is_async: bool) -> Option<String> {
    let name = definition.child_by_field_name("name")?;
    let name = node_text(name, source);
    let params = definition
        .child_by_field_name("parameters")
        .map(|p| render_parameters(p, source))
        .unwrap_or_default();

    let keyword = if is_async { "async def" } else { "def" };
    Some(format!("{keyword} {name}({params}):"))
}

/// Render the inside of a `parameters` node, comma separated
#[must_use]
pub fn render_parameters(parameters: Node<'_>, source: &str) -> String {
    let mut cursor = parameters.walk();
    parameters
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .map(|n| render_parameter(n, source))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Count declared parameters, separators (`*`, `/`) excluded
#[must_use]
pub fn parameter_count(parameters: Node<'_>) -> usize {
    let mut cursor = parameters.walk();
    parameters
        .named_children(&mut cursor)
        .filter(|n| {
            !matches!(
                n.kind(),
                "comment" | "keyword_separator" | "positional_separator"
            )
        })
        .count()
}

fn render_parameter(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "identifier" => node_text(node, source).to_string(),
        "list_splat_pattern" => render_splat(node, source, "*"),
        "dictionary_splat_pattern" => render_splat(node, source, "**"),
        "keyword_separator" => "*".to_string(),
        "positional_separator" => "/".to_string(),
        "typed_parameter" => {
            let mut cursor = node.walk();
            let name = node
                .named_children(&mut cursor)
                .next()
                .map(|n| render_parameter(n, source))
                .unwrap_or_default();
            format!("{name}: {}", field_text(node, "type", source))
        }
        "default_parameter" => format!(
            "{}={}",
            field_text(node, "name", source),
            field_text(node, "value", source)
        ),
        "typed_default_parameter" => format!(
            "{}: {}={}",
            field_text(node, "name", source),
            field_text(node, "type", source),
            field_text(node, "value", source)
        ),
        _ => collapse_whitespace(node_text(node, source)),
    }
}

fn render_splat(node: Node<'_>, source: &str, stars: &str) -> String {
    let mut cursor = node.walk();
    let inner = node.named_children(&mut cursor).next();
    match inner {
        Some(ident) => format!("{stars}{}", node_text(ident, source)),
        None => collapse_whitespace(node_text(node, source)),
    }
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|n| collapse_whitespace(node_text(n, source)))
        .unwrap_or_default()
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
