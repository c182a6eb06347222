//! Docstring literal decoding
//!
//! Turns the source text of a Python string literal into its value and cleans
//! the indentation the same way `inspect.cleandoc` does.

/// Decode a single string literal (`"..."`, `'''...'''`, `r"..."`, ...)
///
/// Returns `None` for literals that cannot act as a docstring: f-strings,
/// t-strings, bytes, or text that is not a well-formed literal.
#[must_use]
pub fn parse_string_literal(text: &str) -> Option<String> {
    let quote_at = text.find(['"', '\''])?;
    let (prefix, rest) = text.split_at(quote_at);
    let prefix = prefix.to_ascii_lowercase();

    if !prefix.chars().all(|c| matches!(c, 'r' | 'u' | 'f' | 'b' | 't')) {
        return None;
    }
    if prefix.contains(['f', 'b', 't']) {
        return None;
    }

    let body = strip_quotes(rest)?.replace("\r\n", "\n");
    if prefix.contains('r') {
        Some(body)
    } else {
        Some(decode_escapes(&body))
    }
}

fn strip_quotes(rest: &str) -> Option<&str> {
    ["\"\"\"", "'''", "\"", "'"].into_iter().find_map(|quote| {
        let fits = rest.len() >= 2 * quote.len();
        (fits && rest.starts_with(quote) && rest.ends_with(quote))
            .then(|| &rest[quote.len()..rest.len() - quote.len()])
    })
}

/// Resolve backslash escapes of a non-raw `str` literal
///
/// Unknown or malformed escapes are kept verbatim. `\N{...}` is kept verbatim.
#[must_use]
pub fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' => push_hex_escape(&mut out, &mut chars, 'x', 2),
            'u' => push_hex_escape(&mut out, &mut chars, 'u', 4),
            'U' => push_hex_escape(&mut out, &mut chars, 'U', 8),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    marker: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = (digits.len() == width)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);

    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&digits);
        }
    }
}

/// Clean docstring indentation like `inspect.cleandoc`
///
/// Tabs are expanded to 8 columns, the first line is left-stripped, the
/// common indentation of the remaining non-blank lines is removed, and empty
/// leading/trailing lines are dropped.
#[must_use]
pub fn clean_docstring(doc: &str) -> String {
    let expanded = expand_tabs(doc, 8);
    let mut lines: Vec<String> = expanded.split('\n').map(str::to_string).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start().chars().count();
            (content > 0).then(|| line.chars().count() - content)
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);

    lines.join("\n")
}

fn expand_tabs(text: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = tab_size - (column % tab_size);
                out.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
