//! Docstring scanning.
//!
//! A docstring is split into a free-text description and one help line per
//! documented parameter. With the default delimiters:
//!
//! ```text
//! Multiply two numbers.
//!
//! :param x: (int) first factor
//! :param y: (int) second factor
//! ```
//!
//! Scanning is a pure text transform; matching the documented names against
//! the declared parameters happens in the model builder.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use lazyarg_core::{Delimiters, looks_like_type};
use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|[\n\r]").expect("static regex must compile"));

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("static regex must compile"));

/// Result of scanning a docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedDoc {
    /// Text before the first parameter line (or header marker).
    pub description: String,
    /// Raw help text per documented parameter name.
    pub params: BTreeMap<String, String>,
}

/// Scans `doc` with the given delimiters.
///
/// When a parameter is documented twice, the first line wins.
///
/// # Examples
///
/// ```
/// use lazyarg_core::Delimiters;
/// use lazyarg_parser::scan;
///
/// let doc = "\n    Say hello.\n\n    :param name: who   to greet\n";
/// let scanned = scan(doc, &Delimiters::default());
/// assert_eq!(scanned.description, "Say hello.");
/// assert_eq!(scanned.params["name"], "who to greet");
/// ```
pub fn scan(doc: &str, delimiters: &Delimiters) -> ScannedDoc {
    let delimiters = &delimiters.normalized();
    let lines: Vec<&str> = LINE_BREAK
        .split(doc)
        .skip_while(|line| line.trim().is_empty())
        .collect();

    let stop = delimiters.description_stop();
    let ends_description = |line: &str| {
        line.contains(stop) || (!delimiters.header.is_empty() && line.contains(&delimiters.header))
    };
    let split = lines
        .iter()
        .position(|line| ends_description(line))
        .unwrap_or(lines.len());

    let description = lines[..split]
        .iter()
        .map(|line| dedent(line, delimiters.tab))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string();

    let mut params = BTreeMap::new();
    for line in &lines[split..] {
        if let Some((name, help)) = parameter_line(line, delimiters) {
            params.entry(name).or_insert(help);
        }
    }

    ScannedDoc {
        description,
        params,
    }
}

fn dedent(line: &str, tab: usize) -> &str {
    let mut indices = line.char_indices();
    let mut cut = 0;
    for _ in 0..tab {
        match indices.next() {
            Some((i, c)) if c.is_whitespace() => cut = i + c.len_utf8(),
            _ => return line.trim_start(),
        }
    }
    &line[cut..]
}

fn parameter_line(line: &str, delimiters: &Delimiters) -> Option<(String, String)> {
    let primary = delimiters.primary.as_str();
    let secondary = delimiters.secondary.as_str();
    if !line.contains(secondary) {
        return None;
    }

    let body = if primary.is_empty() {
        line
    } else {
        let (_, after) = line.split_once(primary)?;
        after.split(primary).next().unwrap_or(after)
    };

    let mut segments = body.split(secondary).filter(|s| !s.trim().is_empty());
    let name = segments.next()?.trim().to_string();
    let help = collapse_whitespace(&segments.collect::<Vec<_>>().join(secondary));
    Some((name, help))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A type marker found in a help line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMarker {
    /// The first parenthesized type expression, if any.
    pub declared: Option<String>,
    /// Help text with that marker removed.
    pub help: String,
    /// Number of further type markers that were ignored.
    pub ignored: usize,
}

/// Pulls a parenthesized type expression such as `(int)` out of `help`.
///
/// Only the first marker is used and removed; parenthesized text that does
/// not name a type stays in the help.
///
/// # Examples
///
/// ```
/// use lazyarg_parser::extract_type_marker;
///
/// let marker = extract_type_marker("(tuple[int, ...]) sizes (see docs)");
/// assert_eq!(marker.declared.as_deref(), Some("tuple[int, ...]"));
/// assert_eq!(marker.help, "sizes (see docs)");
/// ```
pub fn extract_type_marker(help: &str) -> TypeMarker {
    let mut markers = PARENTHESIZED
        .captures_iter(help)
        .filter(|caps| looks_like_type(&caps[1]));

    let Some(first) = markers.next() else {
        return TypeMarker {
            declared: None,
            help: help.to_string(),
            ignored: 0,
        };
    };
    let ignored = markers.count();

    let whole = first.get(0).map_or(0..0, |m| m.range());
    let mut remaining = String::with_capacity(help.len());
    remaining.push_str(&help[..whole.start]);
    remaining.push(' ');
    remaining.push_str(&help[whole.end..]);

    TypeMarker {
        declared: Some(first[1].trim().to_string()),
        help: collapse_whitespace(&remaining),
        ignored,
    }
}
