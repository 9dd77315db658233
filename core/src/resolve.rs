//! Type resolution for annotations and docstring type markers.
//!
//! Type expressions are small: a primitive name (`int`, `float`, `bool`,
//! `str`/`string`), a bare `tuple` (repeated strings), a fixed tuple
//! `tuple[int, str]` or a repeated tuple `tuple[int, ...]`. Anything else is
//! rejected with [`ConfigError::UnsupportedType`].
//!
//! # Examples
//!
//! ```
//! use lazyarg_core::{resolve_type, Primitive, TypeTag};
//!
//! assert_eq!(resolve_type("int", "x").unwrap(), TypeTag::Scalar(Primitive::Int));
//! assert_eq!(
//!     resolve_type("tuple[int, ...]", "x").unwrap(),
//!     TypeTag::Repeated(Primitive::Int)
//! );
//! assert!(resolve_type("list", "x").is_err());
//! assert!(resolve_type("tuple[..., int]", "x").is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConfigError, Result};
use crate::types::{Primitive, TypeTag, Value};

static TYPE_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)(?:\[(.*)\])?$").expect("static regex must compile")
});

const ELLIPSIS: &str = "...";

/// Names that look like types but are not supported. A docstring marker
/// using one of these is a declaration error rather than plain help text.
const KNOWN_TYPE_NAMES: &[&str] = &[
    "int", "float", "bool", "str", "string", "tuple", "list", "dict", "set", "frozenset",
    "bytes", "bytearray", "complex", "object", "callable", "none", "any", "type",
];

/// Returns `true` when `text` has the shape of a type expression and its
/// head names a type (supported or not).
///
/// # Examples
///
/// ```
/// use lazyarg_core::looks_like_type;
///
/// assert!(looks_like_type("int"));
/// assert!(looks_like_type("tuple[int, ...]"));
/// assert!(looks_like_type("list"));
/// assert!(!looks_like_type("optional"));
/// assert!(!looks_like_type("see docs"));
/// ```
pub fn looks_like_type(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if text.trim().contains(char::is_whitespace) && !compact.contains('[') {
        return false;
    }
    TYPE_EXPR
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .is_some_and(|head| KNOWN_TYPE_NAMES.contains(&head.as_str().to_ascii_lowercase().as_str()))
}

/// Resolves a declared type expression for the argument `argument`.
///
/// # Errors
///
/// [`ConfigError::UnsupportedType`] for types outside the supported set
/// (including booleans inside a tuple), [`ConfigError::InvalidEllipsis`]
/// when `...` is used anywhere but as `tuple[T, ...]`.
pub fn resolve_type(declared: &str, argument: &str) -> Result<TypeTag> {
    let compact: String = declared.chars().filter(|c| !c.is_whitespace()).collect();
    let unsupported = || ConfigError::UnsupportedType {
        argument: argument.to_string(),
        declared: declared.trim().to_string(),
    };

    let caps = TYPE_EXPR.captures(&compact).ok_or_else(unsupported)?;
    let head = caps.get(1).map_or("", |m| m.as_str());

    let Some(inner) = caps.get(2).map(|m| m.as_str()) else {
        return match head {
            "tuple" => Ok(TypeTag::Repeated(Primitive::Str)),
            name => scalar(name).map(TypeTag::Scalar).ok_or_else(unsupported),
        };
    };

    if head != "tuple" || inner.is_empty() || inner.contains('[') {
        return Err(unsupported());
    }

    let slots: Vec<&str> = inner.split(',').collect();
    if slots.contains(&ELLIPSIS) {
        return match slots.as_slice() {
            [element, ELLIPSIS] if *element != ELLIPSIS => {
                slot(element).map(TypeTag::Repeated).ok_or_else(unsupported)
            }
            _ => Err(ConfigError::InvalidEllipsis {
                argument: argument.to_string(),
                declared: declared.trim().to_string(),
            }),
        };
    }

    slots
        .iter()
        .map(|name| slot(name))
        .collect::<Option<Vec<_>>>()
        .map(TypeTag::Tuple)
        .ok_or_else(unsupported)
}

fn scalar(name: &str) -> Option<Primitive> {
    match name {
        "bool" => Some(Primitive::Bool),
        other => slot(other),
    }
}

fn slot(name: &str) -> Option<Primitive> {
    match name {
        "int" => Some(Primitive::Int),
        "float" => Some(Primitive::Float),
        "str" | "string" => Some(Primitive::Str),
        _ => None,
    }
}

/// Checks a declared default against the resolved type and normalizes it.
///
/// Returns the normalized default and, for booleans overridden to `false`,
/// a warning message. Boolean arguments never default to `true`: a missing
/// default becomes `false` silently, any other non-false default becomes
/// `false` with a warning. String arguments accept any scalar default in
/// its text form.
///
/// # Errors
///
/// [`ConfigError::InvalidDefault`] when the default cannot represent the type.
///
/// # Examples
///
/// ```
/// use lazyarg_core::{normalize_default, Primitive, TypeTag, Value};
///
/// let flag = TypeTag::Scalar(Primitive::Bool);
/// let (default, warning) = normalize_default(&flag, None, "--verbose").unwrap();
/// assert_eq!(default, Some(Value::Bool(false)));
/// assert!(warning.is_none());
///
/// let (default, warning) = normalize_default(&flag, Some(&Value::Bool(true)), "--verbose").unwrap();
/// assert_eq!(default, Some(Value::Bool(false)));
/// assert!(warning.is_some());
/// ```
pub fn normalize_default(
    type_tag: &TypeTag,
    default: Option<&Value>,
    argument: &str,
) -> Result<(Option<Value>, Option<String>)> {
    if type_tag.is_flag() {
        let warning = match default {
            None | Some(Value::Bool(false)) => None,
            Some(other) => Some(format!(
                "argument {argument}: default {other} overridden to false, boolean flags always default to false"
            )),
        };
        return Ok((Some(Value::Bool(false)), warning));
    }

    let Some(value) = default else {
        return Ok((None, None));
    };
    let invalid = || ConfigError::InvalidDefault {
        argument: argument.to_string(),
        value: value.to_string(),
        expected: type_tag.to_string(),
    };

    let normalized = match (type_tag, value) {
        (TypeTag::Scalar(p), v) => coerce_scalar(v, *p),
        (TypeTag::Tuple(slots), Value::List(items)) if slots.len() == items.len() => slots
            .iter()
            .zip(items)
            .map(|(p, v)| coerce_scalar(v, *p))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        (TypeTag::Repeated(p), Value::List(items)) => items
            .iter()
            .map(|v| coerce_scalar(v, *p))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        (TypeTag::Repeated(p), v) => coerce_scalar(v, *p).map(|v| Value::List(vec![v])),
        _ => None,
    };

    normalized.map(|v| (Some(v), None)).ok_or_else(invalid)
}

fn coerce_scalar(value: &Value, primitive: Primitive) -> Option<Value> {
    match (value, primitive) {
        (Value::List(_), _) => None,
        (Value::Str(_), Primitive::Str) => Some(value.clone()),
        (other, Primitive::Str) => Some(Value::Str(other.to_string())),
        (other, p) => other.normalized(p),
    }
}
