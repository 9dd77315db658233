//! Post-parse checks: raw token coercion and constraint validation.
//!
//! Constraint checks are best-effort. A path, choice or equality rule that
//! fails is a [`UsageError`]; an expression that is malformed, does not
//! mention the argument, or cannot be evaluated is reported as a warning and
//! ignored.
//!
//! # Examples
//!
//! ```
//! use lazyarg_core::*;
//!
//! let mut arg = Argument::new("n", TypeTag::Scalar(Primitive::Int), Some(Value::Int(1)));
//! arg.short_name = Some("n".into());
//! arg.constraint = Some(Constraint::from_value(Value::Str("n > 0".into())));
//!
//! assert!(check_constraint(&arg, &Value::Int(3)).is_ok());
//! assert!(check_constraint(&arg, &Value::Int(-3)).is_err());
//! ```

use std::path::Path;

use tracing::warn;

use crate::error::UsageError;
use crate::expr::Expression;
use crate::types::{Argument, Constraint, PathKind, Primitive, TypeTag, Value};

/// Coerces one raw token to `primitive` for `argument`.
///
/// # Errors
///
/// [`UsageError::InvalidBool`] for booleans other than `True`/`False`,
/// [`UsageError::InvalidValue`] for any other failed conversion.
pub fn coerce_token(argument: &Argument, primitive: Primitive, raw: &str) -> Result<Value, UsageError> {
    primitive.parse(raw).ok_or_else(|| match primitive {
        Primitive::Bool => UsageError::InvalidBool {
            argument: argument.display_name(),
            value: raw.to_string(),
        },
        other => UsageError::InvalidValue {
            argument: argument.display_name(),
            value: raw.to_string(),
            expected: other.name().to_string(),
        },
    })
}

/// Coerces the raw tokens given for `argument` into a typed value.
///
/// Scalars take the last token; tuples map tokens onto their slots.
///
/// # Errors
///
/// See [`coerce_token`]. A token count that does not match a fixed tuple is
/// reported as [`UsageError::InvalidValue`].
///
/// # Examples
///
/// ```
/// use lazyarg_core::*;
///
/// let arg = Argument::new("p", TypeTag::Tuple(vec![Primitive::Int, Primitive::Str]), None);
/// let value = coerce_tokens(&arg, &["4", "four"]).unwrap();
/// assert_eq!(value, Value::List(vec![Value::Int(4), Value::Str("four".into())]));
/// assert!(coerce_tokens(&arg, &["four", "4"]).is_err());
/// ```
pub fn coerce_tokens<S: AsRef<str>>(argument: &Argument, raw: &[S]) -> Result<Value, UsageError> {
    match &argument.type_tag {
        TypeTag::Scalar(p) => {
            let token = raw.last().map_or("", AsRef::as_ref);
            coerce_token(argument, *p, token)
        }
        TypeTag::Tuple(slots) if slots.len() != raw.len() => Err(UsageError::InvalidValue {
            argument: argument.display_name(),
            value: join_tokens(raw),
            expected: argument.type_tag.to_string(),
        }),
        TypeTag::Tuple(slots) => slots
            .iter()
            .zip(raw)
            .map(|(p, token)| coerce_token(argument, *p, token.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        TypeTag::Repeated(p) => raw
            .iter()
            .map(|token| coerce_token(argument, *p, token.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}

fn join_tokens<S: AsRef<str>>(raw: &[S]) -> String {
    raw.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

/// Checks `value` against the constraint attached to `argument`.
///
/// Returns `Ok(Some(warning))` when the constraint had to be ignored.
///
/// # Errors
///
/// A [`UsageError`] describing the violated rule.
pub fn check_constraint(argument: &Argument, value: &Value) -> Result<Option<String>, UsageError> {
    match &argument.constraint {
        None => Ok(None),
        Some(Constraint::Path(kind)) => check_path(argument, *kind, value).map(|()| None),
        Some(Constraint::Choices(choices)) => check_choices(argument, choices, value).map(|()| None),
        Some(Constraint::Equals(expected)) => check_equals(argument, expected, value).map(|()| None),
        Some(Constraint::Expression(expr)) => check_expression(argument, expr, value),
    }
}

fn check_path(argument: &Argument, kind: PathKind, value: &Value) -> Result<(), UsageError> {
    let wrong_type = || UsageError::WrongPathType {
        argument: argument.display_name(),
    };
    if !argument.type_tag.is_textual() {
        return Err(wrong_type());
    }
    for element in value.elements() {
        let Value::Str(path) = element else {
            return Err(wrong_type());
        };
        let path_ref = Path::new(path);
        let exists = match kind {
            PathKind::File => path_ref.is_file(),
            PathKind::Dir => path_ref.is_dir(),
        };
        if !exists {
            return Err(UsageError::MissingPath {
                argument: argument.display_name(),
                value: path.clone(),
                kind: kind.keyword().to_string(),
            });
        }
    }
    Ok(())
}

fn check_choices(argument: &Argument, choices: &[Value], value: &Value) -> Result<(), UsageError> {
    for element in value.elements() {
        if !choices.iter().any(|choice| choice.loosely_eq(element)) {
            let listed: Vec<String> = choices.iter().map(ToString::to_string).collect();
            return Err(UsageError::NotInChoices {
                argument: argument.display_name(),
                value: element.to_string(),
                choices: listed.join(", "),
            });
        }
    }
    Ok(())
}

fn check_equals(argument: &Argument, expected: &Value, value: &Value) -> Result<(), UsageError> {
    match value.elements().find(|element| !expected.loosely_eq(element)) {
        Some(element) => Err(UsageError::NotEqual {
            argument: argument.display_name(),
            value: element.to_string(),
            expected: expected.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_expression(
    argument: &Argument,
    expr: &Expression,
    value: &Value,
) -> Result<Option<String>, UsageError> {
    if let Err(err) = expr.parsed() {
        return Ok(Some(ignored(
            argument,
            format!("wrong assertion:{}({err})", expr.source()),
        )));
    }

    let mut candidates = vec![argument.name.as_str()];
    if let Some(short) = argument.short_name.as_deref() {
        candidates.push(short);
    }
    let Some(bound) = expr.bound_name(&candidates) else {
        return Ok(Some(ignored(
            argument,
            format!("not found in assertion:{}", expr.source()),
        )));
    };

    for element in value.elements() {
        match expr.evaluate(bound, element) {
            Ok(true) => {}
            Ok(false) => {
                return Err(UsageError::ExpressionFailed {
                    argument: argument.display_name(),
                    value: element.to_string(),
                    expression: expr.source().trim().to_string(),
                });
            }
            Err(err) => {
                return Ok(Some(ignored(
                    argument,
                    format!("wrong assertion:{}({err})", expr.source()),
                )));
            }
        }
    }
    Ok(None)
}

fn ignored(argument: &Argument, reason: String) -> String {
    let message = format!("argument {}: {reason}. It will be ignored", argument.display_name());
    warn!(argument = %argument.name, "{message}");
    message
}
