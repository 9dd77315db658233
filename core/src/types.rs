//! Argument model type definitions.
//!
//! This module defines the data model shared by the docstring scanner, the
//! model builder and the backend handoff: declared parameters
//! ([`ParamDecl`], [`FunctionSchema`]), resolved types ([`TypeTag`]),
//! runtime values ([`Value`]), post-parse rules ([`Constraint`]) and the
//! central [`Argument`] record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::Expression;

/// Name of the always-present help argument.
pub const HELP_ARGUMENT: &str = "help";

/// Name of the version argument injected when a version string is configured.
pub const VERSION_ARGUMENT: &str = "version";

/// 2^63, the first float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Scalar value kinds supported on the command line.
///
/// # Examples
///
/// ```
/// use lazyarg_core::Primitive;
///
/// assert_eq!(Primitive::Int.name(), "int");
/// assert_eq!(Primitive::Str.parse("abc").unwrap().to_string(), "abc");
/// assert!(Primitive::Float.parse("nope").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Str,
}

impl Primitive {
    /// Returns the canonical type name used in annotations.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }

    /// Parses a raw command-line token into a value of this kind.
    ///
    /// Booleans only accept the literal strings `True` and `False`
    /// (lowercase spellings are tolerated).
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            Self::Int => raw.trim().parse().ok().map(Value::Int),
            Self::Float => raw.trim().parse().ok().map(Value::Float),
            Self::Bool => match raw.trim() {
                "True" | "true" => Some(Value::Bool(true)),
                "False" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Str => Some(Value::Str(raw.to_string())),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// A single value.
    Scalar,
    /// Exactly this many values.
    Fixed(usize),
    /// At least one value.
    OneOrMore,
}

/// Resolved argument type.
///
/// The `Display` form is a type expression that resolves back to the same
/// tag (see [`resolve_type`](crate::resolve_type)).
///
/// # Examples
///
/// ```
/// use lazyarg_core::{Arity, Primitive, TypeTag};
///
/// let pair = TypeTag::Tuple(vec![Primitive::Int, Primitive::Str]);
/// assert_eq!(pair.arity(), Arity::Fixed(2));
/// assert_eq!(pair.to_string(), "tuple[int, str]");
///
/// let many = TypeTag::Repeated(Primitive::Float);
/// assert_eq!(many.arity(), Arity::OneOrMore);
/// assert_eq!(many.to_string(), "tuple[float, ...]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Scalar(Primitive),
    /// Fixed arity, one primitive per slot.
    Tuple(Vec<Primitive>),
    /// Homogeneous, variable arity.
    Repeated(Primitive),
}

impl TypeTag {
    /// The default type when neither annotation nor docstring gives one.
    pub const STRING: Self = Self::Scalar(Primitive::Str);

    pub fn arity(&self) -> Arity {
        match self {
            Self::Scalar(_) => Arity::Scalar,
            Self::Tuple(slots) => Arity::Fixed(slots.len()),
            Self::Repeated(_) => Arity::OneOrMore,
        }
    }

    /// Booleans render as flags.
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Scalar(Primitive::Bool))
    }

    /// Whether values are carried as text (path constraints need this).
    pub fn is_textual(&self) -> bool {
        match self {
            Self::Scalar(p) | Self::Repeated(p) => *p == Primitive::Str,
            Self::Tuple(slots) => slots.iter().all(|p| *p == Primitive::Str),
        }
    }

    /// Checks that `value` is a valid instance of this type.
    ///
    /// Numeric slots accept int and float interchangeably.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Scalar(p), v) => v.fits(*p),
            (Self::Tuple(slots), Value::List(items)) => {
                slots.len() == items.len() && slots.iter().zip(items).all(|(p, v)| v.fits(*p))
            }
            (Self::Repeated(p), Value::List(items)) => items.iter().all(|v| v.fits(*p)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(p) => write!(f, "{p}"),
            Self::Tuple(slots) => {
                let names: Vec<_> = slots.iter().map(|p| p.name()).collect();
                write!(f, "tuple[{}]", names.join(", "))
            }
            Self::Repeated(p) => write!(f, "tuple[{p}, ...]"),
        }
    }
}

/// A concrete argument value: a default, a fill value, a choice or a parsed
/// command-line value.
///
/// Deserializes untagged, so configuration files can use plain scalars and
/// lists.
///
/// # Examples
///
/// ```
/// use lazyarg_core::Value;
///
/// let v: Value = serde_json::from_str("[1, 2.5, \"a\"]").unwrap();
/// assert_eq!(v.to_string(), "[1, 2.5, a]");
/// assert!(Value::Int(2).loosely_eq(&Value::Float(2.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Name of the value's own kind, used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "tuple",
        }
    }

    /// Returns `true` if the value is an instance of `primitive`, treating
    /// int and float as interchangeable.
    pub fn fits(&self, primitive: Primitive) -> bool {
        matches!(
            (self, primitive),
            (Self::Int(_) | Self::Float(_), Primitive::Int | Primitive::Float)
                | (Self::Bool(_), Primitive::Bool)
                | (Self::Str(_), Primitive::Str)
        )
    }

    /// Converts numeric values to the exact representation of `primitive`.
    ///
    /// A float only converts to int when it has no fractional part and
    /// fits in an `i64`.
    pub fn normalized(&self, primitive: Primitive) -> Option<Self> {
        match (self, primitive) {
            (Self::Float(f), Primitive::Int) if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f) => {
                Some(Self::Int(*f as i64))
            }
            (Self::Float(_), Primitive::Int) => None,
            (Self::Int(i), Primitive::Float) => Some(Self::Float(*i as f64)),
            (v, p) if v.fits(p) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Equality with numeric tolerance; mixed kinds compare by their text.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self, other) {
                (Self::List(a), Self::List(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_eq(y))
                }
                _ => self.to_string() == other.to_string(),
            },
        }
    }

    /// Iterates over the value itself, or over every element of a list.
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
        match self {
            Self::List(items) => Box::new(items.iter()),
            other => Box::new(std::iter::once(other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<_> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Filesystem entry kind required by a path constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Dir,
}

impl PathKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "file" => Some(Self::File),
            "dir" => Some(Self::Dir),
            _ => None,
        }
    }
}

/// A post-parse validation rule attached to an argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The value must name an existing file or directory.
    Path(PathKind),
    /// The value must be one of these.
    Choices(Vec<Value>),
    /// A boolean expression over the argument's own value.
    Expression(Expression),
    /// The value must equal this scalar.
    Equals(Value),
}

impl Constraint {
    /// Classifies a raw configured constraint.
    ///
    /// `"file"`/`"dir"` become path checks, any other string an expression,
    /// a list a choice set and any other scalar an equality check.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyarg_core::{Constraint, PathKind, Value};
    ///
    /// let c = Constraint::from_value(Value::Str("dir".into()));
    /// assert_eq!(c, Constraint::Path(PathKind::Dir));
    ///
    /// let c = Constraint::from_value(Value::Str("x > 2".into()));
    /// assert!(matches!(c, Constraint::Expression(e) if e.source() == " x > 2 "));
    /// ```
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Str(text) => match PathKind::from_keyword(&text) {
                Some(kind) => Self::Path(kind),
                None => Self::Expression(Expression::new(&text)),
            },
            Value::List(items) => Self::Choices(items),
            scalar => Self::Equals(scalar),
        }
    }

    /// Human-readable form used by reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(kind) => kind.keyword().to_string(),
            Self::Choices(items) => Value::List(items.clone()).to_string(),
            Self::Expression(expr) => expr.source().trim().to_string(),
            Self::Equals(value) => value.to_string(),
        }
    }
}

/// A parameter as declared by the wrapped function.
///
/// # Examples
///
/// ```
/// use lazyarg_core::{ParamDecl, Value};
///
/// let p = ParamDecl::new("count").annotated("int").with_default(Value::Int(3));
/// assert_eq!(p.annotation.as_deref(), Some("int"));
/// assert!(p.default.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    /// Type expression such as `int` or `tuple[int, ...]`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// `None` means the parameter is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
            default: None,
        }
    }

    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotation = Some(annotation.to_string());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Declarative stand-in for a function signature plus its docstring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

impl FunctionSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }}

/// Where an argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
    /// A parameter of the wrapped function.
    Param,
    Help,
    Version,
}

/// One command-line option, derived from one function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub kind: ArgumentKind,
    pub type_tag: TypeTag,
    /// `None` means required.
    pub default: Option<Value>,
    pub help: String,
    pub short_name: Option<String>,
    pub constraint: Option<Constraint>,
    /// Display group label.
    pub group: String,
    /// Value used when the option is given without a value.
    pub fill: Option<Value>,
}

impl Argument {
    /// Creates a parameter argument with the generated placeholder help.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyarg_core::{Argument, TypeTag};
    ///
    /// let mut arg = Argument::new("count", TypeTag::STRING, None);
    /// assert_eq!(arg.help, "param count");
    /// assert!(arg.is_required());
    /// assert_eq!(arg.display_name(), "--count");
    /// arg.short_name = Some("c".into());
    /// assert_eq!(arg.display_name(), "-c/--count");
    /// ```
    pub fn new(name: &str, type_tag: TypeTag, default: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            kind: ArgumentKind::Param,
            type_tag,
            default,
            help: format!("param {name}"),
            short_name: None,
            constraint: None,
            group: String::new(),
            fill: None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn is_flag(&self) -> bool {
        self.type_tag.is_flag()
    }

    /// Full display name, `-s/--name` once a short name is assigned.
    pub fn display_name(&self) -> String {
        match &self.short_name {
            Some(short) => format!("-{short}/--{}", self.name),
            None => format!("--{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_parse_bool_literals() {
        assert_eq!(Primitive::Bool.parse("True"), Some(Value::Bool(true)));
        assert_eq!(Primitive::Bool.parse("False"), Some(Value::Bool(false)));
        assert_eq!(Primitive::Bool.parse("yes"), None);
    }

    #[test]
    fn test_type_tag_accepts_numeric_tolerance() {
        assert!(TypeTag::Scalar(Primitive::Int).accepts(&Value::Float(2.0)));
        assert!(TypeTag::Scalar(Primitive::Float).accepts(&Value::Int(2)));
        assert!(!TypeTag::Scalar(Primitive::Int).accepts(&Value::Str("2".into())));

        let pair = TypeTag::Tuple(vec![Primitive::Int, Primitive::Str]);
        assert!(pair.accepts(&Value::List(vec![Value::Int(1), Value::Str("a".into())])));
        assert!(!pair.accepts(&Value::List(vec![Value::Int(1)])));
    }

    #[test]
    fn test_value_normalized() {
        assert_eq!(Value::Float(3.0).normalized(Primitive::Int), Some(Value::Int(3)));
        assert_eq!(Value::Float(3.5).normalized(Primitive::Int), None);
        assert_eq!(Value::Int(3).normalized(Primitive::Float), Some(Value::Float(3.0)));
        assert_eq!(Value::Str("a".into()).normalized(Primitive::Int), None);
    }

    #[test]
    fn test_value_normalized_rejects_out_of_range_int() {
        assert_eq!(Value::Float(1e20).normalized(Primitive::Int), None);
        assert_eq!(Value::Float(-1e20).normalized(Primitive::Int), None);
        assert_eq!(Value::Float(f64::INFINITY).normalized(Primitive::Int), None);
        assert_eq!(
            Value::Float(-9_223_372_036_854_775_808.0).normalized(Primitive::Int),
            Some(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn test_constraint_from_scalar_is_equality() {
        assert_eq!(Constraint::from_value(Value::Int(4)), Constraint::Equals(Value::Int(4)));
        assert_eq!(
            Constraint::from_value(Value::List(vec![Value::Int(1)])),
            Constraint::Choices(vec![Value::Int(1)])
        );
        assert_eq!(Constraint::from_value(Value::Str("file".into())), Constraint::Path(PathKind::File));
    }

    #[test]
    fn test_value_untagged_deserialize() {
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));
        let v: Value = serde_json::from_str("7").unwrap();
        assert_eq!(v, Value::Int(7));
        let v: Value = serde_json::from_str("7.5").unwrap();
        assert_eq!(v, Value::Float(7.5));
    }
}
