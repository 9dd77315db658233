//! Argument model primitives for docstring-driven command lines.
//!
//! This crate holds the backend-independent half of `lazyarg`:
//!
//! - [`FunctionSchema`] / [`ParamDecl`]: the declared function a CLI is
//!   derived from.
//! - [`resolve_type`]: maps type expressions to a [`TypeTag`].
//! - [`allocate_short_names`]: collision-free short option names.
//! - [`Argument`]: one command-line option with its type, default, help,
//!   group and [`Constraint`].
//! - [`check_constraint`] / [`coerce_tokens`]: post-parse validation.
//! - [`Environment`]: delimiters, groups, epilog and version settings.
//!
//! # Example
//!
//! ```
//! use lazyarg_core::*;
//!
//! let tag = resolve_type("tuple[int, ...]", "sizes").unwrap();
//! assert_eq!(tag.arity(), Arity::OneOrMore);
//!
//! let shorts = allocate_short_names(["sizes", "scale"], false);
//! assert_eq!(shorts["scale"], "s");
//! assert_eq!(shorts["sizes"], "S");
//! assert_eq!(shorts["help"], "h");
//!
//! let mut arg = Argument::new("sizes", tag, None);
//! arg.constraint = Some(Constraint::from_value(Value::List(vec![
//!     Value::Int(1),
//!     Value::Int(2),
//! ])));
//! let value = coerce_tokens(&arg, &["1", "2", "2"]).unwrap();
//! assert!(check_constraint(&arg, &value).is_ok());
//! ```

mod env;
mod error;
mod expr;
mod resolve;
mod short_name;
mod types;
mod validate;

pub use env::{Delimiters, Environment, GroupSpec, GroupToken, PARSER_GROUP_TOKEN, group_token};
pub use error::{ConfigError, Result, UsageError};
pub use expr::{CmpOp, Expr, ExprError, Expression, Literal, parse as parse_expression};
pub use resolve::{looks_like_type, normalize_default, resolve_type};
pub use short_name::{HELP_SHORT, VERSION_SHORT, abbreviate, allocate_short_names};
pub use types::*;
pub use validate::{check_constraint, coerce_token, coerce_tokens};
