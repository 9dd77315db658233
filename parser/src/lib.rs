//! Command-line parsers derived from function signatures and docstrings.
//!
//! Given a [`FunctionSchema`](lazyarg_core::FunctionSchema), its docstring and
//! an [`Environment`](lazyarg_core::Environment), [`Lazyparser`] builds one
//! [`Argument`](lazyarg_core::Argument) per parameter: type from the
//! annotation or a docstring type marker, help from the docstring, a short
//! name, a display group and optional fill value and constraint. With the
//! `clap` feature (on by default) the model is rendered as a
//! `clap::Command` and used to parse command lines.
//!
//! # Main entry points
//!
//! - [`scan`]: split a docstring into description and parameter help.
//! - [`Lazyparser::new`] / [`Lazyparser::builder`]: build the model.
//! - [`Lazyparser::invoke_from`] / [`Lazyparser::run`]: parse and call.
//! - [`Lazyparser::report`]: serializable view of the model.
//!
//! # Example
//!
//! ```
//! use lazyarg_core::{Environment, FunctionSchema, ParamDecl, Value};
//! use lazyarg_parser::Lazyparser;
//!
//! let function = FunctionSchema::new("resize")
//!     .with_doc("Resize an image.\n\n:param path: image to resize\n:param scale: (float) factor")
//!     .with_param(ParamDecl::new("path"))
//!     .with_param(ParamDecl::new("scale").with_default(Value::Float(1.0)));
//! let env = Environment::default().with_standalone(false);
//!
//! let parser = Lazyparser::builder(&function, &env)
//!     .with_constraint("scale", Value::Str("0 < scale <= 4".into()))
//!     .build()
//!     .unwrap();
//!
//! # #[cfg(feature = "clap")]
//! # {
//! let scale = parser
//!     .invoke_from(["resize", "-p", "cat.png", "-s", "2.5"], |args| args.float("scale"))
//!     .unwrap();
//! assert_eq!(scale, Some(2.5));
//!
//! assert!(parser.invoke_from(["resize", "-p", "cat.png", "-s", "9"], |_| ()).is_err());
//! # }
//! ```

mod bindings;
mod docstring;
mod groups;
mod model;
mod report;

#[cfg(feature = "clap")]
mod backend;
#[cfg(feature = "clap")]
mod invoke;

pub use bindings::Bindings;
pub use docstring::{ScannedDoc, TypeMarker, extract_type_marker, scan};
pub use groups::{OPTIONAL_TITLE, REQUIRED_TITLE, assign_groups, display_order, optional_title};
pub use model::{Lazyparser, LazyparserBuilder};
pub use report::{ArgumentReport, ParserReport};

#[cfg(feature = "clap")]
pub use backend::{bind, command};
#[cfg(feature = "clap")]
pub use invoke::InvokeError;
