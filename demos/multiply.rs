//! Wrapping a function as a command line.
//!
//! Declares `multiply(x: int, y: int)` with a docstring, builds its parser
//! and calls it with the process arguments.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p lazyarg-demos --example multiply -- -x 7 -y 8
//! cargo run -p lazyarg-demos --example multiply -- --help
//! ```

use lazyarg_core::{Environment, FunctionSchema, ParamDecl, Value};
use lazyarg_parser::{InvokeError, Lazyparser};

fn multiply(x: i64, y: i64, negate: bool) -> i64 {
    let product = x * y;
    if negate { -product } else { product }
}

fn main() {
    let function = FunctionSchema::new("multiply")
        .with_doc(
            "Multiply two integers.\n\n\
             :param x: first factor\n\
             :param y: second factor\n\
             :param negate: (bool) flip the sign of the result",
        )
        .with_param(ParamDecl::new("x").annotated("int"))
        .with_param(ParamDecl::new("y").annotated("int").with_default(Value::Int(1)))
        .with_param(ParamDecl::new("negate"));

    let env = Environment::default()
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_epilog("Both factors must be between -1000 and 1000.");

    let parser = Lazyparser::builder(&function, &env)
        .with_constraint("x", Value::Str("-1000 <= x <= 1000".into()))
        .with_constraint("y", Value::Str("-1000 <= y <= 1000".into()))
        .build()
        .unwrap_or_else(|err| InvokeError::from(err).exit());

    let result = parser
        .run(|args| {
            multiply(
                args.int("x").unwrap_or_default(),
                args.int("y").unwrap_or(1),
                args.flag("negate").unwrap_or_default(),
            )
        })
        .unwrap_or_else(|err| err.exit());

    println!("{result}");
}
