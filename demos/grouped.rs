//! Display groups, fill values and the model report.
//!
//! Builds a parser with custom delimiters and two display groups, prints
//! the model as JSON, then parses a fixed command line without exiting.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p lazyarg-demos --example grouped
//! ```

use lazyarg_core::{Delimiters, Environment, FunctionSchema, GroupSpec, ParamDecl, Value};
use lazyarg_parser::Lazyparser;

fn main() {
    let function = FunctionSchema::new("convert")
        .with_doc(
            "Convert images between formats.
@arg source - (str) input image
@arg target - output image
@arg quality - (int) compression quality
@arg sizes - (tuple[int, ...]) thumbnail sizes",
        )
        .with_param(ParamDecl::new("source"))
        .with_param(ParamDecl::new("target"))
        .with_param(ParamDecl::new("quality").with_default(Value::Int(85)))
        .with_param(ParamDecl::new("sizes").with_default(Value::Int(64)));

    let env = Environment::default()
        .with_delimiters(Delimiters::new("@arg", "-"))
        .with_groups(vec![
            GroupSpec::new("Files", ["source", "target"]),
            GroupSpec::new("Encoding", ["help", "quality", "sizes"]),
        ])
        .with_standalone(false);

    let parser = Lazyparser::builder(&function, &env)
        .with_fill("quality", Value::Int(100))
        .with_constraint("quality", Value::Str("0 <= quality <= 100".into()))
        .build()
        .expect("valid declaration");

    match serde_json::to_string_pretty(&parser.report()) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("cannot render report: {err}"),
    }

    let argv = ["convert", "-S", "cat.png", "-t", "cat.webp", "-q", "-s", "32", "128"];
    match parser.parse_from(argv) {
        Ok(bindings) => {
            for (name, value) in bindings.iter() {
                println!("{name} = {value}");
            }
        }
        Err(err) => eprintln!("{err}"),
    }
}
