//! End-to-end scenarios: function schema in, parsed values out.

use std::fs;

use lazyarg_core::{
    Arity, ConfigError, Delimiters, Environment, FunctionSchema, GroupSpec, ParamDecl, Primitive,
    TypeTag, Value, allocate_short_names, resolve_type,
};
use lazyarg_parser::{InvokeError, Lazyparser, OPTIONAL_TITLE, REQUIRED_TITLE, scan};

fn non_standalone() -> Environment {
    Environment::default().with_standalone(false)
}

fn display_names(parser: &Lazyparser) -> Vec<String> {
    parser.arguments().map(|a| a.name.clone()).collect()
}

#[test]
fn test_multiply_scenario() {
    let function = FunctionSchema::new("multiply")
        .with_doc("Multiply x by y.\n\n:param x: first factor\n:param y: second factor")
        .with_param(ParamDecl::new("x").annotated("int"))
        .with_param(ParamDecl::new("y").annotated("int"));
    let parser = Lazyparser::new(&function, &non_standalone()).unwrap();

    let product = parser
        .invoke_from(["multiply", "-x", "7", "-y", "8"], |args| {
            args.int("x").unwrap() * args.int("y").unwrap()
        })
        .unwrap();
    assert_eq!(product, 56);
}

#[test]
fn test_docstring_help_without_marker_keeps_string_type() {
    let function = FunctionSchema::new("f")
        .with_doc(":param x: a number x")
        .with_param(ParamDecl::new("x"));
    let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
    let x = parser.argument("x").unwrap();
    assert_eq!(x.type_tag, TypeTag::STRING);
    assert_eq!(x.help, "a number x");
}

#[test]
fn test_undocumented_parameter_gets_generated_help() {
    let function = FunctionSchema::new("f")
        .with_doc("Nothing here.\n:param ghost: not a parameter")
        .with_param(ParamDecl::new("real"));
    let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
    assert_eq!(parser.argument("real").unwrap().help, "param real");
    assert!(parser.argument("ghost").is_none());
}

#[test]
fn test_group_display_order() {
    let mut function = FunctionSchema::new("f");
    for name in ["v", "w", "x", "y", "z"] {
        function = function.with_param(ParamDecl::new(name).with_default(Value::Int(0)));
    }
    let env = Environment::default().with_groups(vec![GroupSpec::new("Foo", ["v", "w", "x"])]);
    let parser = Lazyparser::new(&function, &env).unwrap();

    assert_eq!(display_names(&parser), ["v", "w", "x", "help", "y", "z"]);
    assert_eq!(parser.argument("w").unwrap().group, "Foo");
    assert_eq!(parser.argument("y").unwrap().group, OPTIONAL_TITLE);
}

#[test]
fn test_explicit_group_order() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("src"))
        .with_param(ParamDecl::new("dst"))
        .with_param(ParamDecl::new("verbose").annotated("bool"));
    let env = Environment::default()
        .with_groups(vec![
            GroupSpec::new("Input", ["src"]),
            GroupSpec::new("Output", ["dst"]),
            GroupSpec::new("Misc", ["help", "verbose"]),
        ])
        .with_group_order(["Misc", "Output"]);
    let parser = Lazyparser::new(&function, &env).unwrap();
    assert_eq!(display_names(&parser), ["verbose", "help", "dst", "src"]);
    assert_eq!(parser.argument("help").unwrap().group, "Misc");
}

#[test]
fn test_tuple_arity() {
    let many = resolve_type("tuple[int, ...]", "a").unwrap();
    assert_eq!(many, TypeTag::Repeated(Primitive::Int));
    assert_eq!(many.arity(), Arity::OneOrMore);

    let pair = resolve_type("tuple[int, str]", "a").unwrap();
    assert_eq!(pair.arity(), Arity::Fixed(2));
    assert_eq!(pair, TypeTag::Tuple(vec![Primitive::Int, Primitive::Str]));
}

#[test]
fn test_reserved_help_is_fatal() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("x"))
        .with_param(ParamDecl::new("help").with_default(Value::Bool(false)));
    let err = Lazyparser::new(&function, &Environment::default()).unwrap_err();
    assert!(matches!(err, ConfigError::ReservedName(_)));
    assert_eq!(InvokeError::from(err).exit_code(), 1);
}

#[test]
fn test_required_default_split() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("a"))
        .with_param(ParamDecl::new("b").with_default(Value::Str("b".into())))
        .with_param(ParamDecl::new("c").annotated("int"))
        .with_param(ParamDecl::new("d").annotated("float").with_default(Value::Float(1.5)));
    let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
    for arg in parser.params() {
        let expected = if arg.default.is_none() { REQUIRED_TITLE } else { OPTIONAL_TITLE };
        assert_eq!(arg.group, expected, "{}", arg.name);
    }
}

#[test]
fn test_rescan_is_idempotent() {
    let doc = "  Title line.\n\n  :param a: (int) one\n  :param b: two: three\n";
    let delimiters = Delimiters::default().with_tab(2);
    let first = scan(doc, &delimiters);
    let second = scan(doc, &delimiters);
    assert_eq!(first, second);
    assert_eq!(first.description, "Title line.");
}

#[test]
fn test_short_names_unique_with_version() {
    let names = ["verbose", "value", "Value", "v", "version_tag"];
    let shorts = allocate_short_names(names, true);
    assert_eq!(shorts.len(), names.len() + 2);
    let mut seen: Vec<&String> = shorts.values().collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), shorts.len());
    assert!(names.iter().all(|n| shorts[*n] != "h" && shorts[*n] != "V"));
}

#[test]
fn test_help_exit_code_non_standalone() {
    let function = FunctionSchema::new("f").with_param(ParamDecl::new("x").annotated("int"));
    let parser = Lazyparser::new(&function, &non_standalone()).unwrap();
    let err = parser.invoke_from(["f", "--help"], |_| ()).unwrap_err();
    assert_eq!(err.exit_code(), 0);
    let rendered = err.to_string();
    assert!(rendered.contains("-x, --x <INT>"));
    assert!(rendered.contains(REQUIRED_TITLE));
}

#[test]
fn test_help_text_includes_epilog_and_description() {
    let function = FunctionSchema::new("f")
        .with_doc("Does things.\n:param x: the x")
        .with_param(ParamDecl::new("x").with_default(Value::Str("a".into())));
    let env = non_standalone().with_epilog("Report bugs upstream.");
    let parser = Lazyparser::new(&function, &env).unwrap();
    let rendered = parser.command().render_help().to_string();
    assert!(rendered.contains("Does things."));
    assert!(rendered.contains("the x"));
    assert!(rendered.contains("Report bugs upstream."));
}

#[test]
fn test_missing_required_is_usage_error() {
    let function = FunctionSchema::new("f").with_param(ParamDecl::new("x").annotated("int"));
    let parser = Lazyparser::new(&function, &non_standalone()).unwrap();
    let err = parser.invoke_from(["f"], |_| ()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("--x"));
}

#[test]
fn test_bool_inside_tuple_rejected() {
    let function = FunctionSchema::new("f").with_param(ParamDecl::new("t").annotated("tuple[bool, int]"));
    assert!(matches!(
        Lazyparser::new(&function, &Environment::default()),
        Err(ConfigError::UnsupportedType { .. })
    ));
}

#[test]
fn test_path_constraints() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("data.csv");
    fs::write(&file, "a,b").unwrap();
    let file = file.to_string_lossy().to_string();
    let dir_path = dir.path().to_string_lossy().to_string();

    let function = FunctionSchema::new("load")
        .with_param(ParamDecl::new("input"))
        .with_param(ParamDecl::new("out").with_default(Value::Str(".".into())));
    let env = non_standalone();
    let parser = Lazyparser::builder(&function, &env)
        .with_constraint("input", Value::Str("file".into()))
        .with_constraint("out", Value::Str("dir".into()))
        .build()
        .unwrap();

    assert!(parser.parse_from(["load", "-i", file.as_str(), "-o", dir_path.as_str()]).is_ok());

    let err = parser.parse_from(["load", "-i", dir_path.as_str()]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("it must be an existing file"));
}

#[test]
fn test_expression_constraint_by_short_name() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("number").annotated("int").with_default(Value::Int(1)));
    let env = non_standalone();
    let parser = Lazyparser::builder(&function, &env)
        .with_constraint("number", Value::Str("n >= 0 and n < 10".into()))
        .build()
        .unwrap();

    assert_eq!(parser.parse_from(["f", "-n", "4"]).unwrap().int("number"), Some(4));
    let err = parser.parse_from(["f", "-n", "12"]).unwrap_err();
    assert!(err.to_string().contains("it must respect: n >= 0 and n < 10"));
}

#[test]
fn test_expression_without_name_is_ignored() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("count").annotated("int").with_default(Value::Int(1)));
    let env = non_standalone();
    let parser = Lazyparser::builder(&function, &env)
        .with_constraint("count", Value::Str("other > 3".into()))
        .build()
        .unwrap();

    let bindings = parser.parse_from(["f", "-c", "1"]).unwrap();
    assert_eq!(bindings.int("count"), Some(1));
    assert_eq!(bindings.warnings().len(), 1);
}

#[test]
fn test_repeated_choices() {
    let function = FunctionSchema::new("f")
        .with_param(ParamDecl::new("colors").annotated("tuple[str, ...]").with_default(Value::Str("red".into())));
    let env = non_standalone();
    let choices = Value::List(vec![Value::Str("red".into()), Value::Str("blue".into())]);
    let parser = Lazyparser::builder(&function, &env)
        .with_constraint("colors", choices)
        .build()
        .unwrap();

    let ok = parser.parse_from(["f", "-c", "red", "blue"]).unwrap();
    assert_eq!(ok.list("colors").map(<[Value]>::len), Some(2));
    assert!(parser.parse_from(["f", "-c", "red", "green"]).is_err());
}

#[test]
fn test_environment_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.yaml");
    fs::write(
        &path,
        "delimiters:\n  primary: \"@param\"\ngroups:\n  - name: Main\n    members: [a]\nstandalone: false\n",
    )
    .unwrap();
    let env = Environment::load(&path).unwrap();

    let function = FunctionSchema::new("f")
        .with_doc("Doc.\n@param a: (int) the a")
        .with_param(ParamDecl::new("a"));
    let parser = Lazyparser::new(&function, &env).unwrap();
    let a = parser.argument("a").unwrap();
    assert_eq!(a.type_tag, TypeTag::Scalar(Primitive::Int));
    assert_eq!(a.group, "Main");
    assert!(!parser.standalone());
}
