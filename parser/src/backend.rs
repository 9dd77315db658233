//! Handoff of the argument model to clap.
//!
//! [`command`] renders a [`Lazyparser`] as a [`clap::Command`]; [`bind`]
//! turns the resulting matches back into typed [`Bindings`] and runs the
//! constraint checks. Constraint failures are raised through
//! [`Command::error`] so they share clap's format and exit code.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use lazyarg_core::{
    Argument, ArgumentKind, Primitive, TypeTag, UsageError, Value, check_constraint, coerce_tokens,
};

use crate::bindings::Bindings;
use crate::model::Lazyparser;

/// Builds the clap command for `parser`.
///
/// # Examples
///
/// ```
/// use lazyarg_core::{Environment, FunctionSchema, ParamDecl};
/// use lazyarg_parser::{Lazyparser, command};
///
/// let function = FunctionSchema::new("demo").with_param(ParamDecl::new("name"));
/// let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
/// let cmd = command(&parser);
/// assert!(cmd.get_arguments().any(|a| a.get_long() == Some("name")));
/// ```
pub fn command(parser: &Lazyparser) -> Command {
    let mut cmd = Command::new(parser.name().to_string())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true);
    if !parser.description().is_empty() {
        cmd = cmd.about(parser.description().to_string());
    }
    if let Some(epilog) = parser.epilog() {
        cmd = cmd.after_help(epilog.to_string());
    }
    if let Some(version) = parser.version() {
        cmd = cmd.version(version.to_string());
    }

    let longs: HashSet<&str> = parser.arguments().map(|a| a.name.as_str()).collect();
    for (position, argument) in parser.arguments().enumerate() {
        cmd = cmd.arg(render(argument, position, &longs));
    }
    cmd
}

fn render(argument: &Argument, position: usize, longs: &HashSet<&str>) -> Arg {
    let mut arg = Arg::new(argument.name.clone())
        .long(argument.name.clone())
        .help(argument.help.clone())
        .help_heading(argument.group.clone())
        .display_order(position);

    if let Some(short) = &argument.short_name {
        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => arg = arg.short(c),
            _ if !longs.contains(short.as_str()) => arg = arg.visible_alias(short.clone()),
            _ => {}
        }
    }

    match argument.kind {
        ArgumentKind::Help => return arg.action(ArgAction::Help),
        ArgumentKind::Version => return arg.action(ArgAction::Version),
        ArgumentKind::Param => {}
    }

    if argument.is_required() {
        arg = arg.required(true);
    }

    match &argument.type_tag {
        TypeTag::Scalar(Primitive::Bool) => arg.action(ArgAction::SetTrue),
        TypeTag::Scalar(primitive) => {
            arg = arg.action(ArgAction::Set).value_name(primitive.name().to_uppercase());
            arg = match primitive {
                Primitive::Int => arg.value_parser(value_parser!(i64)).allow_negative_numbers(true),
                Primitive::Float => arg.value_parser(value_parser!(f64)).allow_negative_numbers(true),
                _ => arg.value_parser(value_parser!(String)),
            };
            if let Some(default) = &argument.default {
                arg = arg.default_value(default.to_string());
            }
            if let Some(fill) = &argument.fill {
                arg = arg.num_args(0..=1).default_missing_value(fill.to_string());
            }
            arg
        }
        TypeTag::Tuple(slots) => {
            let names: Vec<String> = slots.iter().map(|p| p.name().to_uppercase()).collect();
            arg = arg
                .action(ArgAction::Set)
                .num_args(slots.len())
                .value_names(names)
                .allow_negative_numbers(true);
            with_list_default(arg, argument.default.as_ref())
        }
        TypeTag::Repeated(primitive) => {
            arg = arg
                .action(ArgAction::Append)
                .num_args(1..)
                .value_name(primitive.name().to_uppercase())
                .allow_negative_numbers(true);
            with_list_default(arg, argument.default.as_ref())
        }
    }
}

/// Rewrites multi-character short options into the long option they stand
/// for, since clap only knows single-character shorts.
///
/// `-al` and `-al=VALUE` become `--alpha` and `--alpha=VALUE` when `al` is
/// the short name of `alpha`. Tokens after `--` are left alone.
pub(crate) fn expand_short_names(parser: &Lazyparser, args: Vec<OsString>) -> Vec<OsString> {
    let longs: HashMap<String, &str> = parser
        .arguments()
        .filter_map(|a| {
            let short = a.short_name.as_deref()?;
            (short.chars().count() > 1).then(|| (format!("-{short}"), a.name.as_str()))
        })
        .collect();
    if longs.is_empty() {
        return args;
    }

    let mut terminated = false;
    args.into_iter()
        .enumerate()
        .map(|(index, token)| {
            if index == 0 || terminated {
                return token;
            }
            let Some(text) = token.to_str() else {
                return token;
            };
            if text == "--" {
                terminated = true;
                return token;
            }
            let (flag, value) = match text.split_once('=') {
                Some((flag, value)) => (flag, Some(value)),
                None => (text, None),
            };
            match (longs.get(flag), value) {
                (Some(long), Some(value)) => OsString::from(format!("--{long}={value}")),
                (Some(long), None) => OsString::from(format!("--{long}")),
                (None, _) => token,
            }
        })
        .collect()
}

fn with_list_default(arg: Arg, default: Option<&Value>) -> Arg {
    match default {
        Some(value) => arg.default_values(value.elements().map(ToString::to_string)),
        None => arg,
    }
}

/// Reads every parameter out of `matches`, coerces it and checks its
/// constraint.
///
/// # Errors
///
/// A clap error of kind [`ErrorKind::ValueValidation`] carrying the
/// [`UsageError`] message.
pub fn bind(parser: &Lazyparser, cmd: &mut Command, matches: &ArgMatches) -> Result<Bindings, clap::Error> {
    let mut bindings = Bindings::default();
    for argument in parser.params() {
        let value = read(argument, matches).map_err(|err| usage(cmd, &err))?;
        // An empty list default registers no values with clap.
        let Some(value) = value.or_else(|| argument.default.clone()) else {
            continue;
        };
        if let Some(warning) = check_constraint(argument, &value).map_err(|err| usage(cmd, &err))? {
            bindings.push_warning(warning);
        }
        bindings.insert(&argument.name, value);
    }
    Ok(bindings)
}

fn read(argument: &Argument, matches: &ArgMatches) -> Result<Option<Value>, UsageError> {
    let id = argument.name.as_str();
    let value = match &argument.type_tag {
        TypeTag::Scalar(Primitive::Bool) => Some(Value::Bool(matches.get_flag(id))),
        TypeTag::Scalar(Primitive::Int) => matches.get_one::<i64>(id).copied().map(Value::Int),
        TypeTag::Scalar(Primitive::Float) => matches.get_one::<f64>(id).copied().map(Value::Float),
        TypeTag::Scalar(Primitive::Str) => matches.get_one::<String>(id).cloned().map(Value::Str),
        TypeTag::Tuple(_) | TypeTag::Repeated(_) => match matches.get_many::<String>(id) {
            Some(raw) => Some(coerce_tokens(argument, &raw.collect::<Vec<_>>())?),
            None => None,
        },
    };
    Ok(value)
}

fn usage(cmd: &mut Command, err: &UsageError) -> clap::Error {
    cmd.error(ErrorKind::ValueValidation, err.to_string())
}

#[cfg(test)]
mod tests {
    use lazyarg_core::{Environment, FunctionSchema, ParamDecl};

    use super::*;

    fn parse(function: &FunctionSchema, args: &[&str]) -> Result<Bindings, clap::Error> {
        let parser = Lazyparser::new(function, &Environment::default()).unwrap();
        let mut cmd = command(&parser);
        let matches = cmd.try_get_matches_from_mut(std::iter::once(function.name.as_str()).chain(args.iter().copied()))?;
        bind(&parser, &mut cmd, &matches)
    }

    #[test]
    fn test_command_is_consistent() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("alpha").annotated("int"))
            .with_param(ParamDecl::new("ALPHA").annotated("float").with_default(Value::Float(0.5)))
            .with_param(ParamDecl::new("pair").annotated("tuple[int, str]").with_default(Value::List(vec![
                Value::Int(1),
                Value::Str("a".into()),
            ])))
            .with_param(ParamDecl::new("many").annotated("tuple[float, ...]").with_default(Value::Int(1)))
            .with_param(ParamDecl::new("loud").annotated("bool"));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        command(&parser).debug_assert();
    }

    #[test]
    fn test_scalars_and_defaults() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("count").annotated("int"))
            .with_param(ParamDecl::new("ratio").annotated("float").with_default(Value::Float(0.5)))
            .with_param(ParamDecl::new("name").with_default(Value::Str("anon".into())))
            .with_param(ParamDecl::new("loud").annotated("bool"));

        let bindings = parse(&function, &["-c", "-3"]).unwrap();
        assert_eq!(bindings.int("count"), Some(-3));
        assert_eq!(bindings.float("ratio"), Some(0.5));
        assert_eq!(bindings.str("name"), Some("anon"));
        assert_eq!(bindings.flag("loud"), Some(false));

        let bindings = parse(&function, &["--count", "2", "-l", "-n", "bob"]).unwrap();
        assert_eq!(bindings.flag("loud"), Some(true));
        assert_eq!(bindings.str("name"), Some("bob"));
    }

    #[test]
    fn test_missing_required() {
        let function = FunctionSchema::new("tool").with_param(ParamDecl::new("count").annotated("int"));
        let err = parse(&function, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_tuple_values() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("pair").annotated("tuple[int, str]"))
            .with_param(ParamDecl::new("sizes").annotated("tuple[int, ...]").with_default(Value::Int(1)));

        let bindings = parse(&function, &["-p", "4", "four", "-s", "1", "2", "-s", "3"]).unwrap();
        assert_eq!(
            bindings.get("pair"),
            Some(&Value::List(vec![Value::Int(4), Value::Str("four".into())]))
        );
        assert_eq!(
            bindings.get("sizes"),
            Some(&Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
        );

        let bindings = parse(&function, &["-p", "4", "four"]).unwrap();
        assert_eq!(bindings.get("sizes"), Some(&Value::List(vec![Value::Int(1)])));

        let err = parse(&function, &["-p", "four", "4"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("argument -p/--pair"));
    }

    #[test]
    fn test_fill_value() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("level").annotated("int").with_default(Value::Int(0)));
        let env = Environment::default();
        let parser = Lazyparser::builder(&function, &env)
            .with_fill("level", Value::Int(3))
            .build()
            .unwrap();

        let run = |args: &[&str]| {
            let mut cmd = command(&parser);
            let matches = cmd
                .try_get_matches_from_mut(std::iter::once("tool").chain(args.iter().copied()))
                .unwrap();
            bind(&parser, &mut cmd, &matches).unwrap()
        };
        assert_eq!(run(&[]).int("level"), Some(0));
        assert_eq!(run(&["-l"]).int("level"), Some(3));
        assert_eq!(run(&["-l", "7"]).int("level"), Some(7));
    }

    #[test]
    fn test_multi_char_short_becomes_alias() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("a").with_default(Value::Str(String::new())))
            .with_param(ParamDecl::new("alpha").with_default(Value::Str(String::new())))
            .with_param(ParamDecl::new("Alpha").with_default(Value::Str(String::new())));
        // sorted: Alpha -> "a", a -> "A", alpha -> "al"
        let bindings = parse(&function, &["--al", "x"]).unwrap();
        assert_eq!(bindings.str("alpha"), Some("x"));
    }

    #[test]
    fn test_expand_multi_char_short_names() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("a").with_default(Value::Str(String::new())))
            .with_param(ParamDecl::new("alpha").with_default(Value::Str(String::new())))
            .with_param(ParamDecl::new("Alpha").with_default(Value::Str(String::new())));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        let args = ["tool", "-al", "x", "-al=y", "-a", "z", "--", "-al"]
            .map(OsString::from)
            .to_vec();
        let expanded = expand_short_names(&parser, args);
        let expected = ["tool", "--alpha", "x", "--alpha=y", "-a", "z", "--", "-al"].map(OsString::from);
        assert_eq!(expanded, expected);
    }

    #[test]
    fn test_empty_list_default_is_bound() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("sizes").annotated("tuple[int, ...]").with_default(Value::List(Vec::new())));
        let bindings = parse(&function, &[]).unwrap();
        assert_eq!(bindings.get("sizes"), Some(&Value::List(Vec::new())));

        let bindings = parse(&function, &["-s", "3", "4"]).unwrap();
        assert_eq!(bindings.get("sizes"), Some(&Value::List(vec![Value::Int(3), Value::Int(4)])));
    }

    #[test]
    fn test_constraint_failure_is_value_validation() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("n").annotated("int").with_default(Value::Int(1)));
        let env = Environment::default();
        let parser = Lazyparser::builder(&function, &env)
            .with_constraint("n", Value::List(vec![Value::Int(1), Value::Int(2)]))
            .build()
            .unwrap();
        let mut cmd = command(&parser);
        let matches = cmd.try_get_matches_from_mut(["tool", "-n", "5"]).unwrap();
        let err = bind(&parser, &mut cmd, &matches).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("invalid choice 5 (choose from 1, 2)"));
    }
}
