//! Argument model construction.
//!
//! [`Lazyparser`] combines a [`FunctionSchema`] with its docstring, the
//! [`Environment`], fill values and constraints into the full set of
//! [`Argument`]s, in display order, ready to be handed to a backend.

use std::collections::{BTreeMap, HashSet};

use lazyarg_core::{
    Argument, ArgumentKind, ConfigError, Constraint, Environment, FunctionSchema, HELP_ARGUMENT,
    Primitive, Result, TypeTag, VERSION_ARGUMENT, Value, allocate_short_names, normalize_default,
    resolve_type,
};
use tracing::{debug, warn};

use crate::docstring::{extract_type_marker, scan};
use crate::groups::{assign_groups, display_order};
use crate::report::{ArgumentReport, ParserReport};

const HELP_TEXT: &str = "show this help message and exit";
const VERSION_TEXT: &str = "show program's version number and exit";

/// A built argument model.
///
/// # Examples
///
/// ```
/// use lazyarg_core::{Environment, FunctionSchema, ParamDecl, Value};
/// use lazyarg_parser::Lazyparser;
///
/// let function = FunctionSchema::new("greet")
///     .with_doc("Say hello.\n:param name: (str) who to greet\n:param times: how often")
///     .with_param(ParamDecl::new("name"))
///     .with_param(ParamDecl::new("times").annotated("int").with_default(Value::Int(1)));
///
/// let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
/// assert_eq!(parser.description(), "Say hello.");
///
/// let name = parser.argument("name").unwrap();
/// assert!(name.is_required());
/// assert_eq!(name.help, "who to greet");
/// assert_eq!(name.short_name.as_deref(), Some("n"));
/// ```
#[derive(Debug, Clone)]
pub struct Lazyparser {
    name: String,
    description: String,
    epilog: Option<String>,
    version: Option<String>,
    standalone: bool,
    /// Declaration order: parameters, then `help`, then `version`.
    arguments: Vec<Argument>,
    order: Vec<usize>,
    warnings: Vec<String>,
}

impl Lazyparser {
    /// Builds the model without fill values or constraints.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] found while building.
    pub fn new(function: &FunctionSchema, env: &Environment) -> Result<Self> {
        Self::builder(function, env).build()
    }

    pub fn builder<'a>(function: &'a FunctionSchema, env: &'a Environment) -> LazyparserBuilder<'a> {
        LazyparserBuilder {
            function,
            env,
            fill: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Program name, taken from the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn standalone(&self) -> bool {
        self.standalone
    }

    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Arguments in display order.
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.order.iter().map(|&i| &self.arguments[i])
    }

    /// Function parameters only, in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|a| a.kind == ArgumentKind::Param)
    }

    /// Soft warnings raised while building.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Serializable summary of the model.
    pub fn report(&self) -> ParserReport {
        ParserReport {
            name: self.name.clone(),
            description: self.description.clone(),
            epilog: self.epilog.clone(),
            version: self.version.clone(),
            arguments: self.arguments().map(ArgumentReport::from).collect(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Collects fill values and constraints before building a [`Lazyparser`].
///
/// # Examples
///
/// ```
/// use lazyarg_core::{Constraint, Environment, FunctionSchema, ParamDecl, Value};
/// use lazyarg_parser::Lazyparser;
///
/// let function = FunctionSchema::new("scale")
///     .with_param(ParamDecl::new("factor").annotated("float").with_default(Value::Float(1.0)));
/// let env = Environment::default();
///
/// let parser = Lazyparser::builder(&function, &env)
///     .with_fill("factor", Value::Int(2))
///     .with_constraint("factor", Value::Str("factor > 0".into()))
///     .build()
///     .unwrap();
///
/// let factor = parser.argument("factor").unwrap();
/// assert_eq!(factor.fill, Some(Value::Float(2.0)));
/// assert!(matches!(factor.constraint, Some(Constraint::Expression(_))));
/// ```
#[derive(Debug, Clone)]
pub struct LazyparserBuilder<'a> {
    function: &'a FunctionSchema,
    env: &'a Environment,
    fill: Vec<(String, Value)>,
    constraints: Vec<(String, Value)>,
}

impl LazyparserBuilder<'_> {
    /// Value used when `name` is given without a value.
    pub fn with_fill(mut self, name: &str, value: Value) -> Self {
        self.fill.push((name.to_string(), value));
        self
    }

    /// Raw constraint, classified by [`Constraint::from_value`].
    pub fn with_constraint(mut self, name: &str, value: Value) -> Self {
        self.constraints.push((name.to_string(), value));
        self
    }

    /// Builds the argument model.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`]: invalid environment, reserved or
    /// duplicate parameter name, unsupported type, invalid default or an
    /// unusable fill value.
    pub fn build(self) -> Result<Lazyparser> {
        let Self {
            function,
            env,
            fill,
            constraints,
        } = self;

        let tokens = env.validate()?;
        debug!(function = %function.name, groups = tokens.len(), "building argument model");

        let with_version = env.version.is_some();
        check_names(function, with_version)?;

        let shorts = allocate_short_names(function.params.iter().map(|p| p.name.as_str()), with_version);
        let doc = scan(function.doc.as_deref().unwrap_or_default(), &env.delimiters);
        let mut warnings = Vec::new();

        let mut arguments = Vec::with_capacity(function.params.len() + 2);
        for param in &function.params {
            let mut arg = Argument::new(&param.name, TypeTag::STRING, None);
            arg.short_name = shorts.get(&param.name).cloned();
            let shown = arg.display_name();
            let documented = doc.params.get(&param.name).map_or("", String::as_str);

            let help = match &param.annotation {
                Some(declared) => {
                    arg.type_tag = resolve_type(declared, &shown)?;
                    documented.to_string()
                }
                None => {
                    let marker = extract_type_marker(documented);
                    if marker.ignored > 0 {
                        note(
                            &mut warnings,
                            format!("argument {shown}: several type markers found, the first one is used"),
                        );
                    }
                    if let Some(declared) = &marker.declared {
                        arg.type_tag = resolve_type(declared, &shown)?;
                    }
                    marker.help
                }
            };
            if !help.is_empty() {
                arg.help = help;
            }

            let (default, warning) = normalize_default(&arg.type_tag, param.default.as_ref(), &shown)?;
            arg.default = default;
            if let Some(warning) = warning {
                note(&mut warnings, warning);
            }

            debug!(argument = %shown, type_tag = %arg.type_tag, required = arg.is_required(), "resolved argument");
            arguments.push(arg);
        }

        for (name, value) in &fill {
            match arguments.iter_mut().find(|a| &a.name == name) {
                Some(arg) => apply_fill(arg, value)?,
                None => note(&mut warnings, format!("fill value for unknown argument '{name}' ignored")),
            }
        }

        for (name, value) in constraints {
            match arguments.iter_mut().find(|a| a.name == name) {
                Some(arg) => arg.constraint = Some(Constraint::from_value(value)),
                None => note(&mut warnings, format!("constraint for unknown argument '{name}' ignored")),
            }
        }

        arguments.push(builtin(HELP_ARGUMENT, ArgumentKind::Help, HELP_TEXT, &shorts));
        if with_version {
            arguments.push(builtin(VERSION_ARGUMENT, ArgumentKind::Version, VERSION_TEXT, &shorts));
        }

        assign_groups(&mut arguments, &env.groups);
        let order = display_order(&arguments, &tokens, env.group_order.as_deref())?;

        Ok(Lazyparser {
            name: function.name.clone(),
            description: doc.description,
            epilog: env.epilog.clone(),
            version: env.version.clone(),
            standalone: env.standalone,
            arguments,
            order,
            warnings,
        })
    }
}

fn check_names(function: &FunctionSchema, with_version: bool) -> Result<()> {
    let mut seen = HashSet::new();
    for param in &function.params {
        if param.name == HELP_ARGUMENT || (with_version && param.name == VERSION_ARGUMENT) {
            return Err(ConfigError::ReservedName(param.name.clone()));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(ConfigError::DuplicateParameter(param.name.clone()));
        }
    }
    Ok(())
}

fn apply_fill(arg: &mut Argument, value: &Value) -> Result<()> {
    let display = arg.display_name();
    let primitive = match arg.type_tag {
        TypeTag::Scalar(p) if p != Primitive::Bool => p,
        ref other => {
            return Err(ConfigError::UnsupportedFillType {
                argument: display,
                type_name: other.to_string(),
            });
        }
    };
    if arg.default.is_none() {
        return Err(ConfigError::MissingDefaultForFill(display));
    }
    let normalized = value
        .normalized(primitive)
        .ok_or_else(|| ConfigError::FillTypeMismatch {
            argument: display,
            expected: primitive.name().to_string(),
        })?;
    arg.fill = Some(normalized);
    Ok(())
}

fn builtin(
    name: &str,
    kind: ArgumentKind,
    help: &str,
    shorts: &BTreeMap<String, String>,
) -> Argument {
    let mut arg = Argument::new(name, TypeTag::Scalar(Primitive::Bool), Some(Value::Bool(false)));
    arg.kind = kind;
    arg.help = help.to_string();
    arg.short_name = shorts.get(name).cloned();
    arg
}

fn note(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

#[cfg(test)]
mod tests {
    use lazyarg_core::{GroupSpec, ParamDecl};

    use super::*;
    use crate::groups::{OPTIONAL_TITLE, REQUIRED_TITLE};

    fn multiply() -> FunctionSchema {
        FunctionSchema::new("multiply")
            .with_doc("Multiply.\n:param x: first\n:param y: second")
            .with_param(ParamDecl::new("x").annotated("int"))
            .with_param(ParamDecl::new("y").annotated("int"))
    }

    #[test]
    fn test_reserved_help_name() {
        let function = FunctionSchema::new("f").with_param(ParamDecl::new("help"));
        let err = Lazyparser::new(&function, &Environment::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedName(name) if name == "help"));
    }

    #[test]
    fn test_version_reserved_only_when_configured() {
        let function = FunctionSchema::new("f").with_param(ParamDecl::new("version"));
        assert!(Lazyparser::new(&function, &Environment::default()).is_ok());
        let env = Environment::default().with_version("1.0");
        assert!(matches!(
            Lazyparser::new(&function, &env),
            Err(ConfigError::ReservedName(_))
        ));
    }

    #[test]
    fn test_duplicate_parameter() {
        let function = FunctionSchema::new("f")
            .with_param(ParamDecl::new("a"))
            .with_param(ParamDecl::new("a"));
        assert!(matches!(
            Lazyparser::new(&function, &Environment::default()),
            Err(ConfigError::DuplicateParameter(_))
        ));
    }

    #[test]
    fn test_builtins_appended() {
        let env = Environment::default().with_version("2.1");
        let parser = Lazyparser::new(&multiply(), &env).unwrap();
        let names: Vec<&str> = parser.arguments().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["x", "y", "help", "version"]);
        assert_eq!(parser.argument("help").unwrap().short_name.as_deref(), Some("h"));
        assert_eq!(parser.argument("version").unwrap().short_name.as_deref(), Some("V"));
        assert_eq!(parser.version(), Some("2.1"));
    }

    #[test]
    fn test_required_optional_groups() {
        let function = multiply().with_param(ParamDecl::new("z").with_default(Value::Str("a".into())));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        assert_eq!(parser.argument("x").unwrap().group, REQUIRED_TITLE);
        assert_eq!(parser.argument("z").unwrap().group, OPTIONAL_TITLE);
        assert_eq!(parser.argument("help").unwrap().group, OPTIONAL_TITLE);
    }

    #[test]
    fn test_annotation_beats_docstring_marker() {
        let function = FunctionSchema::new("f")
            .with_doc(":param a: (int) value")
            .with_param(ParamDecl::new("a").annotated("float"));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        let arg = parser.argument("a").unwrap();
        assert_eq!(arg.type_tag, TypeTag::Scalar(Primitive::Float));
        assert_eq!(arg.help, "(int) value");
    }

    #[test]
    fn test_docstring_marker_sets_type() {
        let function = FunctionSchema::new("f")
            .with_doc(":param a: (tuple[int, str]) pair (bool) extra")
            .with_param(ParamDecl::new("a"));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        let arg = parser.argument("a").unwrap();
        assert_eq!(arg.type_tag, TypeTag::Tuple(vec![Primitive::Int, Primitive::Str]));
        assert_eq!(arg.help, "pair (bool) extra");
        assert_eq!(parser.warnings().len(), 1);
    }

    #[test]
    fn test_unsupported_docstring_marker_is_fatal() {
        let function = FunctionSchema::new("f")
            .with_doc(":param a: (list) values")
            .with_param(ParamDecl::new("a"));
        assert!(matches!(
            Lazyparser::new(&function, &Environment::default()),
            Err(ConfigError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_bool_default_overridden() {
        let function = FunctionSchema::new("f")
            .with_param(ParamDecl::new("loud").annotated("bool").with_default(Value::Bool(true)));
        let parser = Lazyparser::new(&function, &Environment::default()).unwrap();
        assert_eq!(parser.argument("loud").unwrap().default, Some(Value::Bool(false)));
        assert_eq!(parser.warnings().len(), 1);
    }

    #[test]
    fn test_int_default_out_of_range() {
        let function = FunctionSchema::new("f")
            .with_param(ParamDecl::new("n").annotated("int").with_default(Value::Float(1e20)));
        let err = Lazyparser::new(&function, &Environment::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefault { argument, .. } if argument == "-n/--n"));
    }

    #[test]
    fn test_fill_rules() {
        let function = FunctionSchema::new("f")
            .with_param(ParamDecl::new("n").annotated("int").with_default(Value::Int(1)))
            .with_param(ParamDecl::new("m").annotated("int"))
            .with_param(ParamDecl::new("b").annotated("bool"))
            .with_param(ParamDecl::new("t").annotated("tuple[int, ...]").with_default(Value::Int(1)));
        let env = Environment::default();

        let ok = Lazyparser::builder(&function, &env).with_fill("n", Value::Float(4.0)).build().unwrap();
        assert_eq!(ok.argument("n").unwrap().fill, Some(Value::Int(4)));

        let mismatch = Lazyparser::builder(&function, &env).with_fill("n", Value::Str("x".into())).build();
        assert!(matches!(mismatch, Err(ConfigError::FillTypeMismatch { .. })));

        let fractional = Lazyparser::builder(&function, &env).with_fill("n", Value::Float(4.5)).build();
        assert!(matches!(fractional, Err(ConfigError::FillTypeMismatch { .. })));

        let huge = Lazyparser::builder(&function, &env).with_fill("n", Value::Float(1e20)).build();
        assert!(matches!(huge, Err(ConfigError::FillTypeMismatch { .. })));

        let required = Lazyparser::builder(&function, &env).with_fill("m", Value::Int(2)).build();
        assert!(matches!(required, Err(ConfigError::MissingDefaultForFill(_))));

        let flag = Lazyparser::builder(&function, &env).with_fill("b", Value::Bool(true)).build();
        assert!(matches!(flag, Err(ConfigError::UnsupportedFillType { .. })));

        let tuple = Lazyparser::builder(&function, &env).with_fill("t", Value::Int(2)).build();
        assert!(matches!(tuple, Err(ConfigError::UnsupportedFillType { .. })));
    }

    #[test]
    fn test_unknown_names_in_rules_warn() {
        let env = Environment::default();
        let parser = Lazyparser::builder(&multiply(), &env)
            .with_constraint("nope", Value::Int(1))
            .build()
            .unwrap();
        assert_eq!(parser.warnings().len(), 1);
        assert!(parser.warnings()[0].contains("nope"));
    }

    #[test]
    fn test_group_order_unknown() {
        let env = Environment::default()
            .with_groups(vec![GroupSpec::new("Inputs", ["x"])])
            .with_group_order(["Outputs"]);
        assert!(matches!(
            Lazyparser::new(&multiply(), &env),
            Err(ConfigError::UnknownGroupInOrder(_))
        ));
    }

    #[test]
    fn test_report_lists_display_order() {
        let parser = Lazyparser::new(&multiply(), &Environment::default()).unwrap();
        let report = parser.report();
        assert_eq!(report.name, "multiply");
        assert_eq!(report.arguments.len(), 3);
        assert_eq!(report.arguments[0].type_name, "int");
        assert!(report.arguments[0].required);
    }
}
