use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use lazyarg_core::{Environment, FunctionSchema, Value};
use lazyarg_parser::Lazyparser;
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "lazyarg")]
#[command(version)]
#[command(about = "Build command lines from declarative function specs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the argument model built from a function spec.
    Inspect(InspectArgs),
    /// Parse arguments against a function spec and print the bound values.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct SpecArgs {
    /// Function spec file (YAML, or JSON with a .json extension).
    #[arg(long)]
    spec: PathBuf,
    /// Environment file with delimiters, groups, epilog and version.
    #[arg(long)]
    env: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    spec: SpecArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    spec: SpecArgs,
    /// Arguments passed to the generated parser, after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// A function declaration plus its fill values and constraints.
#[derive(Debug, Deserialize)]
struct SpecFile {
    function: FunctionSchema,
    #[serde(default)]
    fill: BTreeMap<String, Value>,
    #[serde(default)]
    constraints: BTreeMap<String, Value>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Run(args) => run_run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let parser = build_parser(&args.spec)?;
    let report = parser.report();
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| format!("Failed to serialize report: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|err| format!("Failed to serialize report: {err}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let parser = build_parser(&args.spec)?;
    let argv = std::iter::once(parser.name().to_string()).chain(args.args);

    // Help, version and usage errors exit with the parser's own code.
    let bindings = parser.parse_from(argv).unwrap_or_else(|err| err.exit());
    debug!(values = bindings.len(), skipped = bindings.warnings().len(), "bound arguments");

    let rendered = serde_json::to_string_pretty(&bindings)
        .map_err(|err| format!("Failed to serialize values: {err}"))?;
    println!("{rendered}");
    Ok(())
}

fn build_parser(args: &SpecArgs) -> Result<Lazyparser, String> {
    let spec = load_spec(&args.spec)?;
    let env = match &args.env {
        Some(path) => Environment::load(path)
            .map_err(|err| format!("Failed to load environment '{}': {err}", path.display()))?,
        None => Environment::default(),
    };

    let mut builder = Lazyparser::builder(&spec.function, &env);
    for (name, value) in spec.fill {
        builder = builder.with_fill(&name, value);
    }
    for (name, value) in spec.constraints {
        builder = builder.with_constraint(&name, value);
    }
    builder.build().map_err(|err| err.to_string())
}

fn load_spec(path: &Path) -> Result<SpecFile, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text).map_err(|err| format!("Invalid spec '{}': {err}", path.display()))
    } else {
        serde_yaml::from_str(&text).map_err(|err| format!("Invalid spec '{}': {err}", path.display()))
    }
}
