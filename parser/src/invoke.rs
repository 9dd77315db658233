//! Parsing a command line and calling the wrapped function.

use std::ffi::OsString;

use lazyarg_core::ConfigError;
use thiserror::Error;
use tracing::debug;

use crate::backend::{bind, command, expand_short_names};
use crate::bindings::Bindings;
use crate::model::Lazyparser;

/// Failure to build a parser or to parse a command line.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The CLI was declared incorrectly.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command line was rejected, or help/version output was requested.
    #[error(transparent)]
    Usage(#[from] clap::Error),
}

impl InvokeError {
    /// Process exit code for this error: `1` for configuration errors,
    /// clap's code otherwise (`0` for help and version, `2` for usage).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Usage(err) => err.exit_code(),
        }
    }

    /// Whether this is a help or version display rather than a failure.
    pub fn is_display(&self) -> bool {
        self.exit_code() == 0
    }

    /// Prints the error (or help/version text) and exits.
    pub fn exit(&self) -> ! {
        match self {
            Self::Config(err) => {
                eprintln!("error: {err}");
                std::process::exit(1)
            }
            Self::Usage(err) => err.exit(),
        }
    }
}

impl Lazyparser {
    /// The clap command for this model.
    pub fn command(&self) -> clap::Command {
        command(self)
    }

    /// Parses `args` (program name first) into bindings.
    ///
    /// Multi-character short names such as `-al` are accepted as written.
    ///
    /// # Errors
    ///
    /// [`InvokeError::Usage`] for rejected input and for help/version
    /// requests.
    pub fn parse_from<I, T>(&self, args: I) -> Result<Bindings, InvokeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = expand_short_names(self, args.into_iter().map(Into::into).collect());
        let mut cmd = self.command();
        let matches = cmd.try_get_matches_from_mut(args)?;
        let bindings = bind(self, &mut cmd, &matches)?;
        debug!(program = %self.name(), values = bindings.len(), "parsed command line");
        Ok(bindings)
    }

    /// Parses `args` and calls `f` with the bound values.
    ///
    /// In standalone mode, a parse failure (or help/version request) prints
    /// its message and exits the process. Otherwise it is returned.
    ///
    /// # Errors
    ///
    /// See [`Lazyparser::parse_from`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyarg_core::{Environment, FunctionSchema, ParamDecl};
    /// use lazyarg_parser::Lazyparser;
    ///
    /// let function = FunctionSchema::new("multiply")
    ///     .with_param(ParamDecl::new("x").annotated("int"))
    ///     .with_param(ParamDecl::new("y").annotated("int"));
    /// let env = Environment::default().with_standalone(false);
    /// let parser = Lazyparser::new(&function, &env).unwrap();
    ///
    /// let product = parser
    ///     .invoke_from(["multiply", "-x", "7", "-y", "8"], |args| {
    ///         args.int("x").unwrap_or(0) * args.int("y").unwrap_or(0)
    ///     })
    ///     .unwrap();
    /// assert_eq!(product, 56);
    /// ```
    pub fn invoke_from<I, T, F, R>(&self, args: I, f: F) -> Result<R, InvokeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        F: FnOnce(&Bindings) -> R,
    {
        match self.parse_from(args) {
            Ok(bindings) => Ok(f(&bindings)),
            Err(err) if self.standalone() => err.exit(),
            Err(err) => Err(err),
        }
    }

    /// [`Lazyparser::invoke_from`] over the process arguments.
    ///
    /// # Errors
    ///
    /// See [`Lazyparser::parse_from`].
    pub fn run<F, R>(&self, f: F) -> Result<R, InvokeError>
    where
        F: FnOnce(&Bindings) -> R,
    {
        self.invoke_from(std::env::args_os(), f)
    }
}

#[cfg(test)]
mod tests {
    use lazyarg_core::{Environment, FunctionSchema, ParamDecl, Value};

    use super::*;

    fn parser(env: &Environment) -> Lazyparser {
        let function = FunctionSchema::new("prog")
            .with_param(ParamDecl::new("n").annotated("int").with_default(Value::Int(1)));
        Lazyparser::new(&function, env).unwrap()
    }

    #[test]
    fn test_help_is_zero_exit() {
        let env = Environment::default().with_standalone(false);
        let err = parser(&env).invoke_from(["prog", "--help"], |_| ()).unwrap_err();
        assert_eq!(err.exit_code(), 0);
        assert!(err.is_display());
    }

    #[test]
    fn test_version_is_zero_exit() {
        let env = Environment::default().with_standalone(false).with_version("3.1.4");
        let err = parser(&env).invoke_from(["prog", "-V"], |_| ()).unwrap_err();
        assert_eq!(err.exit_code(), 0);
        assert!(err.to_string().contains("3.1.4"));
    }

    #[test]
    fn test_usage_error_code() {
        let env = Environment::default().with_standalone(false);
        let err = parser(&env).invoke_from(["prog", "-n", "x"], |_| ()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!err.is_display());
    }

    #[test]
    fn test_multi_char_short_name_as_displayed() {
        let function = FunctionSchema::new("tool")
            .with_param(ParamDecl::new("a").annotated("int").with_default(Value::Int(0)))
            .with_param(ParamDecl::new("alpha").annotated("int").with_default(Value::Int(0)))
            .with_param(ParamDecl::new("Alpha").annotated("int").with_default(Value::Int(0)));
        let env = Environment::default().with_standalone(false);
        let parser = Lazyparser::new(&function, &env).unwrap();
        assert_eq!(parser.argument("alpha").unwrap().display_name(), "-al/--alpha");

        let bindings = parser.parse_from(["tool", "-al", "5", "-a", "1"]).unwrap();
        assert_eq!(bindings.int("alpha"), Some(5));
        assert_eq!(bindings.int("Alpha"), Some(1));

        let err = parser.parse_from(["tool", "-al", "x"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_config_error_code() {
        let err = InvokeError::from(ConfigError::ReservedName("help".into()));
        assert_eq!(err.exit_code(), 1);
    }
}
