//! Error types for argument model construction and post-parse validation.
//!
//! Two families are kept apart:
//!
//! - [`ConfigError`]: the CLI was declared incorrectly (unsupported type,
//!   reserved name, bad group configuration, ...). Detected while the
//!   argument model is built and never recoverable.
//! - [`UsageError`]: the user supplied a value that breaks a declared
//!   constraint. Detected after the command line has been parsed.
//!
//! Every argument-scoped message starts with the argument's display name
//! (`-s/--name`), see [`Argument::display_name`](crate::Argument::display_name).

use thiserror::Error;

/// Declaration errors raised while building the argument model.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A type annotation (or docstring type marker) names a type outside
    /// the supported set.
    #[error("argument {argument}: unsupported type {declared}")]
    UnsupportedType { argument: String, declared: String },

    /// An ellipsis appears anywhere but as the second of exactly two slots.
    #[error("argument {argument}: invalid ellipsis in {declared}, only tuple[T, ...] is allowed")]
    InvalidEllipsis { argument: String, declared: String },

    /// A parameter uses a name reserved for a built-in option.
    #[error("argument conflict: '{0}' is reserved and cannot be a parameter name")]
    ReservedName(String),

    /// Two parameters share a name.
    #[error("argument conflict: parameter '{0}' is declared twice")]
    DuplicateParameter(String),

    /// A group name contains no identifier characters.
    #[error("group name '{0}' must contain at least one of the symbols [A-Za-z]")]
    EmptyGroupName(String),

    /// Two group names sanitize to the same token.
    #[error("group '{name}' collides with another group once reduced to '{token}'")]
    DuplicateGroupToken { name: String, token: String },

    /// The explicit group order names a group no argument belongs to.
    #[error("the argument group '{0}' does not exist")]
    UnknownGroupInOrder(String),

    /// A fill value or its default does not match the argument type.
    #[error("argument {argument}: invalid fill value type, expected {expected}")]
    FillTypeMismatch { argument: String, expected: String },

    /// Fill values are only supported for scalar int/float/string arguments.
    #[error("argument {argument}: fill values are not supported for {type_name} arguments")]
    UnsupportedFillType { argument: String, type_name: String },

    /// A fill value was configured for an argument without a default.
    #[error("argument {0}: a fill value must be specified with a default")]
    MissingDefaultForFill(String),

    /// A declared default does not match the declared type.
    #[error("argument {argument}: default {value} is not a valid {expected}")]
    InvalidDefault {
        argument: String,
        value: String,
        expected: String,
    },

    /// Docstring delimiters are unusable.
    #[error("bad delimiter definition: {0}")]
    InvalidDelimiter(String),

    /// Reading or writing a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid user input detected after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// A raw token could not be coerced to the argument type.
    #[error("argument {argument}: invalid {expected} value '{value}'")]
    InvalidValue {
        argument: String,
        value: String,
        expected: String,
    },

    /// A boolean arrived as a string other than `True`/`False`.
    #[error("argument {argument}: invalid bool type {value} (choose from True, False)")]
    InvalidBool { argument: String, value: String },

    /// A value is outside the declared choice set.
    #[error("argument {argument}: invalid choice {value} (choose from {choices})")]
    NotInChoices {
        argument: String,
        value: String,
        choices: String,
    },

    /// A value differs from the single value it is constrained to.
    #[error("argument {argument}: invalid choice {value}: it must be {expected}")]
    NotEqual {
        argument: String,
        value: String,
        expected: String,
    },

    /// A path-kind constraint was applied to a non-string argument.
    #[error("argument {argument}: wrong file type, a path is expected")]
    WrongPathType { argument: String },

    /// A path does not name an existing entry of the expected kind.
    #[error("argument {argument}: invalid choice {value}: it must be an existing {kind}")]
    MissingPath {
        argument: String,
        value: String,
        kind: String,
    },

    /// A constraint expression evaluated to false.
    #[error("argument {argument}: invalid choice {value}: it must respect: {expression}")]
    ExpressionFailed {
        argument: String,
        value: String,
        expression: String,
    },
}
