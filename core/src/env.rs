//! Parser construction settings.
//!
//! An [`Environment`] carries everything that shapes a built parser besides
//! the function itself: docstring delimiters, display groups, epilog,
//! version string and the standalone exit policy. It is built once and
//! passed by reference to every parser construction.
//!
//! # Example YAML
//!
//! ```yaml
//! delimiters:
//!   primary: ":param"
//!   secondary: ":"
//!   header: ""
//!   tab: 4
//! groups:
//!   - name: Inputs
//!     members: [source, target]
//!   - name: Misc
//!     members: [help, verbose]
//! group_order: [Inputs, Misc]
//! epilog: "See the manual for details."
//! version: "1.2.0"
//! standalone: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::types::HELP_ARGUMENT;

/// Internal token of the group that carries the help argument.
pub const PARSER_GROUP_TOKEN: &str = "__parser__";

/// Docstring delimiters.
///
/// With the defaults, parameter lines look like `:param name: help text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    /// Marker that starts a parameter line. May be empty.
    pub primary: String,
    /// Marker that separates the parameter name from its help.
    pub secondary: String,
    /// Optional marker that ends the description block.
    pub header: String,
    /// Indentation width stripped from description lines.
    pub tab: usize,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            primary: ":param".to_string(),
            secondary: ":".to_string(),
            header: String::new(),
            tab: 4,
        }
    }
}

impl Delimiters {
    /// Delimiters with the given primary and secondary markers and the
    /// default header and indentation.
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: strip_whitespace(primary),
            secondary: strip_whitespace(secondary),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: &str) -> Self {
        self.header = strip_whitespace(header);
        self
    }

    /// Copy with all whitespace removed from the markers.
    ///
    /// Fields set directly or loaded from a file may carry padding; the
    /// scanner matches the normalized markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazyarg_core::Delimiters;
    ///
    /// let loaded = Delimiters {
    ///     primary: " @arg ".into(),
    ///     secondary: " :\t".into(),
    ///     ..Delimiters::default()
    /// };
    /// assert_eq!(loaded.normalized(), Delimiters::new("@arg", ":"));
    /// ```
    pub fn normalized(&self) -> Self {
        Self {
            primary: strip_whitespace(&self.primary),
            secondary: strip_whitespace(&self.secondary),
            header: strip_whitespace(&self.header),
            tab: self.tab,
        }
    }

    pub fn with_tab(mut self, tab: usize) -> Self {
        self.tab = tab;
        self
    }

    /// Marker that ends the description: the primary delimiter, or the
    /// secondary one when the primary is empty.
    pub fn description_stop(&self) -> &str {
        if self.primary.is_empty() {
            &self.secondary
        } else {
            &self.primary
        }
    }

    /// Checks that the delimiters can identify parameter lines.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDelimiter`] when the secondary marker is blank.
    pub fn validate(&self) -> Result<()> {
        if strip_whitespace(&self.secondary).is_empty() {
            return Err(ConfigError::InvalidDelimiter(
                "the secondary delimiter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A named display group and the parameters it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl GroupSpec {
    /// # Examples
    ///
    /// ```
    /// use lazyarg_core::GroupSpec;
    ///
    /// let group = GroupSpec::new("Misc", ["help", "verbose"]);
    /// assert!(group.holds_help());
    /// assert!(group.contains("verbose"));
    /// ```
    pub fn new<I, S>(name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    /// A group listing `help` titles the optional arguments.
    pub fn holds_help(&self) -> bool {
        self.contains(HELP_ARGUMENT)
    }
}

/// A configured group name with its sanitized internal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupToken {
    pub name: String,
    pub token: String,
}

/// Reduces a group name to an identifier-safe token.
///
/// Keeps `[A-Za-z0-9_]` and strips leading digits.
///
/// # Errors
///
/// [`ConfigError::EmptyGroupName`] when nothing is left.
///
/// # Examples
///
/// ```
/// use lazyarg_core::group_token;
///
/// assert_eq!(group_token("My group!").unwrap(), "Mygroup");
/// assert_eq!(group_token("2nd pass").unwrap(), "ndpass");
/// assert!(group_token("1 2 3").is_err());
/// ```
pub fn group_token(name: &str) -> Result<String> {
    let token: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .skip_while(char::is_ascii_digit)
        .collect();
    if token.is_empty() {
        return Err(ConfigError::EmptyGroupName(name.to_string()));
    }
    Ok(token)
}

/// Settings shared by every parser built from them.
///
/// # Examples
///
/// ```
/// use lazyarg_core::{Delimiters, Environment, GroupSpec};
///
/// let env = Environment::default()
///     .with_delimiters(Delimiters::new("@", ":"))
///     .with_groups(vec![GroupSpec::new("Inputs", ["src"])])
///     .with_version("2.0");
/// assert!(env.validate().is_ok());
/// assert!(env.standalone);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub delimiters: Delimiters,
    /// Display groups, in configuration order.
    pub groups: Vec<GroupSpec>,
    /// Explicit group display order, by group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_order: Option<Vec<String>>,
    /// Text shown after the generated help.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,
    /// When set, a `--version` option is added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Print and exit on errors instead of returning them.
    pub standalone: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            groups: Vec::new(),
            group_order: None,
            epilog: None,
            version: None,
            standalone: true,
        }
    }
}

impl Environment {
    /// Loads an environment from a YAML or JSON file (chosen by extension,
    /// YAML unless the file ends in `.json`).
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`], [`ConfigError::Json`] or [`ConfigError::Yaml`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let env = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(env)
    }

    /// Saves the environment as YAML or JSON depending on the extension.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`], [`ConfigError::Json`] or [`ConfigError::Yaml`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_groups(mut self, groups: Vec<GroupSpec>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_group_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Validates delimiters and group names.
    ///
    /// Returns the group token table in configuration order. The group
    /// holding `help` gets [`PARSER_GROUP_TOKEN`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDelimiter`], [`ConfigError::EmptyGroupName`] or
    /// [`ConfigError::DuplicateGroupToken`].
    pub fn validate(&self) -> Result<Vec<GroupToken>> {
        self.delimiters.validate()?;

        let mut tokens: Vec<GroupToken> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let sanitized = group_token(&group.name)?;
            let token = if group.holds_help() {
                PARSER_GROUP_TOKEN.to_string()
            } else {
                sanitized
            };
            if tokens.iter().any(|t| t.token == token) {
                return Err(ConfigError::DuplicateGroupToken {
                    name: group.name.clone(),
                    token,
                });
            }
            tokens.push(GroupToken {
                name: group.name.clone(),
                token,
            });
        }
        Ok(tokens)
    }
}

fn strip_whitespace(marker: &str) -> String {
    marker.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
