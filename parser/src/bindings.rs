//! Parsed argument values, keyed by parameter name.

use lazyarg_core::Value;
use serde::{Serialize, Serializer};

/// Values bound to the function's parameters after a successful parse.
///
/// Serializes as a map in declaration order.
///
/// # Examples
///
/// ```
/// use lazyarg_core::Value;
/// use lazyarg_parser::Bindings;
///
/// let mut bindings = Bindings::default();
/// bindings.insert("x", Value::Int(7));
/// bindings.insert("tags", Value::List(vec![Value::Str("a".into())]));
/// assert_eq!(bindings.int("x"), Some(7));
/// assert_eq!(bindings.float("x"), Some(7.0));
/// assert_eq!(bindings.list("tags").map(<[Value]>::len), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: Vec<(String, Value)>,
    warnings: Vec<String>,
}

impl Bindings {
    /// Binds `name`, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; ints are widened.
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        match self.get(name)? {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Constraints that were skipped while validating these values.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
