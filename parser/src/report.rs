//! Serializable view of a built parser, used by `lazyarg inspect`.

use lazyarg_core::{Argument, ArgumentKind, Arity, Value};
use serde::Serialize;

/// One argument as shown by the inspect command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentReport {
    pub name: String,
    pub kind: ArgumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub arity: Arity,
    pub required: bool,
    pub flag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    pub group: String,
    pub help: String,
}

impl From<&Argument> for ArgumentReport {
    fn from(arg: &Argument) -> Self {
        Self {
            name: arg.name.clone(),
            kind: arg.kind,
            short: arg.short_name.clone(),
            type_name: arg.type_tag.to_string(),
            arity: arg.type_tag.arity(),
            required: arg.is_required(),
            flag: arg.is_flag(),
            default: arg.default.clone(),
            fill: arg.fill.clone(),
            constraint: arg.constraint.as_ref().map(|c| c.describe()),
            group: arg.group.clone(),
            help: arg.help.clone(),
        }
    }
}

/// The whole model: metadata, arguments in display order and warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParserReport {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub arguments: Vec<ArgumentReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
