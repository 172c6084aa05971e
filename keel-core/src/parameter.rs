use crate::{Error, Value};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Declared data type of a bound parameter.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    Boolean,
    Integer,
    LargeObject,
    Null,
    #[default]
    String,
}

impl ParameterType {
    pub const ALL: [ParameterType; 5] = [
        ParameterType::Boolean,
        ParameterType::Integer,
        ParameterType::LargeObject,
        ParameterType::Null,
        ParameterType::String,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ParameterType::Boolean => "boolean",
            ParameterType::Integer => "int",
            ParameterType::LargeObject => "lob",
            ParameterType::Null => "null",
            ParameterType::String => "string",
        }
    }

    /// Type a parameter gets when bound without an explicit one.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => ParameterType::Null,
            Value::Boolean(..) => ParameterType::Boolean,
            Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..) => ParameterType::Integer,
            Value::Blob(..) => ParameterType::LargeObject,
            _ => ParameterType::String,
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ParameterType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ParameterType::ALL
            .into_iter()
            .find(|v| v.tag().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| Error::UnknownType {
                tag: tag.to_owned(),
                dialect: "any",
            })
    }
}

/// Placeholder identity: a name (`:id`) or a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterKey {
    Named(String),
    Position(u32),
}

impl Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKey::Named(name) => f.write_str(name),
            ParameterKey::Position(position) => write!(f, "{position}"),
        }
    }
}

impl From<&str> for ParameterKey {
    fn from(value: &str) -> Self {
        ParameterKey::Named(value.to_owned())
    }
}

impl From<String> for ParameterKey {
    fn from(value: String) -> Self {
        ParameterKey::Named(value)
    }
}

impl From<u32> for ParameterKey {
    fn from(value: u32) -> Self {
        ParameterKey::Position(value)
    }
}

/// A value substituted into a statement at execution time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    pub key: ParameterKey,
    pub value: Value,
    pub data_type: ParameterType,
    /// Maximum length hint, 0 when unspecified.
    pub length: usize,
    /// Client specific name for `data_type`, taken from the dialect mapping.
    pub native_type: Option<&'static str>,
}
