use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered mapping of configuration keys to values.
///
/// A `BTreeMap` rather than a `HashMap` so that every textual encoding of a
/// mapping is deterministic.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A configuration value.
///
/// Values are drawn from a closed set of kinds: strings, integers, booleans,
/// and mappings (which may nest, e.g. for branch-scoped sub-configuration).
/// [`ConfigValue::Unset`] is the absence sentinel: reading a key with no
/// stored value and no schema default yields `Unset`, and writing `Unset`
/// deletes the key.
///
/// The serde representation is untagged, so a value round-trips through JSON
/// as the bare literal it denotes: `null`, `true`, `42`, `"text"`, or an
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// No value. Encodes to the empty absence marker.
    Unset,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// UTF-8 string.
    Str(String),
    /// String-keyed mapping; values may themselves be mappings.
    Map(ConfigMap),
}

/// The kind of a configuration value, as declared in schema tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Int,
    Bool,
    Map,
}

impl ConfigValue {
    /// The kind of this value, or `None` for [`ConfigValue::Unset`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            ConfigValue::Unset => None,
            ConfigValue::Bool(_) => Some(ValueKind::Bool),
            ConfigValue::Int(_) => Some(ValueKind::Int),
            ConfigValue::Str(_) => Some(ValueKind::Str),
            ConfigValue::Map(_) => Some(ValueKind::Map),
        }
    }

    /// Returns `true` if this is the absence sentinel.
    pub fn is_unset(&self) -> bool {
        matches!(self, ConfigValue::Unset)
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer contents, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean contents, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the mapping contents, if this is a mapping.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Consume the value and return the mapping contents, if any.
    pub fn into_map(self) -> Option<ConfigMap> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// The natural literal form of a value: raw text for strings, decimal for
/// integers, `true`/`false` for booleans, compact JSON for mappings, and the
/// empty string for `Unset`.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Unset => Ok(()),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(n) => write!(f, "{n}"),
            ConfigValue::Str(s) => write!(f, "{s}"),
            ConfigValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Str(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Int(n)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(m: ConfigMap) -> Self {
        ConfigValue::Map(m)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "integer",
            ValueKind::Bool => "boolean",
            ValueKind::Map => "mapping",
        };
        write!(f, "{name}")
    }
}
