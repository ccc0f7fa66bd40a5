//! Raw, not-yet-validated configuration input.
//!
//! Every field validates from a [`Value`]. Configuration files (TOML), JSON
//! documents, and command-line literals all convert into this one shape so a
//! field never has to care where its input came from.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Raw configuration input.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent / unset.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Undecoded byte string (e.g. an OS path handed over as bytes).
    Bytes(Vec<u8>),
    Path(PathBuf),
    List(Vec<Value>),
}

/// A structured value with no [`Value`] counterpart (tables, objects).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported {0} in field input")]
pub struct UnsupportedValue(pub &'static str);

impl Value {
    /// Short type name used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Path(_) => "path",
            Value::List(_) => "list",
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text view of string-like values.
    ///
    /// Byte strings are decoded as UTF-8 (lossless only; invalid UTF-8 yields
    /// `None`). Paths are returned only when they are valid Unicode.
    #[must_use]
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Str(s) => Some(Cow::Borrowed(s)),
            Value::Bytes(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Value::Path(path) => path.to_str().map(Cow::Borrowed),
            _ => None,
        }
    }

    /// Parse a command-line literal.
    ///
    /// JSON literals (`4.5`, `true`, `[["type", "*", 1]]`) parse structurally,
    /// `None`/`null` is the unset value, and anything else is bare text.
    #[must_use]
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "None" {
            return Value::None;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(json) => Value::try_from(json).unwrap_or_else(|_| Value::Str(raw.to_string())),
            Err(_) => Value::Str(raw.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Bytes(bytes) => write!(f, "b'{}'", String::from_utf8_lossy(bytes)),
            Value::Path(p) => write!(f, "'{}'", p.display()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = UnsupportedValue;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().ok_or(UnsupportedValue("number"))?),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(_) => return Err(UnsupportedValue("object")),
        })
    }
}

impl TryFrom<toml::Value> for Value {
    type Error = UnsupportedValue;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            toml::Value::String(s) => Value::Str(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            // Kept as text so timestamp fields parse it like any other string.
            toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
            toml::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            toml::Value::Table(_) => return Err(UnsupportedValue("table")),
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl From<&Path> for Value {
    fn from(p: &Path) -> Self {
        Value::Path(p.to_path_buf())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
