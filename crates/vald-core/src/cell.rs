//! Typed table cells.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::watermark::{format_api_timestamp, parse_timestamp};

/// A single table value.
///
/// Vendor JSON scalars map onto the matching variant. Arrays (and objects that
/// survive flattening) are kept as [`Cell::Json`]. [`Cell::Timestamp`] only
/// appears after timestamp post-processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl Cell {
    /// Convert a JSON value into a cell.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Json(value.clone()),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a [`Cell::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text is parsed leniently.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Timestamp view of the cell. Text is parsed with [`parse_timestamp`].
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Try to reinterpret a text cell as a timestamp.
    ///
    /// Anything that is not text, or text that does not parse, is returned
    /// unchanged.
    #[must_use]
    pub fn into_timestamp_lossless(self) -> Self {
        match self {
            Self::Text(s) => match parse_timestamp(&s) {
                Some(ts) => Self::Timestamp(ts),
                None => Self::Text(s),
            },
            other => other,
        }
    }

    /// Render the cell as plain text. Null becomes the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) if x.is_finite() => write!(f, "{x}"),
            Self::Float(_) => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => f.write_str(&format_api_timestamp(*ts)),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
