//! Response body decoding.
//!
//! Test pages come back in several shapes depending on the device service
//! and API version. [`PageShape`] is the closed set of shapes accepted, tried
//! in a fixed priority order; anything else is malformed.

use serde_json::Value;
use vald_core::Record;

use crate::error::ApiError;

/// Object keys that may hold a page's batch, highest priority first.
pub const BATCH_KEYS: [&str; 3] = ["tests", "items", "data"];

/// A decoded test page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageShape {
    /// The body is a bare JSON array.
    List(Vec<Value>),
    /// The body is an object with the batch under one of [`BATCH_KEYS`]. A key
    /// holding `null` is an empty batch.
    Keyed {
        key: &'static str,
        items: Vec<Value>,
    },
    /// Any other object, taken as a one-record batch.
    Single(Record),
}

impl PageShape {
    /// Decode a raw page body.
    ///
    /// A blank body is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the body is not JSON or is a JSON
    /// scalar.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        if body.trim().is_empty() {
            return Ok(Self::List(Vec::new()));
        }
        let value: Value =
            serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Match an already parsed body against the accepted shapes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] for scalars and `null`.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(items) => Ok(Self::List(items)),
            Value::Object(mut map) => {
                for key in BATCH_KEYS {
                    match map.get_mut(key) {
                        Some(Value::Array(items)) => {
                            let items = std::mem::take(items);
                            return Ok(Self::Keyed { key, items });
                        }
                        Some(Value::Null) => {
                            return Ok(Self::Keyed {
                                key,
                                items: Vec::new(),
                            });
                        }
                        _ => {}
                    }
                }
                Ok(Self::Single(map))
            }
            other => Err(ApiError::Parse(format!("unexpected page body: {other}"))),
        }
    }

    /// The records of this page, in server order. Non-object array entries
    /// are skipped.
    #[must_use]
    pub fn into_batch(self) -> Vec<Record> {
        match self {
            Self::List(items) | Self::Keyed { items, .. } => objects(items),
            Self::Single(record) if record.is_empty() => Vec::new(),
            Self::Single(record) => vec![record],
        }
    }
}

/// Records held under `key` in a single-page resource response.
///
/// # Errors
///
/// Returns [`ApiError::EmptyBody`] for a blank body, [`ApiError::Parse`] if
/// it is not JSON, and [`ApiError::MissingKey`] if it is not an object with
/// an array under `key`.
pub fn records_under(body: &str, key: &str) -> Result<Vec<Record>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyBody);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    match value {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(objects(items)),
            _ => Err(ApiError::MissingKey(key.to_string())),
        },
        _ => Err(ApiError::MissingKey(key.to_string())),
    }
}

fn objects(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
