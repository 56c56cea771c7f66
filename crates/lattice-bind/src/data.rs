//! Item sequences and the payloads they arrive in.

use serde::Deserialize;
use serde_json::Value;

/// One bound record. Normally a JSON object.
pub type Item = Value;

/// Errors that can occur when decoding item data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected an array of items or an object with an `items` or `data` array")]
    Shape,
}

/// Accepted payload shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<Item>),
    Envelope(Envelope),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    items: Option<Vec<Item>>,
    #[serde(default)]
    data: Option<Vec<Item>>,
}

/// Decode an item sequence from JSON text.
///
/// Accepts a bare array, or an object exposing the array under `items`
/// (checked first) or `data`.
pub fn decode_items(json: &str) -> Result<Vec<Item>, DataError> {
    match serde_json::from_str::<Payload>(json)? {
        Payload::Bare(items) => Ok(items),
        Payload::Envelope(Envelope { items: Some(items), .. }) => Ok(items),
        Payload::Envelope(Envelope { data: Some(items), .. }) => Ok(items),
        Payload::Envelope(_) => Err(DataError::Shape),
    }
}

/// Display text of an item's identity key, if it has one.
pub fn identity_of(item: &Item, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
