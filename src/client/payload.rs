// Tolerant readers for the response shapes the API returns

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Pull the item list out of a collection response
///
/// Precedence: bare array, then `data` array, then `field` array (top level
/// or nested under `data`), otherwise empty.
pub fn extract_collection(payload: Value, field: Option<&str>) -> Vec<Value> {
    let mut map = match payload {
        Value::Array(items) => return items,
        Value::Object(map) => map,
        _ => return Vec::new(),
    };

    match map.remove("data") {
        Some(Value::Array(items)) => return items,
        Some(Value::Object(mut inner)) => {
            if let Some(Value::Array(items)) = field.and_then(|f| inner.remove(f)) {
                return items;
            }
        }
        _ => {}
    }

    match field.and_then(|f| map.remove(f)) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Pull a single object out of a response
///
/// `{ "data": {...} }` yields the inner object and an object without `data`
/// yields itself. A `data` that is not an object, or a non-object payload,
/// yields an empty map.
pub fn extract_object(payload: Value) -> Map<String, Value> {
    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(_) => Map::new(),
            None => map,
        },
        _ => Map::new(),
    }
}

/// Unwrap a `{ "data": ... }` envelope; other payloads pass through
pub fn unwrap_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode each item, dropping the ones that do not fit `T`
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        warn!(
            resource = what,
            skipped = total - decoded.len(),
            "Dropped items that did not match the expected shape"
        );
    }
    decoded
}
