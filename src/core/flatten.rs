use crate::domain::model::{Platform, RawItem};
use serde_json::Value;

const INSTAGRAM_CURSOR_KEYS: [&str; 4] = ["max_id", "next_max_id", "end_cursor", "next_end_cursor"];

/// Pulls the item objects out of one API page.
///
/// Object payloads are read through the platform's item key; array payloads
/// are taken as the item list itself. One level of nested arrays is unwrapped
/// and anything that is not an object is dropped.
pub fn flatten_items(payload: &Value, items_key: &str) -> Vec<RawItem> {
    let items = match payload {
        Value::Object(obj) => match obj.get(items_key) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) | None => {
                tracing::debug!(items_key, "Payload has no item array");
                return Vec::new();
            }
        },
        Value::Array(items) => items.as_slice(),
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Object(obj) => out.push(obj.clone()),
            Value::Array(nested) => {
                out.extend(nested.iter().filter_map(|v| v.as_object().cloned()));
            }
            _ => {}
        }
    }
    out
}

/// Cursor for the next page, if the payload says there is one.
pub fn next_cursor(platform: Platform, payload: &Value) -> Option<String> {
    match platform {
        Platform::Instagram => instagram_cursor(payload),
        Platform::TikTok => tiktok_cursor(payload),
    }
}

fn instagram_cursor(payload: &Value) -> Option<String> {
    match payload {
        Value::Object(obj) => INSTAGRAM_CURSOR_KEYS
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|v| !v.is_empty())
            .map(str::to_string),
        // chunk endpoints answer `[items, cursor]`
        Value::Array(parts) => parts
            .last()
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn tiktok_cursor(payload: &Value) -> Option<String> {
    let obj = payload.as_object()?;
    if !obj.get("hasMore").map(truthy).unwrap_or(false) {
        return None;
    }
    match obj.get("cursor")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        _ => false,
    }
}
