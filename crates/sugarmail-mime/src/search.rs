//! Field lookups in raw Gmail API JSON whose shape varies between API
//! versions (e.g. `threadId` at the top of a message, or inside `payload`).

use crate::error::{Error, Result};
use crate::header::Header;
use serde_json::Value;
use std::collections::VecDeque;

/// Deepest nesting level visited. Gmail payloads are far shallower.
pub const MAX_SEARCH_DEPTH: usize = 64;

/// Finds the first value stored under `key`.
///
/// Breadth-first: every key of an object is checked before anything nested
/// inside it, and shallower values are always found before deeper ones.
#[must_use]
pub fn find_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut queue = VecDeque::from([(value, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        let nested = |v: &&Value| depth < MAX_SEARCH_DEPTH && (v.is_object() || v.is_array());

        match current {
            Value::Object(map) => {
                if let Some(found) = map.get(key) {
                    return Some(found);
                }
                queue.extend(map.values().filter(nested).map(|v| (v, depth + 1)));
            }
            Value::Array(items) => {
                queue.extend(items.iter().filter(nested).map(|v| (v, depth + 1)));
            }
            _ => {}
        }
    }

    None
}

/// Finds the first string stored under `key`.
///
/// A non-string value under `key` ends the search with `None`, like a
/// missing field.
#[must_use]
pub fn find_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    find_field(value, key).and_then(Value::as_str)
}

/// Like [`find_field`], for callers that need the field.
///
/// # Errors
///
/// Returns [`Error::MissingField`] if `key` is not present anywhere.
pub fn require_field<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    find_field(value, key).ok_or_else(|| Error::MissingField(key.to_string()))
}

/// Collects every header named `name` from all `headers` arrays.
///
/// Walks in document order, so a thread's headers come back message by
/// message, each in the order the API listed them.
#[must_use]
pub fn collect_headers(value: &Value, name: &str) -> Vec<Header> {
    let mut found = Vec::new();
    collect_into(value, name, 0, &mut found);
    found
}

fn collect_into(value: &Value, name: &str, depth: usize, found: &mut Vec<Header>) {
    if depth > MAX_SEARCH_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "headers"
                    && let Value::Array(headers) = child
                {
                    found.extend(headers.iter().filter_map(|h| matching_header(h, name)));
                }
                collect_into(child, name, depth + 1, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_into(item, name, depth + 1, found);
            }
        }
        _ => {}
    }
}

fn matching_header(value: &Value, name: &str) -> Option<Header> {
    let header_name = value.get("name")?.as_str()?;
    if !header_name.eq_ignore_ascii_case(name) {
        return None;
    }
    let header_value = value.get("value").and_then(Value::as_str).unwrap_or_default();
    Some(Header::new(header_name, header_value))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_nested_field() {
        let value = json!({"a": {"b": {"threadId": "T1"}}});
        assert_eq!(find_field(&value, "threadId"), Some(&json!("T1")));
        assert_eq!(find_str(&value, "threadId"), Some("T1"));
    }

    #[test]
    fn test_find_missing_field() {
        let value = json!({"a": [1, {"b": null}], "c": "threadId"});
        assert_eq!(find_field(&value, "threadId"), None);
        assert!(matches!(
            require_field(&value, "threadId"),
            Err(Error::MissingField(key)) if key == "threadId"
        ));
    }

    #[test]
    fn test_own_keys_before_nested() {
        let value = json!({
            "nested": {"id": "deep"},
            "id": "shallow"
        });
        assert_eq!(find_str(&value, "id"), Some("shallow"));
    }

    #[test]
    fn test_shallower_wins_across_siblings() {
        let value = json!({
            "first": {"x": {"threadId": "deep"}},
            "second": {"threadId": "shallow"}
        });
        assert_eq!(find_str(&value, "threadId"), Some("shallow"));
    }

    #[test]
    fn test_find_inside_arrays() {
        let value = json!({"messages": [{"id": "m1", "threadId": "t9"}]});
        assert_eq!(find_str(&value, "threadId"), Some("t9"));
    }

    #[test]
    fn test_find_str_ignores_non_strings() {
        let value = json!({"threadId": 42});
        assert_eq!(find_str(&value, "threadId"), None);
        assert!(find_field(&value, "threadId").is_some());
    }

    #[test]
    fn test_find_beyond_depth_limit() {
        let mut value = json!({"threadId": "bottom"});
        for _ in 0..(MAX_SEARCH_DEPTH + 5) {
            value = json!({ "n": value });
        }
        assert_eq!(find_field(&value, "threadId"), None);
    }

    #[test]
    fn test_collect_headers_in_order() {
        let thread = json!({
            "id": "t1",
            "messages": [
                {"payload": {"headers": [
                    {"name": "To", "value": "a@example.com"},
                    {"name": "From", "value": "b@example.com"},
                    {"name": "to", "value": "c@example.com"}
                ]}},
                {"payload": {"headers": [
                    {"name": "TO", "value": "d@example.com"}
                ]}}
            ]
        });
        let values: Vec<_> = collect_headers(&thread, "To")
            .into_iter()
            .map(|h| h.value)
            .collect();
        assert_eq!(values, vec!["a@example.com", "c@example.com", "d@example.com"]);
    }

    #[test]
    fn test_collect_headers_none() {
        let value = json!({"headers": [{"name": "From", "value": "x"}, "junk"]});
        assert!(collect_headers(&value, "Subject").is_empty());
    }
}
