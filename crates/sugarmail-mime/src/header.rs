//! Ordered, case-insensitive header lookups.

use serde::{Deserialize, Serialize};

/// A single `{name, value}` header as the Gmail API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name, case preserved.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Checks the name against `name`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Borrowed view over a part's header list.
///
/// Keeps the API's order, so `get_all` returns values the way they appeared.
#[derive(Debug, Clone, Copy)]
pub struct Headers<'a> {
    headers: &'a [Header],
}

impl<'a> Headers<'a> {
    /// Wraps a header slice.
    #[must_use]
    pub const fn new(headers: &'a [Header]) -> Self {
        Self { headers }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_str())
    }

    /// Gets all values for a header, in order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&'a str> {
        self.headers
            .iter()
            .filter(|h| h.is(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Whether there are no headers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
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

    fn sample() -> Vec<Header> {
        vec![
            Header::new("Received", "by 10.0.0.1"),
            Header::new("From", "alice@example.com"),
            Header::new("received", "by 10.0.0.2"),
            Header::new("Subject", "Lunch"),
        ]
    }

    #[test]
    fn test_headers_get_case_insensitive() {
        let list = sample();
        let headers = Headers::new(&list);
        assert_eq!(headers.get("from"), Some("alice@example.com"));
        assert_eq!(headers.get("SUBJECT"), Some("Lunch"));
        assert_eq!(headers.get("To"), None);
    }

    #[test]
    fn test_headers_get_all_keeps_order() {
        let list = sample();
        let headers = Headers::new(&list);
        assert_eq!(headers.get_all("Received"), vec!["by 10.0.0.1", "by 10.0.0.2"]);
    }

    #[test]
    fn test_headers_empty() {
        let list = sample();
        assert!(!Headers::new(&list).is_empty());
        assert!(Headers::new(&[]).is_empty());
    }
}
