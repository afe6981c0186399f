//! Label display names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Gmail system labels shown as tabs, with their display names.
pub const DEFAULT_LABELS: [(&str, &str); 6] = [
    ("CATEGORY_PERSONAL", "Received"),
    ("STARRED", "Starred"),
    ("IMPORTANT", "Important"),
    ("SENT", "Sent"),
    ("SPAM", "Spam"),
    ("TRASH", "Trash"),
];

/// Immutable label-id to display-name table.
///
/// Built once from settings and handed to whatever renders labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    names: BTreeMap<String, String>,
}

impl Default for LabelTable {
    fn default() -> Self {
        DEFAULT_LABELS.into_iter().collect()
    }
}

impl LabelTable {
    /// Display name for a label id, if the label is known.
    #[must_use]
    pub fn display_name(&self, label_id: &str) -> Option<&str> {
        self.names.get(label_id).map(String::as_str)
    }

    /// Display name, or the empty string for unknown labels.
    #[must_use]
    pub fn display_name_or_empty(&self, label_id: &str) -> &str {
        self.display_name(label_id).unwrap_or_default()
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
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

    #[test]
    fn test_default_labels() {
        let table = LabelTable::default();
        assert_eq!(table.names.len(), 6);
        assert_eq!(table.display_name("CATEGORY_PERSONAL"), Some("Received"));
        assert_eq!(table.display_name("TRASH"), Some("Trash"));
        assert_eq!(table.display_name("INBOX"), None);
        assert_eq!(table.display_name_or_empty("INBOX"), "");
    }

    #[test]
    fn test_custom_table() {
        let table: LabelTable = [("Label_12", "Receipts")].into_iter().collect();
        assert_eq!(table.display_name("Label_12"), Some("Receipts"));
        assert_eq!(table.display_name("SENT"), None);
        assert_eq!(table.names.len(), 1);
    }

    #[test]
    fn test_serde_as_plain_map() {
        let table: LabelTable = serde_json::from_str(r#"{"INBOX": "Inbox"}"#).unwrap();
        assert_eq!(table.display_name("INBOX"), Some("Inbox"));
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"INBOX":"Inbox"}"#);
    }
}
