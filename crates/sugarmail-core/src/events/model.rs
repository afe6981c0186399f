//! API objects carried by client events.

use serde::{Deserialize, Serialize};

/// The signed-in user's `users.getProfile` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Account address, used as the From of sent mail.
    pub email_address: String,
    /// Total messages in the mailbox.
    #[serde(default)]
    pub messages_total: u64,
    /// Total threads in the mailbox.
    #[serde(default)]
    pub threads_total: u64,
    /// Mailbox history ID.
    #[serde(default)]
    pub history_id: Option<String>,
}

/// A thread as listed by `threads.list`, without messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    /// Thread ID.
    pub id: String,
    /// Preview text.
    #[serde(default)]
    pub snippet: String,
    /// Thread history ID.
    #[serde(default)]
    pub history_id: Option<String>,
}

/// A label from `labels.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Label ID, e.g. `INBOX` or `Label_12`.
    pub id: String,
    /// Name as set in Gmail.
    pub name: String,
    /// `system` or `user`.
    #[serde(default, rename = "type")]
    pub label_type: Option<String>,
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
    fn test_profile_from_api() {
        let profile: Profile = serde_json::from_str(
            r#"{"emailAddress":"alice@example.com","messagesTotal":120,"threadsTotal":80,"historyId":"991"}"#,
        )
        .unwrap();
        assert_eq!(profile.email_address, "alice@example.com");
        assert_eq!(profile.messages_total, 120);
        assert_eq!(profile.history_id.as_deref(), Some("991"));
    }

    #[test]
    fn test_label_type() {
        let label: Label =
            serde_json::from_str(r#"{"id":"INBOX","name":"INBOX","type":"system"}"#).unwrap();
        assert_eq!(label.label_type.as_deref(), Some("system"));

        let label: Label = serde_json::from_str(r#"{"id":"Label_3","name":"Receipts"}"#).unwrap();
        assert_eq!(label.label_type, None);
    }
}
