//! Gmail API message structure.
//!
//! These mirror the `messages.get` / `threads.get` JSON (`format=full`) and
//! are read-only once deserialized.

use crate::content_type::ContentType;
use crate::error::Result;
use crate::header::{Header, Headers};
use serde::{Deserialize, Serialize};

/// Body of a message part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePartBody {
    /// Attachment ID, set when the data must be fetched separately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    /// Size of the decoded data in bytes.
    #[serde(default)]
    pub size: u64,
    /// Base64url-encoded data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// One node of a message's MIME tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// Part ID (`"0"`, `"1.2"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    /// MIME type of this part.
    #[serde(default)]
    pub mime_type: String,
    /// Filename for attachments (empty otherwise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Headers for this part.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Body of this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MessagePartBody>,
    /// Child parts (for multipart containers).
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Parsed content type, or `None` if `mimeType` is malformed.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        ContentType::parse(&self.mime_type).ok()
    }

    /// Header view for this part.
    #[must_use]
    pub fn headers(&self) -> Headers<'_> {
        Headers::new(&self.headers)
    }

    /// Encoded body data, if present and non-empty.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Whether this part has child parts.
    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.parts.is_empty()
    }
}

/// A Gmail message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message ID.
    #[serde(default)]
    pub id: String,
    /// Thread ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Label IDs.
    #[serde(default)]
    pub label_ids: Vec<String>,
    /// Snippet (preview text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// History ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
    /// Internal date (epoch millis as a string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_date: Option<String>,
    /// Estimated size in bytes.
    #[serde(default)]
    pub size_estimate: u64,
    /// Root of the MIME tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<MessagePart>,
}

impl Message {
    /// Parses a message from `messages.get` JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the message shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Top-level header view (empty without a payload).
    #[must_use]
    pub fn headers(&self) -> Headers<'_> {
        self.payload
            .as_ref()
            .map_or_else(|| Headers::new(&[]), MessagePart::headers)
    }

    /// Gets a top-level header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.header("From")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.header("To")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.header("Date")
    }

    /// Checks for a label.
    #[must_use]
    pub fn has_label(&self, label_id: &str) -> bool {
        self.label_ids.iter().any(|l| l == label_id)
    }
}

/// A Gmail conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Thread ID.
    #[serde(default)]
    pub id: String,
    /// History ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
    /// Snippet of the latest message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Messages, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Parses a thread from `threads.get` JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the thread shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Thread ID: `id`, or the first message `threadId` when `id` is empty.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        if self.id.is_empty() {
            self.messages.iter().find_map(|m| m.thread_id.as_deref())
        } else {
            Some(&self.id)
        }
    }

    /// First Subject header across the thread's messages.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.messages.iter().find_map(Message::subject)
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

    const MESSAGE: &str = r#"{
        "id": "m1",
        "threadId": "t1",
        "labelIds": ["INBOX", "UNREAD"],
        "snippet": "Hi there",
        "sizeEstimate": 1234,
        "payload": {
            "partId": "",
            "mimeType": "multipart/alternative",
            "filename": "",
            "headers": [
                {"name": "From", "value": "Alice <alice@example.com>"},
                {"name": "subject", "value": "Hello"}
            ],
            "body": {"size": 0},
            "parts": [
                {"partId": "0", "mimeType": "text/plain", "body": {"size": 2, "data": "SGk="}}
            ]
        }
    }"#;

    #[test]
    fn test_message_from_json() {
        let message = Message::from_json(MESSAGE).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.thread_id.as_deref(), Some("t1"));
        assert_eq!(message.size_estimate, 1234);
        assert!(message.has_label("UNREAD"));

        let payload = message.payload.as_ref().unwrap();
        assert!(payload.is_container());
        assert_eq!(payload.data(), None);
        assert_eq!(payload.parts[0].data(), Some("SGk="));
        assert!(payload.parts[0].content_type().unwrap().is_plain_text());
    }

    #[test]
    fn test_message_header_accessors() {
        let message = Message::from_json(MESSAGE).unwrap();
        assert_eq!(message.from(), Some("Alice <alice@example.com>"));
        assert_eq!(message.subject(), Some("Hello"));
        assert_eq!(message.to(), None);
    }

    #[test]
    fn test_message_without_payload() {
        let message = Message::from_json(r#"{"id": "m2"}"#).unwrap();
        assert!(message.payload.is_none());
        assert!(message.headers().is_empty());
        assert_eq!(message.subject(), None);
    }

    #[test]
    fn test_message_rejects_wrong_shape() {
        assert!(Message::from_json(r#"{"id": 5}"#).is_err());
    }

    #[test]
    fn test_thread_subject_from_first_message_with_one() {
        let first = Message {
            payload: Some(MessagePart::default()),
            ..Message::default()
        };
        let second = Message::from_json(MESSAGE).unwrap();

        let thread = Thread {
            id: "t1".to_string(),
            messages: vec![first, second],
            ..Thread::default()
        };
        assert_eq!(thread.subject(), Some("Hello"));
    }

    #[test]
    fn test_thread_id_falls_back_to_messages() {
        let mut thread = Thread {
            id: "t1".to_string(),
            messages: vec![Message::default(), Message::from_json(MESSAGE).unwrap()],
            ..Thread::default()
        };
        assert_eq!(thread.thread_id(), Some("t1"));

        thread.id.clear();
        assert_eq!(thread.thread_id(), Some("t1"));

        thread.messages.truncate(1);
        assert_eq!(thread.thread_id(), None);
    }
}
