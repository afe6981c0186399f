//! Drafts and the `messages.send` request body.

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use sugarmail_mime::encoding::encode_url_safe;
use sugarmail_mime::{ContentType, Header, MessagePart, MessagePartBody, Thread, compose_html};

use super::validation::{ValidationResult, validate_draft};
use crate::error::{Error, Result};

/// Label given to messages sent outside any thread.
pub const SENT_LABEL: &str = "SENT";

/// Characters of body text kept in the snippet.
const SNIPPET_LENGTH: usize = 100;

/// Inline markup the editor may put into a draft body.
const EDITOR_TAGS: [&str; 6] = ["<b>", "</b>", "<i>", "</i>", "<u>", "</u>"];

/// A message being written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Body text; may carry `<b>`, `<i>` and `<u>` markup.
    pub body: String,
}

impl Draft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a draft answering the last message of a thread.
    #[must_use]
    pub fn reply_to(thread: &Thread) -> Self {
        let subject = thread.subject().unwrap_or_default();
        let subject = if subject.to_lowercase().starts_with("re:") {
            subject.to_string()
        } else {
            format!("Re: {subject}")
        };

        let to = thread
            .messages
            .last()
            .and_then(|m| m.header("Reply-To").or_else(|| m.from()))
            .map(|from| vec![from.to_string()])
            .unwrap_or_default();

        Self {
            to,
            subject,
            ..Self::default()
        }
    }

    /// Creates a draft forwarding a thread.
    #[must_use]
    pub fn forward(thread: &Thread) -> Self {
        let subject = thread.subject().unwrap_or_default();
        let subject = if subject.to_lowercase().starts_with("fwd:") {
            subject.to_string()
        } else {
            format!("Fwd: {subject}")
        };

        Self {
            subject,
            ..Self::default()
        }
    }

    /// Sets recipients from a free-form field.
    ///
    /// Addresses may be separated by commas, semicolons or, for bare
    /// addresses, spaces.
    #[must_use]
    pub fn with_recipients(mut self, field: &str) -> Self {
        self.to = parse_recipients(field);
        self
    }

    /// Checks the draft can be sent.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn validate(&self) -> ValidationResult {
        validate_draft(self)
    }

    /// Body with the editor's markup removed.
    #[must_use]
    pub fn plain_body(&self) -> String {
        EDITOR_TAGS
            .iter()
            .fold(self.body.clone(), |text, tag| text.replace(tag, ""))
    }

    /// Builds the `messages.send` request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the draft has no usable recipient.
    pub fn compose(&self, context: &ComposeContext<'_>) -> Result<ComposedMessage> {
        self.validate().map_err(Error::Validation)?;

        let html = compose_html(&self.body);
        let data = encode_url_safe(html.as_bytes());
        let size = data.len() as u64;

        let mut headers = vec![
            Header::new("MIME-Version", "1.0"),
            Header::new("Date", context.date.to_rfc2822()),
            Header::new("Subject", &self.subject),
            Header::new("Content-Type", ContentType::text_html().to_string()),
        ];
        if let Some(from) = context.from {
            headers.push(Header::new("From", from));
        }
        let recipients: Vec<&str> = self
            .to
            .iter()
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
            .collect();
        headers.push(Header::new("To", recipients.join(", ")));

        let label_ids = context
            .thread
            .and_then(|t| t.messages.first())
            .map(|m| m.label_ids.clone())
            .filter(|labels| !labels.is_empty())
            .unwrap_or_else(|| vec![SENT_LABEL.to_string()]);

        let thread_id = context
            .thread
            .and_then(Thread::thread_id)
            .map(ToString::to_string);

        Ok(ComposedMessage {
            payload: MessagePart {
                part_id: Some("0".to_string()),
                mime_type: "text/html".to_string(),
                filename: Some(String::new()),
                headers,
                body: Some(MessagePartBody {
                    attachment_id: None,
                    size,
                    data: Some(data),
                }),
                parts: Vec::new(),
            },
            snippet: snippet(&self.plain_body()),
            size_estimate: size,
            label_ids,
            thread_id,
        })
    }
}

/// What a draft is composed against.
#[derive(Debug, Clone)]
pub struct ComposeContext<'a> {
    /// Sender address from the user's profile.
    pub from: Option<&'a str>,
    /// Thread being replied to.
    pub thread: Option<&'a Thread>,
    /// Value of the Date header.
    pub date: DateTime<FixedOffset>,
}

impl<'a> ComposeContext<'a> {
    /// Context for a new message dated now.
    #[must_use]
    pub fn now() -> Self {
        Self {
            from: None,
            thread: None,
            date: Local::now().fixed_offset(),
        }
    }

    /// Sets the sender address.
    #[must_use]
    pub const fn sender(mut self, address: &'a str) -> Self {
        self.from = Some(address);
        self
    }

    /// Replies inside `thread`.
    #[must_use]
    pub const fn in_thread(mut self, thread: &'a Thread) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Sets the Date header value.
    #[must_use]
    pub const fn dated(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = date;
        self
    }
}

/// A `messages.send` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedMessage {
    /// Single `text/html` part carrying headers and the encoded body.
    pub payload: MessagePart,
    /// Plain preview of the body.
    pub snippet: String,
    /// Encoded body length.
    pub size_estimate: u64,
    /// Labels to apply.
    pub label_ids: Vec<String>,
    /// Thread to post into, when replying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl ComposedMessage {
    /// Header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.headers().get(name)
    }

    /// Serializes to the JSON the API expects.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(Into::into)
    }
}

/// Splits a recipients field into addresses.
#[must_use]
pub fn parse_recipients(field: &str) -> Vec<String> {
    field
        .split([',', ';'])
        .flat_map(|piece| {
            let piece = piece.trim();
            if piece.contains('<') {
                vec![piece]
            } else {
                piece.split_whitespace().collect()
            }
        })
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn snippet(text: &str) -> String {
    text.replace('\n', " ").chars().take(SNIPPET_LENGTH).collect()
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
    use sugarmail_mime::encoding::decode_text;

    fn fixed_date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc2822("Wed, 14 Dec 2016 13:59:09 -0800").unwrap()
    }

    fn lunch_thread() -> Thread {
        serde_json::from_value(json!({
            "id": "t1",
            "messages": [
                {
                    "id": "m1",
                    "threadId": "t1",
                    "labelIds": ["INBOX", "CATEGORY_PERSONAL"],
                    "payload": {"mimeType": "text/plain", "headers": [
                        {"name": "From", "value": "Bob <bob@example.com>"},
                        {"name": "Subject", "value": "Lunch"}
                    ]}
                },
                {
                    "id": "m2",
                    "threadId": "t1",
                    "payload": {"mimeType": "text/plain", "headers": [
                        {"name": "From", "value": "Carol <carol@example.com>"},
                        {"name": "Reply-To", "value": "list@example.com"}
                    ]}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_compose_new_message() {
        let draft = Draft {
            to: vec!["bob@example.com".into(), "carol@example.com".into()],
            subject: "Hello".into(),
            body: "Hi <b>Bob</b>,\nsee http://x.org".into(),
        };
        let context = ComposeContext::now().sender("alice@example.com").dated(fixed_date());
        let message = draft.compose(&context).unwrap();

        let names: Vec<_> = message.payload.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["MIME-Version", "Date", "Subject", "Content-Type", "From", "To"]
        );
        assert_eq!(message.header("Date"), Some("Wed, 14 Dec 2016 13:59:09 -0800"));
        assert_eq!(message.header("Content-Type"), Some("text/html; charset=UTF-8"));
        assert_eq!(message.header("To"), Some("bob@example.com, carol@example.com"));

        assert_eq!(message.label_ids, vec!["SENT"]);
        assert_eq!(message.thread_id, None);
        assert_eq!(message.snippet, "Hi Bob, see http://x.org");

        let data = message.payload.body.as_ref().unwrap().data.as_deref().unwrap();
        assert_eq!(message.size_estimate, data.len() as u64);
        assert_eq!(
            decode_text(data).unwrap(),
            "<!DOCTYPE html><head></head><body><p>Hi <b>Bob</b>,</p>\
             <p>see <a href=\"http://x.org\">http://x.org</a></p></body>"
        );
    }

    #[test]
    fn test_compose_reply_in_thread() {
        let thread = lunch_thread();
        let draft = Draft {
            body: "Sure".into(),
            ..Draft::reply_to(&thread)
        };
        assert_eq!(draft.subject, "Re: Lunch");
        assert_eq!(draft.to, vec!["list@example.com"]);

        let context = ComposeContext::now().in_thread(&thread).dated(fixed_date());
        let message = draft.compose(&context).unwrap();
        assert_eq!(message.thread_id.as_deref(), Some("t1"));
        assert_eq!(message.label_ids, vec!["INBOX", "CATEGORY_PERSONAL"]);
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_compose_json_shape() {
        let thread = lunch_thread();
        let draft = Draft::new().with_recipients("bob@example.com");
        let context = ComposeContext::now().in_thread(&thread).dated(fixed_date());
        let value = draft.compose(&context).unwrap().to_json().unwrap();

        assert_eq!(value["threadId"], "t1");
        assert_eq!(value["payload"]["mimeType"], "text/html");
        assert_eq!(value["payload"]["partId"], "0");
        assert_eq!(value["payload"]["filename"], "");
        assert_eq!(value["payload"]["parts"], json!([]));
        assert!(value["payload"]["body"]["data"].is_string());
        assert!(value["payload"]["body"].get("attachmentId").is_none());
        assert!(value["sizeEstimate"].is_u64());
        assert_eq!(value["labelIds"], json!(["INBOX", "CATEGORY_PERSONAL"]));
    }

    #[test]
    fn test_compose_rejects_missing_recipient() {
        let err = Draft::new().compose(&ComposeContext::now()).unwrap_err();
        assert!(matches!(err, Error::Validation(errors) if errors.len() == 1));
    }

    #[test]
    fn test_reply_subject_not_doubled() {
        let mut thread = lunch_thread();
        thread.messages[0].payload.as_mut().unwrap().headers[1].value = "RE: Lunch".into();
        assert_eq!(Draft::reply_to(&thread).subject, "RE: Lunch");
        assert_eq!(Draft::forward(&thread).subject, "Fwd: RE: Lunch");
        assert!(Draft::forward(&thread).to.is_empty());
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x".repeat(250);
        assert_eq!(snippet(&long).len(), 100);
        assert_eq!(snippet("a\nb"), "a b");
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients("a@x.org b@y.org, Carol Doe <c@z.org>; "),
            vec!["a@x.org", "b@y.org", "Carol Doe <c@z.org>"]
        );
        assert!(parse_recipients("  ").is_empty());
    }
}
