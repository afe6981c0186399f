//! Conversation view model.
//!
//! Tracks which thread is on screen and which of its messages have already
//! been turned into cards, so a refreshed thread only adds what is new.

mod date;

pub use date::{DateOrder, format_date};

use serde::Deserialize;
use serde_json::Value;
use sugarmail_mime::search::find_str;
use sugarmail_mime::{BodyResolver, Message, RenderedBody, Thread};
use tracing::debug;

use crate::error::Result;

/// Everything the host needs to display one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCard {
    /// Gmail message ID.
    pub message_id: String,
    /// From header.
    pub from: String,
    /// To header.
    pub to: String,
    /// One recipient per line, for a tooltip.
    pub recipients_tooltip: String,
    /// Short date from the Date header.
    pub date: String,
    /// Resolved body; `None` means the host shows a placeholder.
    pub body: Option<RenderedBody>,
}

impl MessageCard {
    /// Builds a card for a message.
    #[must_use]
    pub fn new(message: &Message, resolver: &BodyResolver, order: DateOrder) -> Self {
        let to = message.to().unwrap_or_default().to_string();
        let body = match resolver.resolve(message) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("Message {}: {e}", message.id);
                None
            }
        };

        Self {
            message_id: message.id.clone(),
            from: message.from().unwrap_or_default().to_string(),
            recipients_tooltip: to.split(", ").collect::<Vec<_>>().join("\n"),
            to,
            date: message
                .date()
                .map(|d| format_date(d, order))
                .unwrap_or_default(),
            body,
        }
    }
}

/// The thread currently on screen.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    resolver: BodyResolver,
    date_order: DateOrder,
    thread_id: Option<String>,
    subject: Option<String>,
    shown: Vec<String>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub fn new(resolver: BodyResolver, date_order: DateOrder) -> Self {
        Self {
            resolver,
            date_order,
            ..Self::default()
        }
    }

    /// Shows a thread, returning cards for the messages to append.
    ///
    /// A different thread replaces the current one and every message gets a
    /// card. The same thread again only yields cards for messages not shown
    /// yet.
    pub fn set_thread(&mut self, thread: &Thread) -> Vec<MessageCard> {
        self.show(thread.thread_id().map(ToString::to_string), thread)
    }

    /// Like [`set_thread`](Self::set_thread), for raw `threads.get` JSON.
    ///
    /// The thread id is searched for anywhere in the value, since older API
    /// versions only carry it on the messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not thread-shaped.
    pub fn set_thread_value(&mut self, value: &Value) -> Result<Vec<MessageCard>> {
        let thread = Thread::deserialize(value)?;
        let thread_id = find_str(value, "threadId")
            .or_else(|| find_str(value, "id"))
            .map(ToString::to_string);
        Ok(self.show(thread_id, &thread))
    }

    fn show(&mut self, thread_id: Option<String>, thread: &Thread) -> Vec<MessageCard> {
        if self.thread_id.is_none() || self.thread_id != thread_id {
            self.clear();
            self.thread_id = thread_id;
            self.subject = thread.subject().map(ToString::to_string);
        }

        let cards: Vec<_> = thread
            .messages
            .iter()
            .filter(|m| !self.shown.contains(&m.id))
            .map(|m| MessageCard::new(m, &self.resolver, self.date_order))
            .collect();

        self.shown.extend(cards.iter().map(|c| c.message_id.clone()));
        cards
    }

    /// Forgets the current thread.
    pub fn clear(&mut self) {
        self.thread_id = None;
        self.subject = None;
        self.shown.clear();
    }

    /// ID of the thread on screen.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Subject of the thread on screen.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Number of messages shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    /// Whether nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
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
    use serde_json::json;
    use sugarmail_mime::encoding::encode_url_safe;

    fn message_json(id: &str, subject: &str, html: &str) -> Value {
        json!({
            "id": id,
            "threadId": "t1",
            "payload": {
                "mimeType": "text/html",
                "headers": [
                    {"name": "From", "value": "Bob <bob@example.com>"},
                    {"name": "To", "value": "alice@example.com, carol@example.com"},
                    {"name": "Subject", "value": subject},
                    {"name": "Date", "value": "Wed, 14 Dec 2016 13:59:09 -0800"}
                ],
                "body": {"size": html.len(), "data": encode_url_safe(html.as_bytes())}
            }
        })
    }

    fn thread(messages: Vec<Value>) -> Thread {
        Thread::deserialize(json!({"id": "t1", "messages": messages})).unwrap()
    }

    #[test]
    fn test_card_fields() {
        let message: Message = serde_json::from_value(message_json("m1", "Hi", "<p>hey</p>")).unwrap();
        let card = MessageCard::new(&message, &BodyResolver::new(), DateOrder::DayMonthYear);

        assert_eq!(card.message_id, "m1");
        assert_eq!(card.from, "Bob <bob@example.com>");
        assert_eq!(card.recipients_tooltip, "alice@example.com\ncarol@example.com");
        assert_eq!(card.date, "14/12/2016");
        assert_eq!(card.body.unwrap().primary_html, "<p>hey</p>");
    }

    #[test]
    fn test_card_without_body() {
        let message = Message {
            id: "m9".to_string(),
            ..Message::default()
        };
        let card = MessageCard::new(&message, &BodyResolver::new(), DateOrder::DayMonthYear);
        assert!(card.body.is_none());
        assert_eq!(card.from, "");
        assert_eq!(card.date, "");
    }

    #[test]
    fn test_same_thread_only_adds_new_messages() {
        let mut conversation = Conversation::default();

        let first = thread(vec![message_json("m1", "Lunch", "a")]);
        assert_eq!(conversation.set_thread(&first).len(), 1);
        assert_eq!(conversation.subject(), Some("Lunch"));

        let refreshed = thread(vec![
            message_json("m1", "Lunch", "a"),
            message_json("m2", "Re: Lunch", "b"),
        ]);
        let added = conversation.set_thread(&refreshed);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].message_id, "m2");
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.subject(), Some("Lunch"));
    }

    #[test]
    fn test_other_thread_replaces() {
        let mut conversation = Conversation::default();
        conversation.set_thread(&thread(vec![message_json("m1", "Lunch", "a")]));

        let other = Thread::deserialize(json!({
            "id": "t2",
            "messages": [message_json("m7", "Dinner", "c")]
        }))
        .unwrap();
        let cards = conversation.set_thread(&other);
        assert_eq!(cards.len(), 1);
        assert_eq!(conversation.thread_id(), Some("t2"));
        assert_eq!(conversation.subject(), Some("Dinner"));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_thread_id_from_messages_when_missing() {
        let mut conversation = Conversation::default();
        let value = json!({"messages": [message_json("m1", "Lunch", "a")]});
        let cards = conversation.set_thread_value(&value).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(conversation.thread_id(), Some("t1"));
    }

    #[test]
    fn test_set_thread_value_rejects_garbage() {
        let mut conversation = Conversation::default();
        assert!(conversation.set_thread_value(&json!({"messages": 3})).is_err());
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut conversation = Conversation::new(BodyResolver::new(), DateOrder::MonthDayYear);
        let cards = conversation.set_thread(&thread(vec![message_json("m1", "Lunch", "a")]));
        assert_eq!(cards[0].date, "12/14/2016");

        conversation.clear();
        assert!(conversation.is_empty());
        assert_eq!(conversation.thread_id(), None);
        assert_eq!(conversation.set_thread(&thread(vec![message_json("m1", "Lunch", "a")])).len(), 1);
    }
}
