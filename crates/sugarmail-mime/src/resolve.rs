//! Body selection and quote splitting.

use crate::encoding::decode_text_lossy;
use crate::error::{Error, Result};
use crate::html::text_to_html;
use crate::message::{Message, Thread};
use crate::parts::flatten_parts;
use serde::{Deserialize, Serialize};

/// Quote and forward delimiters, highest priority first.
pub const DEFAULT_QUOTE_MARKERS: [&str; 4] = [
    "<div class=\"gmail_extra\">",
    "<div class=\"gmail_quote\">",
    "<blockquote class=\"gmail_quote\"",
    "---------- Forwarded message ----------",
];

/// HTML ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBody {
    /// The message itself.
    pub primary_html: String,
    /// Quoted or forwarded content split off the end, marker included.
    pub extra_html: Option<String>,
}

impl RenderedBody {
    /// Splits `html` at the first occurrence of the first marker found.
    ///
    /// Markers are tried in order; a later marker is only considered if no
    /// earlier one occurs anywhere in the text.
    #[must_use]
    pub fn split<S: AsRef<str>>(html: String, markers: &[S]) -> Self {
        let position = markers
            .iter()
            .map(AsRef::as_ref)
            .filter(|m| !m.is_empty())
            .find_map(|m| html.find(m));

        match position {
            Some(at) => {
                let mut primary_html = html;
                let extra_html = primary_html.split_off(at);
                Self {
                    primary_html,
                    extra_html: Some(extra_html),
                }
            }
            None => Self {
                primary_html: html,
                extra_html: None,
            },
        }
    }
}

/// Picks and decodes the body of a Gmail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyResolver {
    markers: Vec<String>,
}

impl Default for BodyResolver {
    fn default() -> Self {
        Self::with_markers(DEFAULT_QUOTE_MARKERS)
    }
}

impl BodyResolver {
    /// Creates a resolver with the default quote markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with custom quote markers, highest priority first.
    #[must_use]
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Quote markers in priority order.
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Resolves the renderable body of a message.
    ///
    /// The last `text/html` leaf wins. Without one, the first `text/plain`
    /// leaf is escaped and promoted to HTML. Other leaves are ignored, as are
    /// leaves whose body carries no data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRenderableContent`] if no leaf carries text.
    pub fn resolve(&self, message: &Message) -> Result<RenderedBody> {
        let mut html = None;
        let mut plain = None;

        for part in flatten_parts(message)? {
            let Some(data) = part.data() else {
                continue;
            };
            match part.content_type() {
                Some(ct) if ct.is_html() => html = Some(data),
                Some(ct) if ct.is_plain_text() => {
                    plain.get_or_insert(data);
                }
                _ => tracing::debug!(
                    "Skipping {} part of message {}",
                    part.mime_type,
                    message.id
                ),
            }
        }

        let html = match (html, plain) {
            (Some(data), _) => decode_text_lossy(data),
            (None, Some(data)) => text_to_html(&decode_text_lossy(data)),
            (None, None) => return Err(Error::NoRenderableContent),
        };

        Ok(RenderedBody::split(html, &self.markers))
    }

    /// Resolves every message of a thread, in order.
    pub fn resolve_thread<'a>(
        &self,
        thread: &'a Thread,
    ) -> impl Iterator<Item = (&'a Message, Result<RenderedBody>)> {
        thread
            .messages
            .iter()
            .map(move |message| (message, self.resolve(message)))
    }
}

/// Resolves a message body with the default quote markers.
///
/// # Errors
///
/// Returns [`Error::NoRenderableContent`] if no leaf carries text.
pub fn resolve_body(message: &Message) -> Result<RenderedBody> {
    BodyResolver::default().resolve(message)
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
    use crate::encoding::encode_url_safe;
    use crate::message::{MessagePart, MessagePartBody};

    fn leaf(mime_type: &str, text: &str) -> MessagePart {
        MessagePart {
            mime_type: mime_type.to_string(),
            body: Some(MessagePartBody {
                data: Some(encode_url_safe(text.as_bytes())),
                size: text.len() as u64,
                ..MessagePartBody::default()
            }),
            ..MessagePart::default()
        }
    }

    fn multipart(parts: Vec<MessagePart>) -> Message {
        Message {
            id: "m1".to_string(),
            payload: Some(MessagePart {
                mime_type: "multipart/alternative".to_string(),
                parts,
                ..MessagePart::default()
            }),
            ..Message::default()
        }
    }

    #[test]
    fn test_html_wins_over_plain_regardless_of_order() {
        let plain_first = multipart(vec![leaf("text/plain", "hi"), leaf("text/html", "<b>hi</b>")]);
        let html_first = multipart(vec![leaf("text/html", "<b>hi</b>"), leaf("text/plain", "hi")]);

        for message in [plain_first, html_first] {
            let body = resolve_body(&message).unwrap();
            assert_eq!(body.primary_html, "<b>hi</b>");
            assert_eq!(body.extra_html, None);
        }
    }

    #[test]
    fn test_last_html_leaf_wins() {
        let message = multipart(vec![leaf("text/html", "<p>first</p>"), leaf("text/html", "<p>second</p>")]);
        assert_eq!(resolve_body(&message).unwrap().primary_html, "<p>second</p>");
    }

    #[test]
    fn test_plain_text_is_promoted() {
        let message = multipart(vec![leaf("text/plain", "Hello\nhttp://x.org")]);
        assert_eq!(
            resolve_body(&message).unwrap().primary_html,
            "<!DOCTYPE html><head></head><body><p>Hello</p>\
             <p><a href=\"http://x.org\">http://x.org</a></p></body>"
        );
    }

    #[test]
    fn test_first_plain_leaf_wins() {
        let message = multipart(vec![leaf("text/plain", "body"), leaf("text/plain", "notes.txt")]);
        let html = resolve_body(&message).unwrap().primary_html;
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("notes.txt"));
    }

    #[test]
    fn test_gmail_extra_is_split_off() {
        let message = multipart(vec![leaf(
            "text/html",
            "Reply text<div class=\"gmail_extra\">X</div>",
        )]);
        let body = resolve_body(&message).unwrap();
        assert_eq!(body.primary_html, "Reply text");
        assert_eq!(body.extra_html.as_deref(), Some("<div class=\"gmail_extra\">X</div>"));
    }

    #[test]
    fn test_marker_priority_beats_position() {
        let html = "a<div class=\"gmail_quote\">q</div><div class=\"gmail_extra\">e</div>".to_string();
        let body = RenderedBody::split(html, &DEFAULT_QUOTE_MARKERS);
        assert_eq!(body.primary_html, "a<div class=\"gmail_quote\">q</div>");
        assert_eq!(body.extra_html.as_deref(), Some("<div class=\"gmail_extra\">e</div>"));
    }

    #[test]
    fn test_split_at_first_occurrence() {
        let html = "x MARK y MARK z".to_string();
        let body = RenderedBody::split(html, &["MARK"]);
        assert_eq!(body.primary_html, "x ");
        assert_eq!(body.extra_html.as_deref(), Some("MARK y MARK z"));
    }

    #[test]
    fn test_forwarded_plain_text_is_split() {
        let text = "FYI\n\n---------- Forwarded message ----------\nFrom: bob";
        let message = multipart(vec![leaf("text/plain", text)]);
        let body = resolve_body(&message).unwrap();
        assert!(body.primary_html.ends_with("<p>FYI</p><p style=\"margin-top: 1em\">"));
        assert!(
            body.extra_html
                .unwrap()
                .starts_with("---------- Forwarded message ----------</p>")
        );
    }

    #[test]
    fn test_custom_markers() {
        let resolver = BodyResolver::with_markers(["-- "]);
        let message = multipart(vec![leaf("text/html", "hello-- sig")]);
        let body = resolver.resolve(&message).unwrap();
        assert_eq!(body.primary_html, "hello");
        assert_eq!(body.extra_html.as_deref(), Some("-- sig"));
        assert_eq!(resolver.markers(), ["-- "]);
    }

    #[test]
    fn test_only_attachments_is_not_renderable() {
        let message = multipart(vec![leaf("image/jpeg", "\u{1}\u{2}"), leaf("application/pdf", "%PDF")]);
        assert!(matches!(resolve_body(&message), Err(Error::NoRenderableContent)));
    }

    #[test]
    fn test_empty_message_is_not_renderable() {
        let message = Message {
            payload: Some(MessagePart {
                mime_type: "text/plain".to_string(),
                ..MessagePart::default()
            }),
            ..Message::default()
        };
        assert!(matches!(resolve_body(&message), Err(Error::NoRenderableContent)));
    }

    #[test]
    fn test_body_without_data_is_not_renderable() {
        let sized_only = Message {
            payload: Some(MessagePart {
                mime_type: "text/plain".to_string(),
                body: Some(MessagePartBody {
                    size: 0,
                    ..MessagePartBody::default()
                }),
                ..MessagePart::default()
            }),
            ..Message::default()
        };
        assert!(matches!(resolve_body(&sized_only), Err(Error::NoRenderableContent)));

        let empty_data = multipart(vec![MessagePart {
            mime_type: "text/html".to_string(),
            body: Some(MessagePartBody {
                data: Some(String::new()),
                size: 0,
                ..MessagePartBody::default()
            }),
            ..MessagePart::default()
        }]);
        assert!(matches!(resolve_body(&empty_data), Err(Error::NoRenderableContent)));
    }

    #[test]
    fn test_body_without_data_parsed_from_json() {
        let message = Message::from_json(
            r#"{"id":"m5","payload":{"mimeType":"text/plain","body":{"size":0}}}"#,
        )
        .unwrap();
        assert!(matches!(resolve_body(&message), Err(Error::NoRenderableContent)));
    }

    #[test]
    fn test_latin1_html_is_decoded_lossily() {
        let mut part = leaf("text/html", "");
        part.body = Some(MessagePartBody {
            data: Some(encode_url_safe(b"<p>caf\xe9 ol\xe9</p>")),
            size: 15,
            ..MessagePartBody::default()
        });
        let body = resolve_body(&multipart(vec![part])).unwrap();
        assert_eq!(body.primary_html, "<p>caf\u{FFFD} ol\u{FFFD}</p>");
    }

    #[test]
    fn test_plain_text_markup_is_escaped() {
        let message = multipart(vec![leaf("text/plain", "x<y & <b>z</b>")]);
        assert_eq!(
            resolve_body(&message).unwrap().primary_html,
            "<!DOCTYPE html><head></head><body><p>x&lt;y &amp; &lt;b&gt;z&lt;/b&gt;</p></body>"
        );
    }

    #[test]
    fn test_undecodable_html_passes_through() {
        let mut part = leaf("text/html", "");
        part.body = Some(MessagePartBody {
            data: Some("<p>already html!</p>".to_string()),
            ..MessagePartBody::default()
        });
        let message = multipart(vec![part]);
        assert_eq!(resolve_body(&message).unwrap().primary_html, "<p>already html!</p>");
    }

    #[test]
    fn test_resolve_thread_pairs_messages() {
        let thread = Thread {
            id: "t1".to_string(),
            messages: vec![multipart(vec![leaf("text/html", "one")]), Message::default()],
            ..Thread::default()
        };
        let results: Vec<_> = BodyResolver::new().resolve_thread(&thread).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.as_ref().unwrap().primary_html, "one");
        assert!(results[1].1.is_err());
    }
}
