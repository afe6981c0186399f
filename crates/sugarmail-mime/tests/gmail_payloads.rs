//! End-to-end resolution of Gmail API payloads.
//!
//! The JSON below follows `threads.get?format=full` output, with bodies
//! encoded the way the API encodes them.

#![allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]

use sugarmail_mime::encoding::encode_url_safe;
use sugarmail_mime::search::{collect_headers, find_str};
use sugarmail_mime::{BodyResolver, Error, Thread, flatten_parts, resolve_body};

fn b64(text: &str) -> String {
    encode_url_safe(text.as_bytes())
}

fn thread_json() -> String {
    let reply_html = "<div dir=\"ltr\">Sounds good, see you at noon.</div>\
                      <div class=\"gmail_extra\"><br><div class=\"gmail_quote\">On Wed, Bob wrote:\
                      <blockquote class=\"gmail_quote\">Lunch?</blockquote></div></div>";

    format!(
        r#"{{
  "id": "15a1",
  "historyId": "9001",
  "messages": [
    {{
      "id": "m-1",
      "threadId": "15a1",
      "labelIds": ["INBOX", "CATEGORY_PERSONAL"],
      "snippet": "Lunch?",
      "sizeEstimate": 2048,
      "payload": {{
        "partId": "",
        "mimeType": "text/plain",
        "filename": "",
        "headers": [
          {{"name": "From", "value": "Bob <bob@example.com>"}},
          {{"name": "To", "value": "alice@example.com, carol@example.com"}},
          {{"name": "Subject", "value": "Lunch"}},
          {{"name": "Date", "value": "Wed, 14 Dec 2016 13:59:09 -0800"}}
        ],
        "body": {{"size": 6, "data": "{plain}"}}
      }}
    }},
    {{
      "id": "m-2",
      "threadId": "15a1",
      "labelIds": ["INBOX", "SENT"],
      "snippet": "Sounds good",
      "sizeEstimate": 9000,
      "payload": {{
        "partId": "",
        "mimeType": "multipart/mixed",
        "filename": "",
        "headers": [
          {{"name": "From", "value": "Alice <alice@example.com>"}},
          {{"name": "To", "value": "bob@example.com"}},
          {{"name": "Subject", "value": "Re: Lunch"}}
        ],
        "body": {{"size": 0}},
        "parts": [
          {{
            "partId": "0",
            "mimeType": "multipart/alternative",
            "filename": "",
            "headers": [],
            "body": {{"size": 0}},
            "parts": [
              {{"partId": "0.0", "mimeType": "text/plain", "filename": "", "body": {{"size": 10, "data": "{alt_plain}"}}}},
              {{"partId": "0.1", "mimeType": "text/html", "filename": "", "body": {{"size": 100, "data": "{alt_html}"}}}}
            ]
          }},
          {{
            "partId": "1",
            "mimeType": "image/png",
            "filename": "map.png",
            "body": {{"size": 5120, "attachmentId": "ANGjdJ8"}}
          }}
        ]
      }}
    }},
    {{
      "id": "m-3",
      "threadId": "15a1",
      "labelIds": ["INBOX"],
      "snippet": "",
      "sizeEstimate": 10,
      "payload": {{
        "partId": "",
        "mimeType": "multipart/mixed",
        "headers": [{{"name": "Subject", "value": "Re: Lunch"}}],
        "parts": [
          {{"partId": "0", "mimeType": "application/pdf", "filename": "menu.pdf", "body": {{"size": 77, "attachmentId": "X1"}}}}
        ]
      }}
    }}
  ]
}}"#,
        plain = b64("Lunch?\nhttps://maps.example.com/place?id=7"),
        alt_plain = b64("Sounds good, see you at noon."),
        alt_html = b64(reply_html),
    )
}

#[test]
fn resolves_each_message_of_a_thread() {
    let thread = Thread::from_json(&thread_json()).unwrap();
    assert_eq!(thread.subject(), Some("Lunch"));

    let resolver = BodyResolver::new();
    let bodies: Vec<_> = resolver.resolve_thread(&thread).collect();
    assert_eq!(bodies.len(), 3);

    let (first, first_body) = &bodies[0];
    assert_eq!(first.id, "m-1");
    let first_body = first_body.as_ref().unwrap();
    assert_eq!(
        first_body.primary_html,
        "<!DOCTYPE html><head></head><body><p>Lunch?</p>\
         <p><a href=\"https://maps.example.com/place?id=7\">https://maps.example.com/place?id=7</a></p>\
         </body>"
    );
    assert_eq!(first_body.extra_html, None);

    let second_body = bodies[1].1.as_ref().unwrap();
    assert_eq!(
        second_body.primary_html,
        "<div dir=\"ltr\">Sounds good, see you at noon.</div>"
    );
    let extra = second_body.extra_html.as_deref().unwrap();
    assert!(extra.starts_with("<div class=\"gmail_extra\"><br>"));
    assert!(extra.contains("Lunch?"));

    assert!(matches!(bodies[2].1, Err(Error::NoRenderableContent)));
}

#[test]
fn flattens_mixed_and_alternative() {
    let thread = Thread::from_json(&thread_json()).unwrap();
    let leaves = flatten_parts(&thread.messages[1]).unwrap();
    let types: Vec<_> = leaves.iter().map(|p| p.mime_type.as_str()).collect();
    assert_eq!(types, vec!["text/plain", "text/html", "image/png"]);
}

#[test]
fn searches_raw_thread_json() {
    let value: serde_json::Value = serde_json::from_str(&thread_json()).unwrap();
    assert_eq!(find_str(&value, "threadId"), Some("15a1"));
    assert_eq!(find_str(&value["messages"][2], "threadId"), Some("15a1"));

    let subjects: Vec<_> = collect_headers(&value, "subject")
        .into_iter()
        .map(|h| h.value)
        .collect();
    assert_eq!(subjects, vec!["Lunch", "Re: Lunch", "Re: Lunch"]);
}

#[test]
fn message_without_payload_is_not_renderable() {
    let thread = Thread::from_json(r#"{"id": "t", "messages": [{"id": "m", "threadId": "t"}]}"#).unwrap();
    assert!(matches!(
        resolve_body(&thread.messages[0]),
        Err(Error::NoRenderableContent)
    ));
}
