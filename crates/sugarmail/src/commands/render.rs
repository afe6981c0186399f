//! `sugarmail render` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sugarmail_core::{ClientEvent, Conversation, EventBus, LabelTable, MessageCard, Settings};
use sugarmail_mime::Thread;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::read_thread;

/// Shown in place of a body that could not be resolved.
pub const NO_CONTENT: &str = "(no content)";

/// Arguments for the `render` command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Path to a `threads.get` (format=full) JSON response.
    pub thread: PathBuf,

    /// Convert bodies to Markdown.
    #[arg(long)]
    pub markdown: bool,

    /// Leave out quoted and forwarded content.
    #[arg(long)]
    pub no_extra: bool,
}

/// How bodies are printed.
#[derive(Debug, Clone, Copy)]
struct Output {
    markdown: bool,
    extra: bool,
}

impl From<&RenderArgs> for Output {
    fn from(args: &RenderArgs) -> Self {
        Self {
            markdown: args.markdown,
            extra: !args.no_extra,
        }
    }
}

pub async fn run(args: &RenderArgs, settings: &Settings) -> Result<String> {
    let thread = read_thread(&args.thread).await?;
    info!("Rendering thread with {} message(s)", thread.messages.len());

    let bus = EventBus::default();
    let view = tokio::spawn(view(
        bus.subscribe(),
        Conversation::new(settings.resolver(), settings.date_order),
        settings.label_table(),
        Output::from(args),
    ));

    bus.publish(ClientEvent::LoadStarted);
    bus.publish(ClientEvent::ThreadLoaded(Box::new(thread)));
    drop(bus);

    view.await.context("view task panicked")?
}

/// Consumes client events until the bus closes, returning the text shown.
async fn view(
    mut events: broadcast::Receiver<ClientEvent>,
    mut conversation: Conversation,
    labels: LabelTable,
    output: Output,
) -> Result<String> {
    let mut text = String::new();

    loop {
        match events.recv().await {
            Ok(ClientEvent::ThreadLoaded(thread)) => {
                let fresh = conversation.thread_id() != thread.thread_id();
                let cards = conversation.set_thread(&thread);
                if fresh {
                    text.clear();
                    write_heading(&mut text, conversation.subject(), &thread, &labels);
                }
                for card in &cards {
                    write_card(&mut text, card, output)?;
                }
            }
            Ok(ClientEvent::SendError(e)) => warn!("Send failed: {e}"),
            Ok(event) => debug!("Ignoring {}", event.kind()),
            Err(RecvError::Lagged(missed)) => warn!("View missed {missed} event(s)"),
            Err(RecvError::Closed) => break,
        }
    }

    Ok(text.trim_end().to_string())
}

fn write_heading(text: &mut String, subject: Option<&str>, thread: &Thread, labels: &LabelTable) {
    let _ = writeln!(text, "Subject: {}", subject.unwrap_or_default());

    let mut names: Vec<&str> = Vec::new();
    for name in thread
        .messages
        .iter()
        .flat_map(|m| &m.label_ids)
        .filter_map(|id| labels.display_name(id))
    {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if !names.is_empty() {
        let _ = writeln!(text, "Labels: {}", names.join(", "));
    }
    text.push('\n');
}

fn write_card(text: &mut String, card: &MessageCard, output: Output) -> Result<()> {
    let _ = writeln!(text, "From: {}", card.from);
    let _ = writeln!(text, "To: {}", card.to);
    let _ = writeln!(text, "Date: {}\n", card.date);

    match &card.body {
        Some(body) => {
            let _ = writeln!(text, "{}", format_body(&body.primary_html, output)?);
            if output.extra
                && let Some(extra) = &body.extra_html
            {
                let _ = writeln!(text, "\n[quoted]\n{}", format_body(extra, output)?);
            }
        }
        None => {
            let _ = writeln!(text, "{NO_CONTENT}");
        }
    }

    text.push_str("\n---\n\n");
    Ok(())
}

fn format_body(html: &str, output: Output) -> Result<String> {
    if output.markdown {
        htmd::convert(html).context("failed to convert body to Markdown")
    } else {
        Ok(html.to_string())
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

    fn thread_json() -> serde_json::Value {
        let html = "<p>See you</p><div class=\"gmail_quote\">On Mon Bob wrote</div>";
        json!({
            "id": "t1",
            "messages": [
                {
                    "id": "m1",
                    "threadId": "t1",
                    "labelIds": ["CATEGORY_PERSONAL", "INBOX"],
                    "payload": {
                        "mimeType": "text/plain",
                        "headers": [
                            {"name": "From", "value": "Bob <bob@example.com>"},
                            {"name": "To", "value": "alice@example.com"},
                            {"name": "Subject", "value": "Lunch"},
                            {"name": "Date", "value": "Wed, 14 Dec 2016 13:59:09 -0800"}
                        ],
                        "body": {"size": 5, "data": encode_url_safe(b"Lunch?")}
                    }
                },
                {
                    "id": "m2",
                    "threadId": "t1",
                    "labelIds": ["SENT"],
                    "payload": {
                        "mimeType": "text/html",
                        "headers": [{"name": "From", "value": "alice@example.com"}],
                        "body": {"size": html.len(), "data": encode_url_safe(html.as_bytes())}
                    }
                },
                {
                    "id": "m3",
                    "threadId": "t1",
                    "payload": {"mimeType": "multipart/mixed"}
                }
            ]
        })
    }

    async fn render(args: &RenderArgs) -> String {
        run(args, &Settings::default()).await.unwrap()
    }

    fn write_thread(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("thread.json");
        std::fs::write(&path, thread_json().to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_render_html() {
        let dir = tempfile::TempDir::new().unwrap();
        let text = render(&RenderArgs {
            thread: write_thread(&dir),
            markdown: false,
            no_extra: false,
        })
        .await;

        assert!(text.starts_with("Subject: Lunch\nLabels: Received, Sent\n\nFrom: Bob"));
        assert!(text.contains("Date: 14/12/2016"));
        assert!(text.contains("<p>Lunch?</p>"));
        assert!(text.contains("<p>See you</p>\n\n[quoted]\n<div class=\"gmail_quote\">"));
        assert!(text.contains(NO_CONTENT));
        assert_eq!(text.matches("---").count(), 3);
    }

    #[tokio::test]
    async fn test_render_without_extra() {
        let dir = tempfile::TempDir::new().unwrap();
        let text = render(&RenderArgs {
            thread: write_thread(&dir),
            markdown: false,
            no_extra: true,
        })
        .await;
        assert!(!text.contains("[quoted]"));
        assert!(!text.contains("On Mon Bob wrote"));
    }

    #[tokio::test]
    async fn test_render_markdown() {
        let dir = tempfile::TempDir::new().unwrap();
        let text = render(&RenderArgs {
            thread: write_thread(&dir),
            markdown: true,
            no_extra: true,
        })
        .await;
        assert!(text.contains("See you"));
        assert!(!text.contains("<p>"));
    }

    #[tokio::test]
    async fn test_render_missing_file() {
        let args = RenderArgs {
            thread: PathBuf::from("/nonexistent/thread.json"),
            markdown: false,
            no_extra: false,
        };
        let err = run(&args, &Settings::default()).await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn test_view_ignores_other_events() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        bus.publish(ClientEvent::SendError("offline".into()));
        drop(bus);

        let text = view(
            rx,
            Conversation::default(),
            LabelTable::default(),
            Output {
                markdown: false,
                extra: true,
            },
        )
        .await
        .unwrap();
        assert!(text.is_empty());
    }
}
