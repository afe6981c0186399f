//! `sugarmail compose` command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use sugarmail_core::compose::parse_recipients;
use sugarmail_core::{ComposeContext, Draft, Error};
use tracing::info;

use super::read_thread;

/// Arguments for the `compose` command.
#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Recipient; repeat or separate with commas for several.
    #[arg(long)]
    pub to: Vec<String>,

    /// Subject line. Defaults to "Re: <subject>" when replying.
    #[arg(long)]
    pub subject: Option<String>,

    /// File holding the message text.
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Reply inside this `threads.get` JSON response.
    #[arg(long)]
    pub reply_to: Option<PathBuf>,

    /// Sender address for the From header.
    #[arg(long)]
    pub from: Option<String>,
}

pub async fn run(args: &ComposeArgs) -> Result<String> {
    let thread = match &args.reply_to {
        Some(path) => Some(read_thread(path).await?),
        None => None,
    };

    let mut draft = thread.as_ref().map_or_else(Draft::new, Draft::reply_to);
    let to: Vec<String> = args.to.iter().flat_map(|r| parse_recipients(r)).collect();
    if !to.is_empty() {
        draft.to = to;
    }
    if let Some(subject) = &args.subject {
        draft.subject.clone_from(subject);
    }
    if let Some(path) = &args.body_file {
        draft.body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
    }

    let mut context = ComposeContext::now();
    if let Some(from) = &args.from {
        context = context.sender(from);
    }
    if let Some(thread) = &thread {
        context = context.in_thread(thread);
    }

    let message = match draft.compose(&context) {
        Ok(message) => message,
        Err(Error::Validation(errors)) => {
            let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("cannot send draft: {}", problems.join("; "));
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        "Composed {} byte message to {}",
        message.size_estimate,
        message.header("To").unwrap_or_default()
    );

    serde_json::to_string_pretty(&message).context("failed to serialize message")
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
    use serde_json::{Value, json};

    fn args() -> ComposeArgs {
        ComposeArgs {
            to: Vec::new(),
            subject: None,
            body_file: None,
            reply_to: None,
            from: None,
        }
    }

    #[tokio::test]
    async fn test_compose_new_message() {
        let dir = tempfile::TempDir::new().unwrap();
        let body = dir.path().join("body.txt");
        std::fs::write(&body, "Hello\nhttps://example.com").unwrap();

        let output = run(&ComposeArgs {
            to: vec!["a@x.org, b@x.org".into()],
            subject: Some("Hi".into()),
            body_file: Some(body),
            from: Some("me@x.org".into()),
            ..args()
        })
        .await
        .unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["labelIds"], json!(["SENT"]));
        assert!(value.get("threadId").is_none());
        assert_eq!(value["snippet"], "Hello https://example.com");
        let headers = value["payload"]["headers"].as_array().unwrap();
        assert!(headers.contains(&json!({"name": "To", "value": "a@x.org, b@x.org"})));
        assert!(headers.contains(&json!({"name": "From", "value": "me@x.org"})));
    }

    #[tokio::test]
    async fn test_compose_reply() {
        let dir = tempfile::TempDir::new().unwrap();
        let thread = dir.path().join("thread.json");
        let json = json!({
            "id": "t9",
            "messages": [{
                "id": "m1",
                "labelIds": ["INBOX"],
                "payload": {"mimeType": "text/plain", "headers": [
                    {"name": "From", "value": "Bob <bob@example.com>"},
                    {"name": "Subject", "value": "Plans"}
                ]}
            }]
        });
        std::fs::write(&thread, json.to_string()).unwrap();

        let output = run(&ComposeArgs {
            reply_to: Some(thread),
            ..args()
        })
        .await
        .unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["threadId"], "t9");
        assert_eq!(value["labelIds"], json!(["INBOX"]));
        let headers = value["payload"]["headers"].as_array().unwrap();
        assert!(headers.contains(&json!({"name": "Subject", "value": "Re: Plans"})));
        assert!(headers.contains(&json!({"name": "To", "value": "Bob <bob@example.com>"})));
    }

    #[tokio::test]
    async fn test_compose_without_recipient_fails() {
        let err = run(&args()).await.unwrap_err();
        assert!(err.to_string().contains("At least one recipient is required"));
    }
}
