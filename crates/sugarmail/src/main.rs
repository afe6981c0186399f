//! `sugarmail` - render Gmail threads and build messages to send.
//!
//! Usage:
//! ```bash
//! sugarmail render thread.json              # HTML of every message
//! sugarmail render thread.json --markdown   # same, as Markdown
//! sugarmail compose --to bob@example.com --subject Hi --body-file body.txt
//! sugarmail compose --reply-to thread.json --body-file reply.txt
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sugarmail_core::Settings;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sugarmail", author, version, about)]
struct Cli {
    /// Settings file to use instead of the one in the config directory.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the bodies of a `threads.get` response
    Render(commands::render::RenderArgs),

    /// Print the `messages.send` body for a new message or reply
    Compose(commands::compose::ComposeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sugarmail=info,sugarmail_core=info,sugarmail_mime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting sugarmail {}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref()).await?;
    debug!("Using settings {settings:?}");

    let output = match &cli.command {
        Command::Render(args) => commands::render::run(args, &settings).await?,
        Command::Compose(args) => commands::compose::run(args).await?,
    };
    println!("{output}");
    Ok(())
}

async fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path)
            .await
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Settings::load().await.context("failed to load settings"),
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
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_render_requires_thread() {
        let err = Cli::try_parse_from(["sugarmail", "render"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_global_settings_flag() {
        let cli = Cli::try_parse_from([
            "sugarmail",
            "render",
            "thread.json",
            "--markdown",
            "--settings",
            "/tmp/s.json",
        ])
        .unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert!(args.markdown);
        assert!(!args.no_extra);
    }

    #[test]
    fn test_compose_repeated_to() {
        let cli = Cli::try_parse_from([
            "sugarmail",
            "compose",
            "--to",
            "a@x.org",
            "--to",
            "b@x.org",
            "--subject",
            "Hi",
        ])
        .unwrap();
        let Command::Compose(args) = cli.command else {
            panic!("expected compose");
        };
        assert_eq!(args.to, vec!["a@x.org", "b@x.org"]);
        assert_eq!(args.subject.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_explicit_missing_settings_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = load_settings(Some(&dir.path().join("none.json"))).await.unwrap();
        assert_eq!(settings, Settings::default());
    }
}
