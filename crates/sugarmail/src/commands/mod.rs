//! CLI command implementations.

pub mod compose;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use sugarmail_mime::Thread;

/// Reads a `threads.get` response from disk.
async fn read_thread(path: &Path) -> Result<Thread> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Thread::from_json(&json).with_context(|| format!("{} is not a Gmail thread", path.display()))
}
