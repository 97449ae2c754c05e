//! Terminal contents captured from a file or stdin

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use terminal_summary_sdk::terminal::{TerminalHost, TerminalSnapshot};

/// Read the whole capture, from `path` or stdin.
///
/// Captures may hold raw bytes from colored or binary output; invalid UTF-8
/// is replaced rather than rejected.
pub async fn read_capture(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .context("Failed to read stdin")?;
            bytes
        }
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// A single captured terminal, standing in for an interactive host
pub struct CapturedTerminal {
    snapshot: TerminalSnapshot,
}

impl CapturedTerminal {
    pub const ID: u64 = 1;

    pub fn new(cwd: impl Into<String>, shell: impl Into<String>, capture: &str) -> Self {
        Self {
            snapshot: TerminalSnapshot {
                id: Self::ID,
                cwd: cwd.into(),
                shell: shell.into(),
                buffer: capture.lines().map(str::to_string).collect(),
            },
        }
    }
}

#[async_trait]
impl TerminalHost for CapturedTerminal {
    async fn last_used_terminal(&self) -> Option<TerminalSnapshot> {
        Some(self.snapshot.clone())
    }
}
