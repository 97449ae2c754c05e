//! Terminal side of the pipeline
//!
//! - `TerminalActivityTracker`: turns terminal lifecycle events into
//!   `SummarySignal`s for the UI
//! - `SummaryService`: gathers bounded context from a terminal and asks the
//!   agent for a summary
//! - `TerminalHost`: port to whatever owns the terminals

mod service;
mod tracker;

pub use service::{SummaryRequest, SummaryService};
pub use tracker::{SummarySignal, TerminalActivityTracker, TerminalEvent};

use async_trait::async_trait;

/// Identifier of a terminal within its host
pub type TerminalId = u64;

/// State of a terminal at the moment a summary is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSnapshot {
    pub id: TerminalId,
    pub cwd: String,
    /// Executable of the shell process, e.g. `/usr/bin/zsh`
    pub shell: String,
    /// Buffer lines, oldest first
    pub buffer: Vec<String>,
}

/// Owner of the terminals the summary service reads from
#[async_trait]
pub trait TerminalHost: Send + Sync {
    /// The terminal the user interacted with last, if any is open
    async fn last_used_terminal(&self) -> Option<TerminalSnapshot>;
}

/// Up to `max_lines` of the newest buffer lines, most recent first
pub fn recent_terminal_lines(buffer: &[String], max_lines: usize) -> Vec<String> {
    buffer.iter().rev().take(max_lines).cloned().collect()
}
