//! Summary service
//!
//! Entry point used by the UI: collects bounded context from a terminal and
//! forwards it to the agent.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::broadcast;

use super::{recent_terminal_lines, SummarySignal, TerminalActivityTracker, TerminalHost, TerminalSnapshot};
use crate::agent::TerminalSummaryAgent;
use crate::error::{Result, SummaryError};
use crate::schema::Summary;

/// Context for one summary, lines most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub cwd: String,
    pub shell: String,
    pub recent_terminal_contents: Vec<String>,
}

impl SummaryRequest {
    pub fn new(cwd: impl Into<String>, shell: impl Into<String>, recent_terminal_contents: Vec<String>) -> Self {
        Self {
            cwd: cwd.into(),
            shell: shell.into(),
            recent_terminal_contents,
        }
    }

    /// Context of a terminal, keeping its newest `max_lines` lines
    pub fn from_snapshot(snapshot: &TerminalSnapshot, max_lines: usize) -> Self {
        Self::new(
            snapshot.cwd.clone(),
            snapshot.shell.clone(),
            recent_terminal_lines(&snapshot.buffer, max_lines),
        )
    }

    /// Drop everything but the `max_lines` most recent lines
    pub fn bounded(mut self, max_lines: usize) -> Self {
        self.recent_terminal_contents.truncate(max_lines);
        self
    }
}

/// Ties the terminal host, the activity tracker and the agent together
pub struct SummaryService {
    agent: Arc<TerminalSummaryAgent>,
    host: Arc<dyn TerminalHost>,
    tracker: Arc<TerminalActivityTracker>,
}

impl SummaryService {
    pub fn new(
        agent: Arc<TerminalSummaryAgent>,
        host: Arc<dyn TerminalHost>,
        tracker: Arc<TerminalActivityTracker>,
    ) -> Self {
        Self { agent, host, tracker }
    }

    pub fn tracker(&self) -> &Arc<TerminalActivityTracker> {
        &self.tracker
    }

    /// `AllTerminalsClosed` and `BuildFinished` notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SummarySignal> {
        self.tracker.subscribe()
    }

    fn max_lines(&self) -> usize {
        self.agent.config().max_terminal_lines
    }

    /// Summarize explicit context, bounded to the configured line count
    pub async fn send_summary_request(&self, request: SummaryRequest) -> Option<Summary> {
        let max_lines = self.max_lines();
        let request = if request.recent_terminal_contents.len() > max_lines {
            warn!(
                "Summary request carries {} lines, keeping the {} most recent",
                request.recent_terminal_contents.len(),
                max_lines
            );
            request.bounded(max_lines)
        } else {
            request
        };

        self.agent
            .get_summary(&request.cwd, &request.shell, &request.recent_terminal_contents)
            .await
    }

    /// Summarize the terminal the user interacted with last.
    ///
    /// Fails with `NoActiveTerminal` when the host has none open; every
    /// other failure is reported as `Ok(None)`.
    pub async fn send_summary_request_for_last_used_terminal(&self) -> Result<Option<Summary>> {
        let snapshot = self
            .host
            .last_used_terminal()
            .await
            .ok_or(SummaryError::NoActiveTerminal)?;

        info!(
            "Summarizing terminal {} ({} buffered lines)",
            snapshot.id,
            snapshot.buffer.len()
        );

        let request = SummaryRequest::from_snapshot(&snapshot, self.max_lines());
        Ok(self.send_summary_request(request).await)
    }
}
