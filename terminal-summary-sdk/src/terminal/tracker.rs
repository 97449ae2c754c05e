//! Terminal activity tracking
//!
//! Keeps the set of open terminals and publishes aggregated signals on a
//! broadcast channel. Subscribers only see signals sent after they
//! subscribed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::TerminalId;

const SIGNAL_CAPACITY: usize = 16;

/// Lifecycle events reported by the terminal host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Created(TerminalId),
    Disposed(TerminalId),
    DebugSessionStarted,
    DebugSessionEnded,
}

/// Aggregated signals the UI layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySignal {
    /// The last open terminal was disposed
    AllTerminalsClosed,
    /// A debug/run session ended, so there is fresh output to summarize
    BuildFinished,
}

/// Tracks open terminals and emits `SummarySignal`s
pub struct TerminalActivityTracker {
    active: Mutex<HashSet<TerminalId>>,
    signals: broadcast::Sender<SummarySignal>,
}

impl Default for TerminalActivityTracker {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl TerminalActivityTracker {
    /// Start tracking with the terminals that are already open
    pub fn new(open_terminals: impl IntoIterator<Item = TerminalId>) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            active: Mutex::new(open_terminals.into_iter().collect()),
            signals,
        }
    }

    /// Receive signals emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SummarySignal> {
        self.signals.subscribe()
    }

    pub fn active_terminals(&self) -> usize {
        self.lock_active().len()
    }

    fn lock_active(&self) -> MutexGuard<'_, HashSet<TerminalId>> {
        // the set stays consistent even if a holder panicked
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, signal: SummarySignal) {
        match self.signals.send(signal) {
            Ok(receivers) => debug!("Sent {:?} to {} subscribers", signal, receivers),
            Err(_) => debug!("Dropped {:?}: no subscribers", signal),
        }
    }

    /// Apply one event, returning the signal it produced
    pub fn handle_event(&self, event: TerminalEvent) -> Option<SummarySignal> {
        let signal = match event {
            TerminalEvent::Created(id) => {
                self.lock_active().insert(id);
                None
            }
            TerminalEvent::Disposed(id) => {
                let mut active = self.lock_active();
                // only a tracked terminal going away can close the last one
                if active.remove(&id) && active.is_empty() {
                    Some(SummarySignal::AllTerminalsClosed)
                } else {
                    None
                }
            }
            TerminalEvent::DebugSessionStarted => {
                debug!("Debug session started");
                None
            }
            TerminalEvent::DebugSessionEnded => {
                info!("Debug session ended");
                Some(SummarySignal::BuildFinished)
            }
        };

        if let Some(signal) = signal {
            self.emit(signal);
        }
        signal
    }

    /// Consume events until the sender side is dropped
    pub fn spawn(self: Arc<Self>, mut events: mpsc::Receiver<TerminalEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle_event(event);
            }
            debug!("Terminal event channel closed");
        })
    }
}
