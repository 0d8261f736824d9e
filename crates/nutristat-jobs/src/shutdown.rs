//! Shutdown phase and signal shared by the engine and its workers.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reason recorded on jobs still queued when the pool stops.
pub const ABANDONED_REASON: &str = "abandoned: worker pool shut down before execution";

/// Lifecycle phase of the pool. `Draining` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPhase {
    Accepting,
    Draining,
}

impl fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownPhase::Accepting => write!(f, "accepting"),
            ShutdownPhase::Draining => write!(f, "draining"),
        }
    }
}

/// Flag workers check before and after admission.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Returns true if this call raised it.
    pub fn trigger(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Outcome of a shutdown call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Workers joined by this call.
    pub workers_joined: usize,
    /// Workers whose thread ended in a panic.
    pub workers_panicked: usize,
    /// Queued jobs marked failed because no worker ran them.
    pub jobs_abandoned: usize,
    /// False when shutdown had already completed before this call.
    pub initiated: bool,
}
