//! FIFO work queue with the shutdown phase held under the same lock.

use crate::error::{JobError, JobResult};
use crate::job::Job;
use crate::shutdown::ShutdownPhase;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// An entry in the work queue.
#[derive(Debug, Clone)]
pub enum QueueEntry {
    /// A job waiting for a worker.
    Job(Arc<Job>),
    /// Tells the worker that pops it to exit.
    Sentinel,
}

impl QueueEntry {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, QueueEntry::Sentinel)
    }
}

#[derive(Debug)]
struct QueueState {
    entries: VecDeque<QueueEntry>,
    phase: ShutdownPhase,
}

/// Thread-safe FIFO of pending jobs.
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
}

impl WorkQueue {
    /// Creates an empty queue in the accepting phase.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                entries: VecDeque::new(),
                phase: ShutdownPhase::Accepting,
            }),
        }
    }

    /// Registers and enqueues a job in one step.
    ///
    /// `register` runs under the queue lock, after the phase check and before
    /// the push. If it fails, nothing is enqueued.
    pub fn push_job<F>(&self, job: Arc<Job>, register: F) -> JobResult<()>
    where
        F: FnOnce(&Arc<Job>) -> JobResult<()>,
    {
        let mut state = self.state.lock();
        if state.phase != ShutdownPhase::Accepting {
            return Err(JobError::PoolShuttingDown);
        }
        register(&job)?;
        state.entries.push_back(QueueEntry::Job(job));
        Ok(())
    }

    /// Stops admissions and appends `sentinels` sentinel entries.
    ///
    /// Returns false if the queue was already closed.
    pub fn close(&self, sentinels: usize) -> bool {
        let mut state = self.state.lock();
        if state.phase != ShutdownPhase::Accepting {
            return false;
        }
        state.phase = ShutdownPhase::Draining;
        state
            .entries
            .extend(std::iter::repeat_with(|| QueueEntry::Sentinel).take(sentinels));
        true
    }

    /// Pops the head entry.
    pub fn pop(&self) -> Option<QueueEntry> {
        self.state.lock().entries.pop_front()
    }

    /// Empties the queue and returns the jobs that were still in it.
    pub fn drain_jobs(&self) -> Vec<Arc<Job>> {
        let mut state = self.state.lock();
        state
            .entries
            .drain(..)
            .filter_map(|entry| match entry {
                QueueEntry::Job(job) => Some(job),
                QueueEntry::Sentinel => None,
            })
            .collect()
    }

    /// Number of entries, sentinels included.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Number of queued jobs, sentinels excluded.
    pub fn pending_jobs(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| !entry.is_sentinel())
            .count()
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.state.lock().phase
    }

    pub fn is_accepting(&self) -> bool {
        self.phase() == ShutdownPhase::Accepting
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
