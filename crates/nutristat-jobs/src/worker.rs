//! Fixed pool of worker threads.

use crate::error::{JobError, JobResult};
use crate::gate::AdmissionGate;
use crate::job::Job;
use crate::metrics::{JobMetrics, WorkerMetrics};
use crate::queue::{QueueEntry, WorkQueue};
use crate::shutdown::ShutdownSignal;
use crate::store::ResultStore;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Prefix of worker thread names.
pub const WORKER_THREAD_PREFIX: &str = "nutristat-worker";

/// Job counters shared by the engine and its workers.
#[derive(Debug, Default)]
pub struct PoolCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
}

/// State shared by the engine and every worker.
#[derive(Debug)]
pub(crate) struct PoolShared {
    pub(crate) queue: WorkQueue,
    pub(crate) gate: AdmissionGate,
    pub(crate) store: ResultStore,
    pub(crate) signal: ShutdownSignal,
    pub(crate) counters: PoolCounters,
}

impl PoolShared {
    pub(crate) fn new(store: ResultStore) -> Self {
        Self {
            queue: WorkQueue::new(),
            gate: AdmissionGate::new(),
            store,
            signal: ShutdownSignal::new(),
            counters: PoolCounters::default(),
        }
    }
}

/// Result of joining the pool's threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub joined: usize,
    pub panicked: usize,
}

/// Handles of the running worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    size: usize,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `size` workers over the shared state.
    ///
    /// If a spawn fails, the workers already started are stopped and joined.
    pub(crate) fn start(shared: &Arc<PoolShared>, size: usize) -> JobResult<Self> {
        let mut handles = Vec::with_capacity(size);

        for index in 0..size {
            let worker = Worker {
                index,
                shared: Arc::clone(shared),
            };
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", WORKER_THREAD_PREFIX, index))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(worker = index, error = %e, "Failed to spawn worker thread");
                    shared.signal.trigger();
                    shared.gate.release_many(handles.len());
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(JobError::Worker(format!(
                        "failed to spawn worker {}: {}",
                        index, e
                    )));
                }
            }
        }

        info!(pool_size = size, "Worker pool started");

        Ok(Self {
            size,
            handles: Mutex::new(handles),
        })
    }

    /// Configured number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Joins every worker not joined yet. Blocks until they exit.
    pub fn join_all(&self) -> JoinSummary {
        let handles = std::mem::take(&mut *self.handles.lock());
        let mut summary = JoinSummary::default();

        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            match handle.join() {
                Ok(()) => summary.joined += 1,
                Err(payload) => {
                    summary.joined += 1;
                    summary.panicked += 1;
                    error!(
                        thread = %name,
                        panic = %panic_message(payload.as_ref()),
                        "Worker thread panicked"
                    );
                }
            }
        }

        summary
    }
}

struct Worker {
    index: usize,
    shared: Arc<PoolShared>,
}

impl Worker {
    fn run(self) {
        WorkerMetrics::worker_started();
        debug!(worker = self.index, "Worker started");

        let mut processed: u64 = 0;
        loop {
            if self.shared.signal.is_triggered() {
                break;
            }

            self.shared.gate.admit();

            if self.shared.signal.is_triggered() {
                break;
            }

            match self.shared.queue.pop() {
                Some(QueueEntry::Job(job)) => {
                    self.execute(&job);
                    processed += 1;
                }
                Some(QueueEntry::Sentinel) => break,
                None => {
                    warn!(worker = self.index, "Admitted with an empty queue");
                }
            }
        }

        WorkerMetrics::worker_stopped();
        debug!(worker = self.index, processed, "Worker stopped");
    }

    fn execute(&self, job: &Arc<Job>) {
        JobMetrics::job_claimed();

        let job_id = job.id();
        let task = job.task();
        let started = Instant::now();

        debug!(job_id = %job_id, task = task.name(), worker = self.index, "Executing job");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()))
            .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload.as_ref()))))
            .and_then(|output| self.shared.store.persist(job_id, &output));

        let elapsed = started.elapsed();

        match outcome {
            Ok(path) => match job.complete() {
                Ok(()) => {
                    self.shared.counters.completed.fetch_add(1, Ordering::Relaxed);
                    JobMetrics::job_completed(task.name(), elapsed);
                    debug!(
                        job_id = %job_id,
                        path = %path.display(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Job completed"
                    );
                }
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Failed to mark job as done");
                }
            },
            Err(err) => {
                warn!(job_id = %job_id, task = task.name(), error = %err, "Job failed");
                match job.fail(err.to_string()) {
                    Ok(()) => {
                        self.shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                        JobMetrics::job_failed(task.name(), err.kind(), elapsed);
                    }
                    Err(e) => {
                        error!(job_id = %job_id, error = %e, "Failed to mark job as failed");
                    }
                }
            }
        }
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
