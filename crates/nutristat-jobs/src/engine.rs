//! Job engine facade: submission, status queries and shutdown.

use crate::config::EngineConfig;
use crate::error::{JobError, JobResult};
use crate::job::{Job, JobId, JobIdGenerator, JobInfo, JobOutput, JobStatus, Task, TaskInput};
use crate::metrics::JobMetrics;
use crate::registry::JobRegistry;
use crate::shutdown::{ShutdownPhase, ShutdownReport, ABANDONED_REASON};
use crate::store::ResultStore;
use crate::worker::{PoolShared, WorkerPool};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of engine counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub pool_size: usize,
    pub phase: ShutdownPhase,
    pub registered: usize,
    pub pending: usize,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Asynchronous job engine.
///
/// Submission never blocks on execution. Jobs run on a fixed pool of OS
/// threads and their outputs are written through the [`ResultStore`].
pub struct JobEngine {
    config: EngineConfig,
    ids: JobIdGenerator,
    registry: JobRegistry,
    shared: Arc<PoolShared>,
    pool: WorkerPool,
    shutdown_complete: Mutex<bool>,
    shut_down: AtomicBool,
}

impl JobEngine {
    /// Starts the worker pool.
    pub fn start(config: EngineConfig) -> JobResult<Self> {
        let shared = Arc::new(PoolShared::new(ResultStore::new(&config.results_dir)));
        let pool = WorkerPool::start(&shared, config.pool_size)?;

        info!(
            pool_size = config.pool_size,
            results_dir = %config.results_dir.display(),
            "Job engine started"
        );

        Ok(Self {
            config,
            ids: JobIdGenerator::new(),
            registry: JobRegistry::new(),
            shared,
            pool,
            shutdown_complete: Mutex::new(false),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Registers a job, enqueues it, and returns its ID without waiting.
    ///
    /// Fails with [`JobError::PoolShuttingDown`] once shutdown has begun.
    pub fn submit(&self, task: Task) -> JobResult<JobId> {
        let id = self.ids.next_id();
        let job = Arc::new(Job::new(id.clone(), task));
        let task_name = job.task().name().to_string();

        let pushed = self
            .shared
            .queue
            .push_job(job, |job| self.registry.register(Arc::clone(job)));

        if let Err(e) = pushed {
            JobMetrics::job_rejected(e.kind());
            warn!(job_id = %id, task = %task_name, error = %e, "Job rejected");
            return Err(e);
        }

        // Recorded before the release so a claim never precedes its submission.
        self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
        JobMetrics::job_submitted(&task_name);

        // Released after the push so a worker never wakes to an empty queue.
        self.shared.gate.release();
        debug!(job_id = %id, task = %task_name, "Job submitted");

        Ok(id)
    }

    /// Submits a closure bound to a question and an optional state.
    pub fn submit_fn<F>(
        &self,
        name: impl Into<String>,
        function: F,
        question: impl Into<String>,
        state: Option<String>,
    ) -> JobResult<JobId>
    where
        F: Fn(&TaskInput) -> JobResult<JobOutput> + Send + Sync + 'static,
    {
        let mut task = Task::from_fn(name, function, question);
        if let Some(state) = state {
            task = task.with_state(state);
        }
        self.submit(task)
    }

    /// Returns the status of a job.
    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.registry.lookup(id).map(|job| job.status())
    }

    /// Returns a snapshot of a job.
    pub fn job(&self, id: &JobId) -> Option<JobInfo> {
        self.registry.lookup(id).map(|job| job.info())
    }

    /// Lists every registered job in submission order.
    pub fn list_jobs(&self) -> Vec<JobInfo> {
        self.registry.list().map(|job| job.info()).collect()
    }

    /// Number of registered jobs.
    pub fn count_jobs(&self) -> usize {
        self.registry.len()
    }

    /// Path of the result artifact for `id`, whether or not it exists yet.
    pub fn result_location(&self, id: &JobId) -> PathBuf {
        self.shared.store.location(id)
    }

    /// Reads the result of a finished job.
    pub fn load_result(&self, id: &JobId) -> JobResult<Value> {
        let job = self
            .registry
            .lookup(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        match job.status() {
            JobStatus::Done => self.shared.store.load(id),
            other => Err(JobError::InvalidState {
                expected: JobStatus::Done.to_string(),
                actual: other.to_string(),
            }),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.queue.is_accepting()
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.shared.queue.phase()
    }

    /// Stops the pool and waits for every worker to exit.
    ///
    /// New submissions are rejected from the first instant. Jobs still queued
    /// once the workers have exited are marked failed. Later calls return
    /// after the first call has finished and report `initiated: false`.
    pub fn initiate_shutdown(&self) -> ShutdownReport {
        let mut complete = self.shutdown_complete.lock();
        if *complete {
            debug!("Shutdown already complete");
            return ShutdownReport::default();
        }

        let workers = self.pool.size();
        info!(workers, pending = self.shared.queue.pending_jobs(), "Initiating shutdown");

        self.shared.queue.close(workers);
        self.shared.signal.trigger();
        self.shared.gate.release_many(workers);

        let joined = self.pool.join_all();

        let mut jobs_abandoned = 0;
        for job in self.shared.queue.drain_jobs() {
            if job.fail(ABANDONED_REASON).is_ok() {
                jobs_abandoned += 1;
                self.shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                JobMetrics::job_abandoned(job.task().name());
                warn!(job_id = %job.id(), "Job abandoned at shutdown");
            }
        }

        *complete = true;
        self.shut_down.store(true, Ordering::Release);

        info!(
            workers_joined = joined.joined,
            workers_panicked = joined.panicked,
            jobs_abandoned,
            "Shutdown complete"
        );

        ShutdownReport {
            workers_joined: joined.joined,
            workers_panicked: joined.panicked,
            jobs_abandoned,
            initiated: true,
        }
    }

    /// Returns true once `initiate_shutdown` has finished. Never blocks.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Returns engine statistics.
    pub fn stats(&self) -> EngineStats {
        let counters = &self.shared.counters;
        EngineStats {
            pool_size: self.pool.size(),
            phase: self.phase(),
            registered: self.registry.len(),
            pending: self.shared.queue.pending_jobs(),
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for JobEngine {
    fn drop(&mut self) {
        if !*self.shutdown_complete.get_mut() {
            self.initiate_shutdown();
        }
    }
}

impl std::fmt::Debug for JobEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEngine")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("jobs", &self.registry.len())
            .finish_non_exhaustive()
    }
}
