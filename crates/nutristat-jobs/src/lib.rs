//! Nutristat Jobs - In-Process Asynchronous Job Engine
//!
//! Accepts units of work, hands back an identifier immediately, and runs the
//! work on a fixed pool of OS threads:
//! - Monotonic `job_id<N>` identifiers
//! - FIFO work queue paired with a counting admission gate
//! - Atomic per-job result artifacts on disk
//! - Panic containment per job
//! - Synchronous, idempotent shutdown
//!
//! # Architecture
//!
//! ```text
//! submit ──► JobRegistry ──► WorkQueue ──► AdmissionGate.release()
//!                                │
//!             ┌──────────────────┼──────────────────┐
//!             ▼                  ▼                  ▼
//!         Worker 0           Worker 1    ...    Worker N-1
//!             │  admit() ─► pop() ─► run ─► ResultStore.persist()
//!             ▼
//!        Done / Failed
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use nutristat_jobs::{EngineConfig, JobEngine, JobOutput};
//!
//! let engine = JobEngine::start(EngineConfig::new(4, "results"))?;
//! let id = engine.submit_fn(
//!     "answer",
//!     |_input| Ok(JobOutput::from_iter([("k", 42)])),
//!     "question",
//!     None,
//! )?;
//! // ... later
//! let result = engine.load_result(&id)?;
//! engine.initiate_shutdown();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod job;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod shutdown;
pub mod store;
pub mod worker;

pub use config::{hardware_threads, resolve_pool_size, EngineConfig};
pub use engine::{EngineStats, JobEngine};
pub use error::{JobError, JobResult};
pub use gate::AdmissionGate;
pub use job::{
    Job, JobId, JobIdGenerator, JobInfo, JobOutput, JobState, JobStatus, Task, TaskFn, TaskInput,
};
pub use metrics::{register_metrics, JobMetrics, WorkerMetrics};
pub use queue::{QueueEntry, WorkQueue};
pub use registry::JobRegistry;
pub use shutdown::{ShutdownPhase, ShutdownReport, ShutdownSignal, ABANDONED_REASON};
pub use store::ResultStore;
pub use worker::{panic_message, JoinSummary, WorkerPool};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::job::{JobOutput, JobStatus, Task, TaskInput};
    pub use crate::{JobEngine, JobError, JobId, JobResult};
}
