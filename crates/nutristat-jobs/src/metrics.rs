//! Metrics for job engine monitoring.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! binary installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Metric names for the job engine.
pub mod names {
    /// Total jobs accepted.
    pub const JOBS_SUBMITTED_TOTAL: &str = "nutristat_jobs_submitted_total";
    /// Total jobs whose result artifact was written.
    pub const JOBS_COMPLETED_TOTAL: &str = "nutristat_jobs_completed_total";
    /// Total jobs that ended failed.
    pub const JOBS_FAILED_TOTAL: &str = "nutristat_jobs_failed_total";
    /// Total submissions rejected.
    pub const JOBS_REJECTED_TOTAL: &str = "nutristat_jobs_rejected_total";

    /// Jobs queued and not yet claimed.
    pub const JOBS_PENDING: &str = "nutristat_jobs_pending";
    /// Worker threads alive.
    pub const WORKERS_ACTIVE: &str = "nutristat_workers_active";

    /// Job execution duration in seconds.
    pub const JOB_DURATION_SECONDS: &str = "nutristat_job_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::JOBS_SUBMITTED_TOTAL, "Total number of jobs submitted");
    describe_counter!(
        names::JOBS_COMPLETED_TOTAL,
        "Total number of jobs completed successfully"
    );
    describe_counter!(names::JOBS_FAILED_TOTAL, "Total number of jobs that failed");
    describe_counter!(
        names::JOBS_REJECTED_TOTAL,
        "Total number of submissions rejected"
    );

    describe_gauge!(names::JOBS_PENDING, "Current number of queued jobs");
    describe_gauge!(names::WORKERS_ACTIVE, "Number of live worker threads");

    describe_histogram!(
        names::JOB_DURATION_SECONDS,
        "Job execution duration in seconds"
    );
}

/// Job metrics recorder.
#[derive(Clone)]
pub struct JobMetrics;

impl JobMetrics {
    /// Record a job submitted.
    pub fn job_submitted(task: &str) {
        counter!(names::JOBS_SUBMITTED_TOTAL, "task" => task.to_string()).increment(1);
        gauge!(names::JOBS_PENDING).increment(1.0);
    }

    /// Record a job claimed by a worker.
    pub fn job_claimed() {
        gauge!(names::JOBS_PENDING).decrement(1.0);
    }

    /// Record a job completed.
    pub fn job_completed(task: &str, duration: Duration) {
        counter!(names::JOBS_COMPLETED_TOTAL, "task" => task.to_string()).increment(1);

        histogram!(
            names::JOB_DURATION_SECONDS,
            "task" => task.to_string(),
            "status" => "done"
        )
        .record(duration.as_secs_f64());
    }

    /// Record a job failed.
    pub fn job_failed(task: &str, kind: &str, duration: Duration) {
        counter!(
            names::JOBS_FAILED_TOTAL,
            "task" => task.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);

        histogram!(
            names::JOB_DURATION_SECONDS,
            "task" => task.to_string(),
            "status" => "failed"
        )
        .record(duration.as_secs_f64());
    }

    /// Record a queued job abandoned at shutdown.
    pub fn job_abandoned(task: &str) {
        gauge!(names::JOBS_PENDING).decrement(1.0);
        counter!(
            names::JOBS_FAILED_TOTAL,
            "task" => task.to_string(),
            "kind" => "abandoned"
        )
        .increment(1);
    }

    /// Record a rejected submission.
    pub fn job_rejected(reason: &str) {
        counter!(names::JOBS_REJECTED_TOTAL, "reason" => reason.to_string()).increment(1);
    }
}

/// Worker metrics recorder.
#[derive(Clone)]
pub struct WorkerMetrics;

impl WorkerMetrics {
    /// Record a worker thread started.
    pub fn worker_started() {
        gauge!(names::WORKERS_ACTIVE).increment(1.0);
    }

    /// Record a worker thread stopped.
    pub fn worker_stopped() {
        gauge!(names::WORKERS_ACTIVE).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::JOBS_SUBMITTED_TOTAL.starts_with("nutristat_"));
        assert!(names::JOB_DURATION_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        register_metrics();
        JobMetrics::job_submitted("states_mean");
        JobMetrics::job_claimed();
        JobMetrics::job_completed("states_mean", Duration::from_millis(5));
        JobMetrics::job_failed("best5", "panicked", Duration::from_millis(1));
        JobMetrics::job_rejected("pool_shutting_down");
        WorkerMetrics::worker_started();
        WorkerMetrics::worker_stopped();
    }
}
