//! Integration tests for JobEngine.
//!
//! Each test runs a real worker pool against a temporary results directory.

use nutristat_jobs::{
    EngineConfig, JobEngine, JobError, JobId, JobOutput, JobStatus, Task, ABANDONED_REASON,
};
use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn start(dir: &std::path::Path, workers: usize) -> JobEngine {
    JobEngine::start(EngineConfig::new(workers, dir)).expect("engine should start")
}

fn constant_task() -> Task {
    Task::from_fn("constant", |_| Ok(JobOutput::from_iter([("k", 42)])), "q")
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_four_jobs_write_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 4);

    let ids: Vec<JobId> = (0..4).map(|_| engine.submit(constant_task()).unwrap()).collect();
    assert!(wait_until(|| ids
        .iter()
        .all(|id| engine.status(id) == Some(JobStatus::Done))));

    for id in &ids {
        let content = fs::read_to_string(engine.result_location(id)).unwrap();
        assert_eq!(content, r#"{"k":42}"#);
    }
    assert_eq!(engine.count_jobs(), 4);
}

#[test]
fn test_each_job_runs_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 4);
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..200 {
        let runs = Arc::clone(&runs);
        engine
            .submit_fn(
                "count",
                move |_| {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(JobOutput::new())
                },
                "q",
                None,
            )
            .unwrap();
    }

    let report = engine.initiate_shutdown();
    let done = engine
        .list_jobs()
        .iter()
        .filter(|info| info.status == JobStatus::Done)
        .count();

    assert_eq!(runs.load(Ordering::SeqCst), done);
    assert_eq!(done + report.jobs_abandoned, 200);
}

#[test]
fn test_concurrent_submissions_get_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(start(dir.path(), 2));
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..100)
                    .map(|_| engine.submit(constant_task()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<JobId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let unique: HashSet<&JobId> = ids.iter().collect();

    assert_eq!(ids.len(), 1000);
    assert_eq!(unique.len(), 1000);
    assert_eq!(engine.count_jobs(), 1000);

    let mut sequences: Vec<u64> = ids.iter().filter_map(JobId::sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=1000).collect::<Vec<u64>>());
}

#[test]
fn test_submit_after_shutdown_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 2);
    engine.submit(constant_task()).unwrap();

    engine.initiate_shutdown();

    let err = engine.submit(constant_task()).unwrap_err();
    assert!(matches!(err, JobError::PoolShuttingDown));
    assert_eq!(engine.count_jobs(), 1);
}

#[test]
fn test_repeated_shutdown_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(start(dir.path(), 3));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.initiate_shutdown())
        })
        .collect();

    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(reports.iter().filter(|r| r.initiated).count(), 1);
    assert!(engine.is_shut_down());
    assert_eq!(
        reports.iter().map(|r| r.workers_joined).sum::<usize>(),
        3
    );
}

#[test]
fn test_single_submission_runs_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 4);
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let id = engine
        .submit_fn(
            "once",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(JobOutput::new())
            },
            "q",
            None,
        )
        .unwrap();

    assert!(wait_until(|| engine.status(&id) == Some(JobStatus::Done)));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(engine.stats().pending, 0);
}

#[test]
fn test_panicking_job_does_not_kill_the_pool() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 1);

    let bad = engine
        .submit(Task::from_fn("explode", |_| panic!("division by zero"), "q"))
        .unwrap();
    let good = engine.submit(constant_task()).unwrap();

    assert!(wait_until(|| engine.status(&good) == Some(JobStatus::Done)));

    let info = engine.job(&bad).unwrap();
    assert_eq!(info.status, JobStatus::Failed);
    assert!(info.reason.unwrap().contains("division by zero"));
    assert!(!engine.result_location(&bad).exists());

    let report = engine.initiate_shutdown();
    assert_eq!(report.workers_panicked, 0);
}

#[test]
fn test_storage_failure_marks_job_failed() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("results");
    fs::write(&blocker, "occupied").unwrap();

    let engine = start(&blocker, 1);
    let id = engine.submit(constant_task()).unwrap();

    assert!(wait_until(|| engine.status(&id) == Some(JobStatus::Failed)));
    assert!(engine.load_result(&id).is_err());
}

#[test]
fn test_queued_jobs_are_abandoned_at_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 1);
    let release = Arc::new(Barrier::new(2));

    let gate = Arc::clone(&release);
    let blocking = engine
        .submit_fn(
            "block",
            move |_| {
                gate.wait();
                Ok(JobOutput::new())
            },
            "q",
            None,
        )
        .unwrap();
    let queued: Vec<JobId> = (0..3).map(|_| engine.submit(constant_task()).unwrap()).collect();

    // Let the single worker pick up the blocking job before shutting down.
    assert!(wait_until(|| engine.stats().pending == 3));

    let engine = Arc::new(engine);
    let shutdown = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.initiate_shutdown())
    };

    assert!(wait_until(|| !engine.is_accepting()));
    release.wait();
    let report = shutdown.join().unwrap();

    assert_eq!(engine.status(&blocking), Some(JobStatus::Done));
    assert_eq!(report.jobs_abandoned, 3);
    for id in &queued {
        let info = engine.job(id).unwrap();
        assert_eq!(info.status, JobStatus::Failed);
        assert_eq!(info.reason.as_deref(), Some(ABANDONED_REASON));
    }
}

#[test]
fn test_result_location_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let engine = start(dir.path(), 1);
    let id = JobId::from("job_id5");

    assert_eq!(engine.result_location(&id), engine.result_location(&id));
    assert_eq!(engine.result_location(&id), dir.path().join("job_id5.json"));
}
