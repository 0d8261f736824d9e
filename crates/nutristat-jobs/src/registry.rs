//! Registry of every job ever submitted to the engine.

use crate::error::{JobError, JobResult};
use crate::job::{Job, JobId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent map from job ID to job.
///
/// Entries are never removed for the lifetime of the process.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a job. Fails if the ID is already taken.
    pub fn register(&self, job: Arc<Job>) -> JobResult<()> {
        let mut jobs = self.jobs.write();
        if jobs.contains_key(job.id()) {
            return Err(JobError::DuplicateIdentifier(job.id().clone()));
        }
        jobs.insert(job.id().clone(), job);
        Ok(())
    }

    /// Looks up a job by ID.
    pub fn lookup(&self, id: &JobId) -> Option<Arc<Job>> {
        self.jobs.read().get(id).cloned()
    }

    /// Returns a point-in-time snapshot ordered by generator sequence.
    ///
    /// The snapshot does not hold the lock, so it may be iterated while new
    /// jobs are being registered.
    pub fn list(&self) -> std::vec::IntoIter<Arc<Job>> {
        let mut jobs: Vec<Arc<Job>> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| {
            a.id()
                .sequence()
                .cmp(&b.id().sequence())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        jobs.into_iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobOutput, Task};

    fn job(id: &str) -> Arc<Job> {
        let task = Task::from_fn("noop", |_| Ok(JobOutput::new()), "q");
        Arc::new(Job::new(JobId::from(id), task))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = JobRegistry::new();
        registry.register(job("job_id1")).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(&JobId::from("job_id1")).is_some());
        assert!(registry.lookup(&JobId::from("job_id2")).is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = JobRegistry::new();
        registry.register(job("job_id1")).unwrap();

        let err = registry.register(job("job_id1")).unwrap_err();
        assert!(matches!(err, JobError::DuplicateIdentifier(id) if id.as_str() == "job_id1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_is_ordered_and_repeatable() {
        let registry = JobRegistry::new();
        for id in ["job_id10", "job_id2", "job_id1"] {
            registry.register(job(id)).unwrap();
        }

        let first: Vec<String> = registry.list().map(|j| j.id().to_string()).collect();
        let second: Vec<String> = registry.list().map(|j| j.id().to_string()).collect();
        assert_eq!(first, vec!["job_id1", "job_id2", "job_id10"]);
        assert_eq!(first, second);
    }
}
