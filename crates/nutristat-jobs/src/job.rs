//! Job definitions and lifecycle state.

use crate::error::{JobError, JobResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Prefix of every generated job identifier.
pub const JOB_ID_PREFIX: &str = "job_id";

/// Unique job identifier, rendered as `job_id<N>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates a job ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the job ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the generator sequence number, if the ID was generated.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(JOB_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mints job identifiers from a counter that starts at 1 and never repeats.
#[derive(Debug)]
pub struct JobIdGenerator {
    next: AtomicU64,
}

impl JobIdGenerator {
    /// Creates a generator whose first ID is `job_id1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> JobId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        JobId(format!("{}{}", JOB_ID_PREFIX, n))
    }
}

impl Default for JobIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Job status enumeration.
///
/// `Running` is the only non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is registered and waiting for or undergoing execution.
    Running,
    /// Job completed and its result artifact is fully written.
    Done,
    /// Job ended without a result artifact.
    Failed,
}

impl JobStatus {
    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Job state including the failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Running,
    Done,
    Failed { reason: String },
}

impl JobState {
    /// Returns the status without the failure reason.
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Running => JobStatus::Running,
            JobState::Done => JobStatus::Done,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }

    /// Returns the failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            JobState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Ordered mapping produced by a job function.
///
/// Values are scalars or nested objects. Serializes as a JSON object with
/// keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOutput {
    entries: Vec<(String, Value)>,
}

impl JobOutput {
    /// Creates an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into a `serde_json::Value` object.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for JobOutput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut output = JobOutput::new();
        for (k, v) in iter {
            output.insert(k, v);
        }
        output
    }
}

impl Serialize for JobOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Arguments bound to a job function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    /// Primary argument.
    pub question: String,
    /// Optional secondary argument.
    pub state: Option<String>,
}

/// Shared job function.
pub type TaskFn = Arc<dyn Fn(&TaskInput) -> JobResult<JobOutput> + Send + Sync>;

/// A job function together with its bound arguments.
#[derive(Clone)]
pub struct Task {
    name: String,
    function: TaskFn,
    input: TaskInput,
}

impl Task {
    /// Creates a task taking only the primary argument.
    pub fn new(name: impl Into<String>, function: TaskFn, question: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function,
            input: TaskInput {
                question: question.into(),
                state: None,
            },
        }
    }

    /// Creates a task from a closure.
    pub fn from_fn<F>(name: impl Into<String>, function: F, question: impl Into<String>) -> Self
    where
        F: Fn(&TaskInput) -> JobResult<JobOutput> + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(function), question)
    }

    /// Binds the secondary argument.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.input.state = Some(state.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &TaskInput {
        &self.input
    }

    /// Invokes the function with the bound arguments.
    pub fn run(&self) -> JobResult<JobOutput> {
        (self.function)(&self.input)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: JobState,
    finished_at: Option<DateTime<Utc>>,
}

/// A registered unit of work.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    task: Task,
    submitted_at: DateTime<Utc>,
    lifecycle: Mutex<Lifecycle>,
}

impl Job {
    /// Creates a job in the `Running` state.
    pub fn new(id: JobId, task: Task) -> Self {
        Self {
            id,
            task,
            submitted_at: Utc::now(),
            lifecycle: Mutex::new(Lifecycle {
                state: JobState::Running,
                finished_at: None,
            }),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.lock().finished_at
    }

    pub fn status(&self) -> JobStatus {
        self.lifecycle.lock().state.status()
    }

    pub fn state(&self) -> JobState {
        self.lifecycle.lock().state.clone()
    }

    /// Marks the job `Done`. Call only after the artifact is written.
    pub fn complete(&self) -> JobResult<()> {
        self.transition(JobState::Done)
    }

    /// Marks the job `Failed` with a reason.
    pub fn fail(&self, reason: impl Into<String>) -> JobResult<()> {
        self.transition(JobState::Failed {
            reason: reason.into(),
        })
    }

    fn transition(&self, next: JobState) -> JobResult<()> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state != JobState::Running {
            return Err(JobError::InvalidState {
                expected: JobStatus::Running.to_string(),
                actual: lifecycle.state.status().to_string(),
            });
        }
        lifecycle.state = next;
        lifecycle.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Returns a snapshot for status queries.
    pub fn info(&self) -> JobInfo {
        let lifecycle = self.lifecycle.lock();
        JobInfo {
            job_id: self.id.clone(),
            status: lifecycle.state.status(),
            task: self.task.name.clone(),
            reason: lifecycle.state.reason().map(str::to_string),
            submitted_at: self.submitted_at,
            finished_at: lifecycle.finished_at,
        }
    }
}

/// Job information for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Job ID.
    pub job_id: JobId,

    /// Current status.
    pub status: JobStatus,

    /// Name of the bound function.
    pub task: String,

    /// Failure reason for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// When the job was registered.
    pub submitted_at: DateTime<Utc>,

    /// When the job reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constant_task() -> Task {
        Task::from_fn(
            "constant",
            |_input| Ok(JobOutput::from_iter([("k", 42)])),
            "question",
        )
    }

    #[test]
    fn test_job_id_generation_is_sequential() {
        let generator = JobIdGenerator::new();
        let ids: Vec<JobId> = (0..3).map(|_| generator.next_id()).collect();
        assert_eq!(ids[0].as_str(), "job_id1");
        assert_eq!(ids[1].as_str(), "job_id2");
        assert_eq!(ids[2].sequence(), Some(3));
    }

    #[test]
    fn test_job_id_sequence_of_foreign_id() {
        assert_eq!(JobId::from("something-else").sequence(), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(serde_json::to_value(JobStatus::Done).unwrap(), json!("done"));
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_output_preserves_insertion_order() {
        let mut output = JobOutput::new();
        output.insert("Wyoming", 30.5);
        output.insert("Alabama", 25.0);
        output.insert("Ohio", 27.25);
        output.insert("Alabama", 26.0);

        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"Wyoming":30.5,"Alabama":26.0,"Ohio":27.25}"#);
        assert_eq!(output.len(), 3);
        assert_eq!(output.get("Alabama"), Some(&json!(26.0)));
    }

    #[test]
    fn test_task_binds_arguments() {
        let task = Task::from_fn(
            "echo",
            |input| {
                let mut output = JobOutput::new();
                output.insert("question", input.question.clone());
                output.insert("state", input.state.clone());
                Ok(output)
            },
            "q",
        )
        .with_state("Ohio");

        let output = task.run().unwrap();
        assert_eq!(output.get("question"), Some(&json!("q")));
        assert_eq!(output.get("state"), Some(&json!("Ohio")));
    }

    #[test]
    fn test_job_starts_running() {
        let job = Job::new(JobId::from("job_id1"), constant_task());
        assert_eq!(job.status(), JobStatus::Running);
        assert!(job.finished_at().is_none());
    }

    #[test]
    fn test_job_transitions_once() {
        let job = Job::new(JobId::from("job_id1"), constant_task());
        job.complete().unwrap();
        assert_eq!(job.status(), JobStatus::Done);
        assert!(job.finished_at().is_some());

        let err = job.fail("late failure").unwrap_err();
        assert!(matches!(err, JobError::InvalidState { .. }));
        assert_eq!(job.status(), JobStatus::Done);
    }

    #[test]
    fn test_failed_job_keeps_reason() {
        let job = Job::new(JobId::from("job_id4"), constant_task());
        job.fail("disk full").unwrap();

        let info = job.info();
        assert_eq!(info.status, JobStatus::Failed);
        assert_eq!(info.reason.as_deref(), Some("disk full"));
        assert!(job.complete().is_err());
    }
}
