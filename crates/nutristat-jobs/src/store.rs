//! Durable result artifacts, one JSON file per job.

use crate::error::{JobError, JobResult};
use crate::job::{JobId, JobOutput};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// File extension of result artifacts.
pub const RESULT_EXTENSION: &str = "json";

/// Writes and reads result artifacts under a root directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact for `id`. Depends only on the ID.
    pub fn location(&self, id: &JobId) -> PathBuf {
        self.root.join(format!("{}.{}", id.as_str(), RESULT_EXTENSION))
    }

    /// Writes the artifact for `id`.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed into place, so readers never see a partial artifact.
    pub fn persist(&self, id: &JobId, output: &JobOutput) -> JobResult<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let bytes = serde_json::to_vec(output)?;
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;

        let path = self.location(id);
        file.persist(&path).map_err(|e| JobError::Io(e.error))?;

        debug!(job_id = %id, path = %path.display(), bytes = bytes.len(), "Result persisted");
        Ok(path)
    }

    /// Reads the artifact for `id`.
    pub fn load(&self, id: &JobId) -> JobResult<Value> {
        let path = self.location(id);
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => JobError::NotFound(id.to_string()),
            _ => JobError::Io(e),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Returns true if an artifact exists for `id`.
    pub fn exists(&self, id: &JobId) -> bool {
        self.location(id).is_file()
    }
}
