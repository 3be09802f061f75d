//! In-memory backends
//!
//! Recording implementations of [`BatchBackend`] and [`ArtifactStore`] used
//! when the launcher runs with `BACKEND_MODE=memory` and by the test suites.
//! Both can be told to fail so error paths can be exercised.
//!
//! These are for local development and tests only. Nothing runs the recorded
//! jobs, the batch history is capped at [`MAX_RECORDED_SUBMISSIONS`] and the
//! artifact store keeps every document written to it for the life of the
//! process.

use async_trait::async_trait;
use mochi_core::domain::artifact::ArtifactKey;
use mochi_core::domain::job::{JobId, JobNode};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{ArtifactStore, BackendError, BatchBackend, ObjectStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Batch Backend
// =============================================================================

/// A submission accepted by [`InMemoryBatchBackend`]
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub job_id: JobId,
    pub node: JobNode,
}

/// Submissions retained by [`InMemoryBatchBackend`] before the oldest are dropped
pub const MAX_RECORDED_SUBMISSIONS: usize = 10_000;

struct BatchState {
    submissions: VecDeque<RecordedSubmission>,
    known_ids: HashSet<JobId>,
    rejected_definitions: HashSet<String>,
    capacity: usize,
}

impl BatchState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            submissions: VecDeque::new(),
            known_ids: HashSet::new(),
            rejected_definitions: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    fn record(&mut self, submission: RecordedSubmission) {
        while self.submissions.len() >= self.capacity {
            if let Some(evicted) = self.submissions.pop_front() {
                self.known_ids.remove(&evicted.job_id);
            }
        }
        self.known_ids.insert(submission.job_id.clone());
        self.submissions.push_back(submission);
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::with_capacity(MAX_RECORDED_SUBMISSIONS)
    }
}

/// Batch backend that records submissions and hands out UUID job ids
///
/// Cloning shares the recorded state. Once more than the capacity has been
/// accepted the oldest submissions are forgotten, and later jobs that depend
/// on them are refused like any other unknown dependency.
#[derive(Clone, Default)]
pub struct InMemoryBatchBackend {
    state: Arc<Mutex<BatchState>>,
}

impl InMemoryBatchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` submissions
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(BatchState::with_capacity(capacity))),
        }
    }

    /// Reject every submission for the given job definition
    pub fn reject_definition(self, definition: impl Into<String>) -> Self {
        lock(&self.state).rejected_definitions.insert(definition.into());
        self
    }

    /// All accepted submissions, in submission order
    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        lock(&self.state).submissions.iter().cloned().collect()
    }

    /// Names of all accepted submissions, in submission order
    pub fn submitted_names(&self) -> Vec<String> {
        lock(&self.state)
            .submissions
            .iter()
            .map(|s| s.node.name.clone())
            .collect()
    }

    /// The accepted submission with the given id
    pub fn find(&self, job_id: &JobId) -> Option<RecordedSubmission> {
        lock(&self.state)
            .submissions
            .iter()
            .find(|s| &s.job_id == job_id)
            .cloned()
    }
}

#[async_trait]
impl BatchBackend for InMemoryBatchBackend {
    async fn submit_job(&self, node: &JobNode) -> Result<JobId, BackendError> {
        let mut state = lock(&self.state);

        if state.rejected_definitions.contains(&node.definition) {
            return Err(BackendError::rejected(
                400,
                format!("job definition '{}' rejected", node.definition),
            ));
        }

        // Mirror the real backend: forward references are refused
        if let Some(unknown) = node
            .depends_on
            .iter()
            .find(|dep| !state.known_ids.contains(*dep))
        {
            return Err(BackendError::rejected(
                400,
                format!("dependency {} does not exist", unknown),
            ));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        state.record(RecordedSubmission {
            job_id: job_id.clone(),
            node: node.clone(),
        });

        Ok(job_id)
    }
}

// =============================================================================
// Artifact Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    objects: HashMap<(String, String), serde_json::Value>,
    failing_probes: bool,
    failing_writes: bool,
    probes: usize,
}

/// Artifact store backed by a map
///
/// Cloning shares the stored objects.
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object
    pub fn with_object(self, bucket: &str, key: &ArtifactKey) -> Self {
        lock(&self.state).objects.insert(
            (bucket.to_string(), key.to_string()),
            serde_json::Value::Null,
        );
        self
    }

    /// Make every existence probe fail
    pub fn failing_probes(self) -> Self {
        lock(&self.state).failing_probes = true;
        self
    }

    /// Make every write fail
    pub fn failing_writes(self) -> Self {
        lock(&self.state).failing_writes = true;
        self
    }

    /// Number of existence probes served so far
    pub fn probe_count(&self) -> usize {
        lock(&self.state).probes
    }

    /// Read back a stored document
    pub fn get_json(&self, bucket: &str, key: &ArtifactKey) -> Option<serde_json::Value> {
        lock(&self.state)
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn head_object(
        &self,
        bucket: &str,
        key: &ArtifactKey,
    ) -> Result<ObjectStatus, BackendError> {
        let mut state = lock(&self.state);
        state.probes += 1;

        if state.failing_probes {
            return Err(BackendError::Unavailable(format!(
                "probe for {}/{} timed out",
                bucket, key
            )));
        }

        if state
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
        {
            Ok(ObjectStatus::Present)
        } else {
            Ok(ObjectStatus::Missing)
        }
    }

    async fn put_json(
        &self,
        bucket: &str,
        key: &ArtifactKey,
        document: &serde_json::Value,
    ) -> Result<(), BackendError> {
        let mut state = lock(&self.state);

        if state.failing_writes {
            return Err(BackendError::rejected(
                403,
                format!("write to {}/{} denied", bucket, key),
            ));
        }

        state
            .objects
            .insert((bucket.to_string(), key.to_string()), document.clone());
        Ok(())
    }
}
