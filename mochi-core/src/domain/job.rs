//! Job domain types
//!
//! A [`JobNode`] is one unit of work handed to the batch backend. Once
//! submitted it is never changed; the backend answers with an opaque
//! [`JobId`] that later nodes list as a dependency.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Tag correlating every job of one launch
pub const TAG_SUBMISSION_GROUP: &str = "SubmissionGroupTag";
/// Tag naming the kind of work a job does
pub const TAG_TASK_TYPE: &str = "TaskType";
pub const TAG_TICKER: &str = "Ticker";
pub const TAG_SYMBOL: &str = "Symbol";
pub const TAG_SCENARIO: &str = "Scenario";
pub const TAG_TRADE_TYPE: &str = "TradeType";

/// Opaque identifier assigned by the batch backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an optional submission
///
/// Serialises as the job id, or as the literal `"skipped"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    Submitted(JobId),
    Skipped,
}

impl JobRef {
    pub const SKIPPED: &'static str = "skipped";

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            JobRef::Submitted(id) => Some(id),
            JobRef::Skipped => None,
        }
    }

    /// Dependency list for a job that waits on this one
    pub fn as_dependencies(&self) -> Vec<JobId> {
        self.job_id().cloned().into_iter().collect()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, JobRef::Skipped)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobRef::Submitted(id) => id.as_str(),
            JobRef::Skipped => Self::SKIPPED,
        }
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == Self::SKIPPED {
            Ok(JobRef::Skipped)
        } else {
            Ok(JobRef::Submitted(JobId(raw)))
        }
    }
}

/// A job ready for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobNode {
    /// Sanitized job name
    pub name: String,
    pub queue: String,
    /// Job definition (container image and default resources)
    pub definition: String,
    pub command: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub depends_on: Vec<JobId>,
    pub tags: BTreeMap<String, String>,
}

impl JobNode {
    /// Start a node; the name is sanitized here so no unsanitized name can
    /// reach the backend.
    pub fn new(name: &str, queue: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: sanitize_job_name(name),
            queue: queue.into(),
            definition: definition.into(),
            command: Vec::new(),
            environment: BTreeMap::new(),
            depends_on: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.command.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    pub fn depends_on(mut self, upstream: Vec<JobId>) -> Self {
        self.depends_on = upstream;
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Replace every character the backend does not accept in job names
///
/// Allowed: ASCII letters, digits, `-` and `_`. Anything else becomes `_`.
pub fn sanitize_job_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
