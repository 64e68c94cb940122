use chrono::{DateTime, Utc};
use thiserror::Error;

/// Any failed remote call: network, timeout, HTTP status, auth, GraphQL
/// errors or an unexpected payload. Callers act the same way on all of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct RemoteError {
    pub operation: &'static str,
    pub message: String,
}

impl RemoteError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Relabels a transport-level error with the API operation that hit it.
    pub fn during(mut self, operation: &'static str) -> Self {
        self.operation = operation;
        self
    }
}

/// The single active tracking entry, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTracking {
    pub start: DateTime<Utc>,
    pub task_id: String,
}

impl CurrentTracking {
    pub fn new(start: DateTime<Utc>, task_id: impl Into<String>) -> Self {
        Self {
            start,
            task_id: task_id.into(),
        }
    }

    pub fn is_for(&self, task_id: &str) -> bool {
        !task_id.is_empty() && self.task_id == task_id
    }

    /// Whole seconds since the entry started; a start in the future counts as zero.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        now.signed_duration_since(self.start).num_seconds().max(0) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedTracking {
    pub task_id: String,
}
