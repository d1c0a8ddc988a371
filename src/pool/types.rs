use serde::{Deserialize, Serialize};
use std::fmt;

/// Network address of a worker node (`host:port`). Doubles as its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }

    /// Base URL for HTTP calls to this worker.
    pub fn base_url(&self) -> String {
        if self.0.starts_with("http://") || self.0.starts_with("https://") {
            self.0.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", self.0)
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job-scoped view of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerState {
    pub id: WorkerId,
    /// True while a unit of work is dispatched to this worker.
    pub busy: bool,
}

impl WorkerState {
    pub fn new(id: WorkerId) -> Self {
        Self { id, busy: false }
    }
}
