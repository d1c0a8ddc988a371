//! Error taxonomy shared by the coordinator and the worker executors.
//!
//! Per-worker communication failures never surface here directly: the
//! coordinator recovers them locally by evicting the worker. Only the
//! variants below can end a job.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrackError {
    /// Malformed job request or missing fields. Rejected before dispatch.
    #[error("Invalid request data: {0}")]
    Validation(String),

    /// No stored digest exists for the requested username.
    #[error("Hash for user login '{0}' not found")]
    UnknownUser(String),

    /// The registered pool is empty, or every worker failed mid-job.
    #[error("No calculating servers available")]
    NoWorkersAvailable,

    /// No dictionary corpus file could be found in the storage location.
    #[error("Dictionary corpus unavailable: {0}")]
    CorpusMissing(String),

    /// A fault raised by a worker-side executor.
    #[error("Worker fault: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrackError>;
