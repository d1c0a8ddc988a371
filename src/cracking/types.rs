use serde::{Deserialize, Serialize};

/// Body of `POST /api/cracking/brute-force`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BruteForceJobRequest {
    pub username: String,
    #[serde(alias = "passwordLength")]
    pub password_length: usize,
}

/// Body of `POST /api/cracking/dictionary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryJobRequest {
    pub username: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobKind {
    BruteForce,
    Dictionary,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::BruteForce => "brute-force",
            JobKind::Dictionary => "dictionary",
        }
    }
}

/// Wall-clock time of each job phase, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Request received until the body was validated.
    pub parse_ms: u64,
    /// Partitioning the work (alphabet split or corpus line count).
    pub distribution_ms: u64,
    /// Health probes and dispatch starts, summed over rounds.
    pub dispatch_setup_ms: u64,
    /// Waiting on workers, summed over rounds.
    pub processing_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerTiming {
    pub worker: String,
    pub success: bool,
    /// Compute time the worker reported; absent when the dispatch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Final answer of a cracking job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status")]
pub enum CrackingReport {
    Found {
        job_id: String,
        password: String,
        worker: String,
        worker_time_ms: u64,
        total_time_ms: u64,
        communication_time_ms: u64,
        timing: PhaseTimings,
    },
    NotFound {
        job_id: String,
        message: String,
        total_time_ms: u64,
        /// Mean compute time over workers that reported one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        average_worker_time_ms: Option<f64>,
        communication_time_ms: u64,
        workers: Vec<WorkerTiming>,
        timing: PhaseTimings,
    },
    Error {
        message: String,
        /// `-1` when the job never started.
        elapsed_ms: i64,
    },
}
