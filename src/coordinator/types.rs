use super::work::WorkKind;
use crate::pool::types::WorkerId;

use std::sync::OnceLock;
use std::time::Duration;

/// Timeouts and delays of the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Upper bound on one pre-dispatch health probe.
    pub health_timeout: Duration,
    /// Upper bound on one unit of work, worker round trip included.
    pub dispatch_timeout: Duration,
    /// Pause before retrying when no worker is available.
    pub backoff: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            health_timeout: Duration::from_secs(5),
            dispatch_timeout: Duration::from_secs(2 * 60 * 60),
            backoff: Duration::from_millis(1000),
        }
    }
}

/// How one dispatched unit of work resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Matched {
        password: String,
        worker_elapsed_ms: u64,
    },
    NoMatch {
        worker_elapsed_ms: u64,
        /// The worker stopped on its time budget, not on the end of the unit.
        budget_exhausted: bool,
    },
    /// Transport error, non-success status or an `Error` reply.
    Failed { reason: String },
    /// The worker refused the request as invalid (400) or the user as
    /// unknown (404).
    Rejected { status: u16, reason: String },
}

/// What a dispatch task hands back to the coordinator.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    /// The job was cancelled before this response arrived.
    pub discarded: bool,
    pub round_trip: Duration,
}

/// One resolved unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackingResult {
    /// Compute time the worker reported; `None` when the dispatch failed.
    pub elapsed_ms: Option<u64>,
    pub success: bool,
    pub worker_id: WorkerId,
    pub password: Option<String>,
    pub unit: WorkKind,
    /// Dispatch to response, as seen by the coordinator.
    pub round_trip_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPassword {
    pub value: String,
    pub worker_id: WorkerId,
    pub worker_elapsed_ms: u64,
    /// Measured from the creation of the unit that matched.
    pub total_elapsed_ms: u64,
}

/// Set-once "password found" state of a job.
#[derive(Debug, Default)]
pub struct FoundLatch {
    slot: OnceLock<FoundPassword>,
}

impl FoundLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `found` if the latch is still empty. Returns `true` for the
    /// single call that wins.
    pub fn try_set(&self, found: FoundPassword) -> bool {
        self.slot.set(found).is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<&FoundPassword> {
        self.slot.get()
    }

    pub fn into_inner(self) -> Option<FoundPassword> {
        self.slot.into_inner()
    }
}

/// Everything the response aggregator needs from a finished job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub found: Option<FoundPassword>,
    pub results: Vec<CrackingResult>,
    pub evicted: Vec<WorkerId>,
    pub rounds: usize,
    /// Time spent probing workers and starting dispatches.
    pub dispatch_setup: Duration,
    /// Time spent waiting for dispatches to resolve.
    pub processing: Duration,
}

pub(crate) fn millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
