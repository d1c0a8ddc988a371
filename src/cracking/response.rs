//! Response Aggregator
//!
//! Shapes a finished job (or a failure) into a `CrackingReport`.

use super::types::*;
use crate::coordinator::types::{JobOutcome, millis};
use crate::error::CrackError;

use axum::http::StatusCode;
use std::time::{Duration, Instant};

/// Phase timer of one job, started when the request arrives.
#[derive(Debug, Clone)]
pub struct JobClock {
    received: Instant,
    parse: Duration,
    distribution: Duration,
}

impl JobClock {
    pub fn start(received: Instant) -> Self {
        Self {
            received,
            parse: Duration::ZERO,
            distribution: Duration::ZERO,
        }
    }

    /// Marks the end of request validation.
    pub fn parsed(&mut self) {
        self.parse = self.received.elapsed();
    }

    /// Adds the time since `since` to the distribution phase.
    pub fn distributed(&mut self, since: Instant) {
        self.distribution += since.elapsed();
    }

    pub fn elapsed(&self) -> Duration {
        self.received.elapsed()
    }

    pub fn timings(&self, outcome: &JobOutcome) -> PhaseTimings {
        PhaseTimings {
            parse_ms: millis(self.parse),
            distribution_ms: millis(self.distribution),
            dispatch_setup_ms: millis(outcome.dispatch_setup),
            processing_ms: millis(outcome.processing),
            total_ms: millis(self.elapsed()),
        }
    }
}

pub fn build_report(
    job_id: &str,
    kind: JobKind,
    outcome: &JobOutcome,
    clock: &JobClock,
) -> CrackingReport {
    let timing = clock.timings(outcome);
    let total_time_ms = timing.total_ms;

    if let Some(found) = &outcome.found {
        return CrackingReport::Found {
            job_id: job_id.to_string(),
            password: found.value.clone(),
            worker: found.worker_id.to_string(),
            worker_time_ms: found.worker_elapsed_ms,
            total_time_ms,
            communication_time_ms: total_time_ms.saturating_sub(found.worker_elapsed_ms),
            timing,
        };
    }

    let reported: Vec<u64> = outcome
        .results
        .iter()
        .filter_map(|result| result.elapsed_ms)
        .collect();
    let average_worker_time_ms = if reported.is_empty() {
        None
    } else {
        Some(reported.iter().sum::<u64>() as f64 / reported.len() as f64)
    };
    let communication_time_ms = match average_worker_time_ms {
        Some(average) => (total_time_ms as f64 - average).max(0.0).round() as u64,
        None => total_time_ms,
    };

    let workers = outcome
        .results
        .iter()
        .map(|result| WorkerTiming {
            worker: result.worker_id.to_string(),
            success: result.success,
            elapsed_ms: result.elapsed_ms,
        })
        .collect();

    let message = match kind {
        JobKind::BruteForce => "Password not found in the searched keyspace",
        JobKind::Dictionary => "Password not found in dictionary",
    };

    CrackingReport::NotFound {
        job_id: job_id.to_string(),
        message: message.to_string(),
        total_time_ms,
        average_worker_time_ms,
        communication_time_ms,
        workers,
        timing,
    }
}

/// Error report. Without a clock the job never started and the elapsed time
/// is the `-1` sentinel.
pub fn error_report(error: &CrackError, clock: Option<&JobClock>) -> CrackingReport {
    CrackingReport::Error {
        message: error.to_string(),
        elapsed_ms: clock
            .map(|clock| i64::try_from(millis(clock.elapsed())).unwrap_or(i64::MAX))
            .unwrap_or(-1),
    }
}

pub fn error_status(error: &CrackError) -> StatusCode {
    match error {
        CrackError::Validation(_) => StatusCode::BAD_REQUEST,
        CrackError::UnknownUser(_) => StatusCode::NOT_FOUND,
        CrackError::NoWorkersAvailable => StatusCode::SERVICE_UNAVAILABLE,
        CrackError::Worker(_) => StatusCode::BAD_GATEWAY,
        CrackError::CorpusMissing(_) | CrackError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
