//! Task Coordinator
//!
//! Drives one job over the worker pool. Each round:
//! 1. Re-snapshots the pool (minus workers evicted during this job).
//! 2. Gates every idle worker: latch still empty, not failed, not busy, no
//!    unresolved dispatch, and a bounded health probe. Probes run
//!    concurrently. A worker failing its probe is evicted.
//! 3. Dispatches one unit to each worker that passed the gate.
//! 4. Waits for whichever outstanding dispatch resolves first.
//!
//! A match sets the latch, cancels the job token and detaches every other
//! dispatch. Detached calls still run to completion on the worker side;
//! their results are discarded.

use super::types::*;
use super::work::{WorkKind, WorkSource, WorkUnit};
use crate::error::{CrackError, Result};
use crate::pool::service::WorkerPool;
use crate::pool::types::{WorkerId, WorkerState};
use crate::rpc::client::{RequestRejected, WorkerRpc};
use crate::rpc::protocol::WorkerReply;

use futures::future::{BoxFuture, join_all};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

type Resolved = (WorkerId, WorkUnit, std::result::Result<DispatchReport, JoinError>);

pub struct TaskCoordinator {
    job_id: String,
    pool: Arc<WorkerPool>,
    rpc: Arc<dyn WorkerRpc>,
    settings: CoordinatorSettings,

    /// Job snapshot of the pool, refreshed every round.
    states: Vec<WorkerState>,
    /// Workers with an unresolved dispatch, and when it started.
    dispatched: HashMap<WorkerId, Instant>,
    /// Workers that failed during the current round.
    failed: HashSet<WorkerId>,
    /// Workers evicted at any point during this job.
    evicted: HashSet<WorkerId>,

    in_flight: FuturesUnordered<BoxFuture<'static, Resolved>>,
    cancel: CancellationToken,
    latch: FoundLatch,
    results: Vec<CrackingResult>,
    /// Set when a worker rejects the request itself; ends the job.
    abort: Option<CrackError>,

    rounds: usize,
    dispatch_setup: Duration,
    processing: Duration,
}

impl TaskCoordinator {
    pub fn new(
        job_id: impl Into<String>,
        pool: Arc<WorkerPool>,
        rpc: Arc<dyn WorkerRpc>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            pool,
            rpc,
            settings,
            states: Vec::new(),
            dispatched: HashMap::new(),
            failed: HashSet::new(),
            evicted: HashSet::new(),
            in_flight: FuturesUnordered::new(),
            cancel: CancellationToken::new(),
            latch: FoundLatch::new(),
            results: Vec::new(),
            abort: None,
            rounds: 0,
            dispatch_setup: Duration::ZERO,
            processing: Duration::ZERO,
        }
    }

    /// Runs rounds until the latch is set or `work` is exhausted and every
    /// dispatch has resolved.
    ///
    /// Fails with `NoWorkersAvailable` when work remains but no worker does.
    pub async fn run<W: WorkSource>(mut self, work: &mut W) -> Result<JobOutcome> {
        self.pool.validate_availability()?;
        tracing::info!(
            "[{}] Starting job with {} calculating servers",
            self.job_id,
            self.pool.len()
        );

        loop {
            if let Some(error) = self.abort.take() {
                return Err(error);
            }
            if self.latch.is_set() {
                break;
            }
            if !work.has_remaining() && self.in_flight.is_empty() {
                tracing::info!("[{}] All work units resolved without a match", self.job_id);
                break;
            }

            self.reset_state();

            let idle = self.pool.get_available(&self.states);
            if idle.is_empty() && self.in_flight.is_empty() {
                if self.states.is_empty() {
                    tracing::error!("[{}] No calculating servers left", self.job_id);
                    return Err(CrackError::NoWorkersAvailable);
                }
                tracing::warn!(
                    "[{}] No available servers, waiting {:?}",
                    self.job_id,
                    self.settings.backoff
                );
                tokio::time::sleep(self.settings.backoff).await;
                continue;
            }

            self.process_round(work).await;
        }

        Ok(self.finish())
    }

    /// Clears per-round tracking and re-snapshots the pool.
    ///
    /// The latch is job scoped: no round starts once it is set.
    fn reset_state(&mut self) {
        self.failed.clear();
        self.states = self
            .pool
            .initialize_states()
            .into_iter()
            .filter(|state| !self.evicted.contains(&state.id))
            .map(|mut state| {
                state.busy = self.dispatched.contains_key(&state.id);
                state
            })
            .collect();
    }

    fn can_process(&self, state: &WorkerState) -> bool {
        !self.latch.is_set()
            && !self.failed.contains(&state.id)
            && !self.evicted.contains(&state.id)
            && !state.busy
            && !self.dispatched.contains_key(&state.id)
    }

    async fn process_round<W: WorkSource>(&mut self, work: &mut W) {
        self.rounds += 1;
        let setup_started = Instant::now();

        if work.has_remaining() {
            let candidates: Vec<WorkerId> = self
                .pool
                .get_available(&self.states)
                .into_iter()
                .filter(|state| self.can_process(state))
                .map(|state| state.id)
                .collect();

            let probes =
                probe_all(self.rpc.clone(), self.settings.health_timeout, &candidates).await;

            for (worker, probe) in candidates.into_iter().zip(probes) {
                if let Err(reason) = probe {
                    self.evict(&worker, &format!("health check failed: {}", reason));
                    continue;
                }
                if self.latch.is_set() {
                    break;
                }
                let Some(unit) = work.next_unit() else {
                    break;
                };
                self.dispatch(worker, unit);
            }
        }
        self.dispatch_setup += setup_started.elapsed();

        if self.in_flight.is_empty() {
            return;
        }

        let wait_started = Instant::now();
        if let Some((worker, unit, joined)) = self.in_flight.next().await {
            self.resolve(worker, unit, joined, work);
        }
        self.processing += wait_started.elapsed();
    }

    fn dispatch(&mut self, worker: WorkerId, unit: WorkUnit) {
        tracing::info!("[{}] Sending {} to {}", self.job_id, unit, worker);

        for state in self.states.iter_mut().filter(|state| state.id == worker) {
            state.busy = true;
        }
        self.dispatched.insert(worker.clone(), Instant::now());

        let rpc = self.rpc.clone();
        let token = self.cancel.clone();
        let target = worker.clone();
        let kind = unit.kind.clone();
        let timeout = self.settings.dispatch_timeout;
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let call = async {
                match &kind {
                    WorkKind::BruteForce(request) => {
                        rpc.assign_brute_force(&target, request).await
                    }
                    WorkKind::Dictionary(request) => {
                        rpc.assign_dictionary_chunk(&target, request).await
                    }
                }
            };
            let reply = match tokio::time::timeout(timeout, call).await {
                Ok(reply) => reply,
                Err(_) => Err(anyhow::anyhow!("no reply within {:?}", timeout)),
            };

            let outcome = match reply {
                Ok(WorkerReply::Found {
                    password,
                    calculation_ms,
                    ..
                }) => DispatchOutcome::Matched {
                    password,
                    worker_elapsed_ms: calculation_ms,
                },
                Ok(WorkerReply::NotFound {
                    calculation_ms,
                    budget_exhausted,
                    ..
                }) => DispatchOutcome::NoMatch {
                    worker_elapsed_ms: calculation_ms,
                    budget_exhausted,
                },
                Ok(WorkerReply::Error { message, .. }) => DispatchOutcome::Failed { reason: message },
                Err(e) => match e.downcast_ref::<RequestRejected>() {
                    Some(rejected) => DispatchOutcome::Rejected {
                        status: rejected.status,
                        reason: rejected.message.clone(),
                    },
                    None => DispatchOutcome::Failed {
                        reason: e.to_string(),
                    },
                },
            };

            let discarded = token.is_cancelled();
            if discarded {
                tracing::debug!("Discarding late result from {}: {:?}", target, outcome);
            }
            DispatchReport {
                outcome,
                discarded,
                round_trip: started.elapsed(),
            }
        });

        self.in_flight
            .push(Box::pin(async move { (worker, unit, handle.await) }));
    }

    fn resolve<W: WorkSource>(
        &mut self,
        worker: WorkerId,
        unit: WorkUnit,
        joined: std::result::Result<DispatchReport, JoinError>,
        work: &mut W,
    ) {
        if let Some(since) = self.dispatched.remove(&worker) {
            tracing::debug!(
                "[{}] {} resolved after {:?}",
                self.job_id,
                worker,
                since.elapsed()
            );
        }
        for state in self.states.iter_mut().filter(|state| state.id == worker) {
            state.busy = false;
        }

        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("[{}] Dispatch task for {} died: {}", self.job_id, worker, e);
                self.evict(&worker, "dispatch task aborted");
                work.requeue(unit);
                return;
            }
        };

        if report.discarded || self.latch.is_set() {
            tracing::debug!("[{}] Ignoring result from {}", self.job_id, worker);
            return;
        }

        match report.outcome {
            DispatchOutcome::Matched {
                password,
                worker_elapsed_ms,
            } => {
                self.results.push(CrackingResult {
                    elapsed_ms: Some(worker_elapsed_ms),
                    success: true,
                    worker_id: worker.clone(),
                    password: Some(password.clone()),
                    unit: unit.kind.clone(),
                    round_trip_ms: millis(report.round_trip),
                });

                let found = FoundPassword {
                    value: password,
                    worker_id: worker.clone(),
                    worker_elapsed_ms,
                    total_elapsed_ms: millis(unit.created_at.elapsed()),
                };
                if self.latch.try_set(found) {
                    tracing::info!(
                        "[{}] Password found by {} in {} ({:?} round trip)",
                        self.job_id,
                        worker,
                        unit,
                        report.round_trip
                    );
                    self.cancel_outstanding();
                }
            }
            DispatchOutcome::NoMatch {
                worker_elapsed_ms,
                budget_exhausted,
            } => {
                if budget_exhausted {
                    tracing::warn!(
                        "[{}] {} ran out of time on {}, moving on",
                        self.job_id,
                        worker,
                        unit
                    );
                } else {
                    tracing::info!(
                        "[{}] Server {} returned no match for {} ({} ms)",
                        self.job_id,
                        worker,
                        unit,
                        worker_elapsed_ms
                    );
                }
                self.results.push(CrackingResult {
                    elapsed_ms: Some(worker_elapsed_ms),
                    success: false,
                    worker_id: worker,
                    password: None,
                    unit: unit.kind.clone(),
                    round_trip_ms: millis(report.round_trip),
                });
            }
            DispatchOutcome::Failed { reason } => {
                self.evict(&worker, &reason);
                self.results.push(CrackingResult {
                    elapsed_ms: None,
                    success: false,
                    worker_id: worker,
                    password: None,
                    unit: unit.kind.clone(),
                    round_trip_ms: millis(report.round_trip),
                });
                tracing::info!("[{}] Re-queueing {}", self.job_id, unit);
                work.requeue(unit);
            }
            DispatchOutcome::Rejected { status, reason } => {
                tracing::error!(
                    "[{}] Server {} rejected {}: {}",
                    self.job_id,
                    worker,
                    unit,
                    reason
                );
                self.abort = Some(if status == 404 {
                    CrackError::UnknownUser(unit.kind.username().to_string())
                } else {
                    CrackError::Validation(reason)
                });
                self.cancel_outstanding();
            }
        }
    }

    fn evict(&mut self, worker: &WorkerId, reason: &str) {
        tracing::warn!(
            "[{}] Marking server {} as failed: {}",
            self.job_id,
            worker,
            reason
        );
        self.failed.insert(worker.clone());
        self.evicted.insert(worker.clone());
        self.states.retain(|state| &state.id != worker);
        self.pool.mark_failed(worker);
    }

    fn cancel_outstanding(&mut self) {
        self.cancel.cancel();

        let detached = std::mem::take(&mut self.in_flight);
        if !detached.is_empty() {
            tracing::info!(
                "[{}] Cancelling {} outstanding dispatches",
                self.job_id,
                detached.len()
            );
        }
        // Dropping the join handles detaches the tasks without aborting them
        drop(detached);

        self.dispatched.clear();
        for state in &mut self.states {
            state.busy = false;
        }
    }

    fn finish(self) -> JobOutcome {
        let mut evicted: Vec<WorkerId> = self.evicted.into_iter().collect();
        evicted.sort();

        JobOutcome {
            found: self.latch.into_inner(),
            results: self.results,
            evicted,
            rounds: self.rounds,
            dispatch_setup: self.dispatch_setup,
            processing: self.processing,
        }
    }
}

/// Probes every candidate concurrently, each bounded by `timeout`.
async fn probe_all(
    rpc: Arc<dyn WorkerRpc>,
    timeout: Duration,
    candidates: &[WorkerId],
) -> Vec<std::result::Result<(), String>> {
    join_all(candidates.iter().map(|worker| {
        let rpc = rpc.clone();
        async move {
            match tokio::time::timeout(timeout, rpc.health_check(worker)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("no response within {:?}", timeout)),
            }
        }
    }))
    .await
}
