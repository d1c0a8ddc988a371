use super::response::{JobClock, build_report, error_report, error_status};
use super::types::*;
use crate::config::CentralConfig;
use crate::coordinator::coordinator::TaskCoordinator;
use crate::coordinator::types::JobOutcome;
use crate::coordinator::work::WorkSource;
use crate::error::{CrackError, Result};
use crate::metrics::MetricsRecorder;
use crate::pool::service::WorkerPool;
use crate::rpc::client::WorkerRpc;
use crate::storage::DictionaryStorage;
use crate::worker::credentials::CredentialStore;

use axum::http::StatusCode;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Runs cracking jobs on the central node.
///
/// Jobs are serialized: the found latch and the pool snapshot belong to one
/// job at a time.
pub struct CrackingService {
    pub(super) pool: Arc<WorkerPool>,
    pub(super) rpc: Arc<dyn WorkerRpc>,
    pub(super) config: CentralConfig,
    pub(super) storage: DictionaryStorage,
    /// Optional pre-dispatch username check.
    credentials: Option<Arc<CredentialStore>>,
    metrics: Option<Arc<MetricsRecorder>>,
    job_lock: Mutex<()>,
}

impl CrackingService {
    pub fn new(
        pool: Arc<WorkerPool>,
        rpc: Arc<dyn WorkerRpc>,
        config: CentralConfig,
        credentials: Option<Arc<CredentialStore>>,
    ) -> Arc<Self> {
        let storage = DictionaryStorage::new(config.dictionary_dir.clone());
        let metrics = config
            .metrics_dir
            .clone()
            .map(|dir| Arc::new(MetricsRecorder::new(dir)));
        Arc::new(Self {
            pool,
            rpc,
            config,
            storage,
            credentials,
            metrics,
            job_lock: Mutex::new(()),
        })
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn rpc(&self) -> &Arc<dyn WorkerRpc> {
        &self.rpc
    }

    pub(super) fn new_job_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub(super) fn validate_username(&self, username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(CrackError::Validation("username is required".into()));
        }
        if let Some(credentials) = &self.credentials {
            if credentials.get_digest(username).is_none() {
                return Err(CrackError::UnknownUser(username.to_string()));
            }
        }
        Ok(())
    }

    /// Waits until no other job runs.
    pub(super) async fn lock_jobs(&self) -> MutexGuard<'_, ()> {
        self.job_lock.lock().await
    }

    /// Turns the result of a job into a report, recording metrics on the way.
    pub(super) fn conclude(
        &self,
        job_id: &str,
        kind: JobKind,
        result: Result<JobOutcome>,
        clock: &JobClock,
    ) -> (StatusCode, CrackingReport) {
        match result {
            Ok(outcome) => {
                let report = build_report(job_id, kind, &outcome, clock);
                if let Some(metrics) = &self.metrics {
                    let metrics = metrics.clone();
                    let job_id = job_id.to_string();
                    let granularity = self.config.granularity;
                    let results = outcome.results;
                    // File appends stay off the request path
                    tokio::task::spawn_blocking(move || {
                        metrics.record_job(&job_id, granularity, &results)
                    });
                }
                match &report {
                    CrackingReport::Found { worker, .. } => {
                        tracing::info!("[{}] Finished: password found by {}", job_id, worker)
                    }
                    _ => tracing::info!(
                        "[{}] Finished: password not found after {} rounds",
                        job_id,
                        outcome.rounds
                    ),
                }
                (StatusCode::OK, report)
            }
            Err(e) => {
                tracing::error!("[{}] {} job failed: {}", job_id, kind.as_str(), e);
                (error_status(&e), error_report(&e, Some(clock)))
            }
        }
    }

    /// Runs one job over the pool.
    pub(super) async fn drive<W: WorkSource>(&self, job_id: &str, work: &mut W) -> Result<JobOutcome> {
        TaskCoordinator::new(
            job_id,
            self.pool.clone(),
            self.rpc.clone(),
            self.config.coordinator.clone(),
        )
        .run(work)
        .await
    }
}
