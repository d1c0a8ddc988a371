use super::response::{JobClock, error_report, error_status};
use super::service::CrackingService;
use super::types::*;
use crate::coordinator::types::JobOutcome;
use crate::coordinator::work::ChunkCursor;
use crate::error::Result;
use crate::partition::chunk::ChunkManager;

use axum::http::StatusCode;
use std::time::Instant;

impl CrackingService {
    /// Dictionary job: the current corpus cut into `granularity`-line chunks.
    pub async fn crack_dictionary(
        &self,
        request: DictionaryJobRequest,
        received: Instant,
    ) -> (StatusCode, CrackingReport) {
        let job_id = Self::new_job_id();
        let mut clock = JobClock::start(received);

        if let Err(e) = self.validate_username(&request.username) {
            tracing::warn!("[{}] Rejected dictionary request: {}", job_id, e);
            return (error_status(&e), error_report(&e, Some(&clock)));
        }
        clock.parsed();

        let _guard = self.lock_jobs().await;
        let result = self.dictionary_job(&job_id, &request, &mut clock).await;
        self.conclude(&job_id, JobKind::Dictionary, result, &clock)
    }

    async fn dictionary_job(
        &self,
        job_id: &str,
        request: &DictionaryJobRequest,
        clock: &mut JobClock,
    ) -> Result<JobOutcome> {
        self.pool.validate_availability()?;

        let distribution_started = Instant::now();
        let manager = ChunkManager::new(self.storage.clone(), self.config.granularity);
        let mut work = ChunkCursor::from_manager(&request.username, &manager)?;
        clock.distributed(distribution_started);

        tracing::info!(
            "[{}] Cracking user '{}' over {} dictionary lines in chunks of {}",
            job_id,
            request.username,
            work.total_lines(),
            manager.granularity()
        );

        self.drive(job_id, &mut work).await
    }
}
