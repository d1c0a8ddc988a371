use super::response::{JobClock, error_report, error_status};
use super::service::CrackingService;
use super::types::*;
use crate::coordinator::types::JobOutcome;
use crate::coordinator::work::PortionQueue;
use crate::error::{CrackError, Result};
use crate::partition::alphabet::{ALPHABET, partition_alphabet};
use crate::rpc::protocol::MAX_PASSWORD_LENGTH;
use crate::worker::enumerate::KeyspaceMode;

use axum::http::StatusCode;
use std::time::Instant;

impl CrackingService {
    /// Brute-force job: one alphabet portion per registered worker.
    pub async fn crack_brute_force(
        &self,
        request: BruteForceJobRequest,
        received: Instant,
    ) -> (StatusCode, CrackingReport) {
        let job_id = Self::new_job_id();
        let mut clock = JobClock::start(received);

        if let Err(e) = self.validate_brute_force(&request) {
            tracing::warn!("[{}] Rejected brute force request: {}", job_id, e);
            return (error_status(&e), error_report(&e, Some(&clock)));
        }
        clock.parsed();

        let _guard = self.lock_jobs().await;
        let result = self.brute_force_job(&job_id, &request, &mut clock).await;
        self.conclude(&job_id, JobKind::BruteForce, result, &clock)
    }

    fn validate_brute_force(&self, request: &BruteForceJobRequest) -> Result<()> {
        if request.password_length == 0 || request.password_length > MAX_PASSWORD_LENGTH {
            return Err(CrackError::Validation(format!(
                "passwordLength must be between 1 and {}",
                MAX_PASSWORD_LENGTH
            )));
        }
        self.validate_username(&request.username)
    }

    async fn brute_force_job(
        &self,
        job_id: &str,
        request: &BruteForceJobRequest,
        clock: &mut JobClock,
    ) -> Result<JobOutcome> {
        self.pool.validate_availability()?;

        let distribution_started = Instant::now();
        let portions = partition_alphabet(ALPHABET, self.pool.len())?;
        let alphabet = match self.config.keyspace_mode {
            KeyspaceMode::LeadingCharacter => Some(ALPHABET),
            KeyspaceMode::PortionOnly => None,
        };
        let mut work = PortionQueue::new(
            &request.username,
            request.password_length,
            portions,
            alphabet,
        );
        clock.distributed(distribution_started);

        tracing::info!(
            "[{}] Cracking user '{}' (length {}) with {} portions, {:?} keyspace",
            job_id,
            request.username,
            request.password_length,
            work.len(),
            self.config.keyspace_mode
        );

        self.drive(job_id, &mut work).await
    }
}
