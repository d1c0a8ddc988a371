//! Brute-Force Executor
//!
//! Walks the keyspace assigned to this worker in index order and hashes each
//! candidate, stopping at the first digest match.

use super::credentials::{CredentialStore, digest};
use super::enumerate::Keyspace;
use crate::error::{CrackError, Result};
use crate::rpc::protocol::{BruteForceRequest, MAX_PASSWORD_LENGTH};

use std::time::{Duration, Instant};

/// Candidates between two progress log lines.
pub const PROGRESS_INTERVAL: u128 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BruteForceOutcome {
    pub password: Option<String>,
    pub candidates_tested: u128,
    pub calculation: Duration,
}

/// Tests every candidate of `keyspace` against `target_digest`.
pub fn search_keyspace(keyspace: &Keyspace, target_digest: &str) -> BruteForceOutcome {
    let started = Instant::now();
    let target = target_digest.to_lowercase();
    tracing::info!(
        "Starting brute force over {} candidates of length {}",
        keyspace
            .size()
            .map(|size| size.to_string())
            .unwrap_or_else(|| "more than 2^128".to_string()),
        keyspace.length()
    );

    let mut tested = 0u128;
    for candidate in keyspace.candidates() {
        tested += 1;

        if digest(&candidate) == target {
            tracing::info!(
                "Match found after {} combinations in {:?}",
                tested,
                started.elapsed()
            );
            return BruteForceOutcome {
                password: Some(candidate),
                candidates_tested: tested,
                calculation: started.elapsed(),
            };
        }

        if tested % PROGRESS_INTERVAL == 0 {
            tracing::debug!("Checked {} combinations in {:?}", tested, started.elapsed());
        }
    }

    tracing::info!(
        "No match found after checking {} combinations in {:?}",
        tested,
        started.elapsed()
    );
    BruteForceOutcome {
        password: None,
        candidates_tested: tested,
        calculation: started.elapsed(),
    }
}

/// Validates `request`, looks up the target digest once, then searches.
pub fn run_brute_force(
    request: &BruteForceRequest,
    credentials: &CredentialStore,
) -> Result<BruteForceOutcome> {
    validate(request)?;

    let target = credentials
        .get_digest(&request.username)
        .ok_or_else(|| CrackError::UnknownUser(request.username.clone()))?;

    let keyspace = Keyspace::for_portion(
        &request.portion,
        request.alphabet.as_deref(),
        request.password_length,
    );
    Ok(search_keyspace(&keyspace, &target))
}

fn validate(request: &BruteForceRequest) -> Result<()> {
    if request.username.trim().is_empty() {
        return Err(CrackError::Validation("username is required".into()));
    }
    if request.portion.is_empty() {
        return Err(CrackError::Validation("chars must not be empty".into()));
    }
    if request.password_length == 0 || request.password_length > MAX_PASSWORD_LENGTH {
        return Err(CrackError::Validation(format!(
            "passwordLength must be between 1 and {}",
            MAX_PASSWORD_LENGTH
        )));
    }
    if request.alphabet.as_deref().is_some_and(str::is_empty) {
        return Err(CrackError::Validation("alphabet must not be empty".into()));
    }
    Ok(())
}
