//! Dictionary Executor
//!
//! Streams an assigned line range of the current corpus and checks each line
//! against the stored digest. The search is bounded by a wall-clock budget
//! that does not depend on the chunk size: when it runs out, the untested
//! remainder of the range is reported as "no match within budget".

use super::credentials::{CredentialStore, digest};
use crate::error::{CrackError, Result};
use crate::rpc::protocol::DictionaryRequest;
use crate::storage::DictionaryStorage;

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryOutcome {
    pub password: Option<String>,
    pub lines_tested: u64,
    pub budget_exhausted: bool,
    pub calculation: Duration,
}

pub fn run_dictionary(
    request: &DictionaryRequest,
    storage: &DictionaryStorage,
    credentials: &CredentialStore,
    budget: Duration,
) -> Result<DictionaryOutcome> {
    if request.username.trim().is_empty() {
        return Err(CrackError::Validation("username is required".into()));
    }
    if request.start_line == 0 || request.end_line < request.start_line {
        return Err(CrackError::Validation(format!(
            "invalid chunk {}-{}",
            request.start_line, request.end_line
        )));
    }
    if !credentials.contains(&request.username) {
        return Err(CrackError::UnknownUser(request.username.clone()));
    }

    let started = Instant::now();
    let mut tested = 0u64;

    for line in storage.open_range(request.start_line, request.end_line)? {
        if started.elapsed() >= budget {
            tracing::warn!(
                "Budget of {:?} exhausted after {} lines of chunk {}-{}",
                budget,
                tested,
                request.start_line,
                request.end_line
            );
            return Ok(DictionaryOutcome {
                password: None,
                lines_tested: tested,
                budget_exhausted: true,
                calculation: started.elapsed(),
            });
        }

        let (line_number, candidate) = line?;
        tested += 1;

        if credentials.check_digest(&request.username, &digest(&candidate)) {
            tracing::info!("Password found at line {}", line_number);
            return Ok(DictionaryOutcome {
                password: Some(String::from_utf8_lossy(&candidate).into_owned()),
                lines_tested: tested,
                budget_exhausted: false,
                calculation: started.elapsed(),
            });
        }
    }

    tracing::info!(
        "Chunk {}-{} exhausted without a match ({} lines)",
        request.start_line,
        request.end_line,
        tested
    );
    Ok(DictionaryOutcome {
        password: None,
        lines_tested: tested,
        budget_exhausted: false,
        calculation: started.elapsed(),
    })
}
