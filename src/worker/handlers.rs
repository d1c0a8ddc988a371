use super::brute_force::run_brute_force;
use super::credentials::CredentialStore;
use super::dictionary::run_dictionary;
use crate::error::CrackError;
use crate::rpc::protocol::*;
use crate::storage::DictionaryStorage;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, http::StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared state of a worker node.
#[derive(Debug)]
pub struct WorkerContext {
    pub credentials: Arc<CredentialStore>,
    pub storage: DictionaryStorage,
    pub dictionary_budget: Duration,
}

pub fn router(context: Arc<WorkerContext>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_BRUTE_FORCE, post(handle_brute_force))
        .route(ENDPOINT_DICTIONARY, post(handle_dictionary))
        .layer(Extension(context))
}

pub async fn handle_health() -> &'static str {
    "Connection successful"
}

pub async fn handle_brute_force(
    Extension(context): Extension<Arc<WorkerContext>>,
    payload: Result<Json<BruteForceRequest>, JsonRejection>,
) -> (StatusCode, Json<WorkerReply>) {
    let started = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection, started),
    };

    tracing::info!(
        "Brute force request for user '{}' (length {}, portion '{}')",
        request.username,
        request.password_length,
        request.portion
    );

    let credentials = context.credentials.clone();
    let joined =
        tokio::task::spawn_blocking(move || run_brute_force(&request, &credentials)).await;

    match joined {
        Ok(Ok(outcome)) => {
            let elapsed_ms = millis(started.elapsed());
            let calculation_ms = millis(outcome.calculation);
            let reply = match outcome.password {
                Some(password) => WorkerReply::Found {
                    password,
                    elapsed_ms,
                    calculation_ms,
                },
                None => WorkerReply::NotFound {
                    elapsed_ms,
                    calculation_ms,
                    budget_exhausted: false,
                },
            };
            (StatusCode::OK, Json(reply))
        }
        Ok(Err(e)) => failure(e, started),
        Err(e) => failure(CrackError::Worker(e.to_string()), started),
    }
}

pub async fn handle_dictionary(
    Extension(context): Extension<Arc<WorkerContext>>,
    payload: Result<Json<DictionaryRequest>, JsonRejection>,
) -> (StatusCode, Json<WorkerReply>) {
    let started = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection, started),
    };

    tracing::info!(
        "Dictionary request for user '{}' (lines {}-{})",
        request.username,
        request.start_line,
        request.end_line
    );

    let worker = context.clone();
    let joined = tokio::task::spawn_blocking(move || {
        run_dictionary(
            &request,
            &worker.storage,
            &worker.credentials,
            worker.dictionary_budget,
        )
    })
    .await;

    match joined {
        Ok(Ok(outcome)) => {
            let elapsed_ms = millis(started.elapsed());
            let calculation_ms = millis(outcome.calculation);
            let reply = match outcome.password {
                Some(password) => WorkerReply::Found {
                    password,
                    elapsed_ms,
                    calculation_ms,
                },
                None => WorkerReply::NotFound {
                    elapsed_ms,
                    calculation_ms,
                    budget_exhausted: outcome.budget_exhausted,
                },
            };
            (StatusCode::OK, Json(reply))
        }
        Ok(Err(e)) => failure(e, started),
        Err(e) => failure(CrackError::Worker(e.to_string()), started),
    }
}

fn bad_request(rejection: JsonRejection, started: Instant) -> (StatusCode, Json<WorkerReply>) {
    failure(CrackError::Validation(rejection.body_text()), started)
}

fn failure(error: CrackError, started: Instant) -> (StatusCode, Json<WorkerReply>) {
    let status = match &error {
        CrackError::Validation(_) => StatusCode::BAD_REQUEST,
        CrackError::UnknownUser(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Error during processing: {}", error);
    } else {
        tracing::warn!("Rejected request: {}", error);
    }

    (
        status,
        Json(WorkerReply::error(
            error.to_string(),
            millis(started.elapsed()),
        )),
    )
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
