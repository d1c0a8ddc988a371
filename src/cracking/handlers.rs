use super::response::error_report;
use super::service::CrackingService;
use super::types::*;
use crate::error::CrackError;
use crate::pool::types::WorkerId;
use crate::rpc::protocol::*;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

pub fn router(service: Arc<CrackingService>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(ENDPOINT_WORKERS, get(handle_list_workers))
        .route(ENDPOINT_CRACK_BRUTE_FORCE, post(handle_crack_brute_force))
        .route(ENDPOINT_CRACK_DICTIONARY, post(handle_crack_dictionary))
        .layer(Extension(service))
}

/// Registration handshake: the worker must answer a health probe first.
pub async fn handle_register(
    Extension(service): Extension<Arc<CrackingService>>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<RegisterResponse>) {
    let pool = service.pool();
    let worker = WorkerId::new(req.address.trim());

    if worker.address().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse {
                registered: false,
                pool_size: pool.len(),
                message: Some("address is required".to_string()),
            }),
        );
    }

    if pool.contains(&worker) {
        return (
            StatusCode::CONFLICT,
            Json(RegisterResponse {
                registered: false,
                pool_size: pool.len(),
                message: Some(format!("Calculating server {} is already connected", worker)),
            }),
        );
    }

    if let Err(e) = service.rpc().health_check(&worker).await {
        tracing::warn!("Refusing to register {}: {}", worker, e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(RegisterResponse {
                registered: false,
                pool_size: pool.len(),
                message: Some(format!("Cannot connect to server: {}", e)),
            }),
        );
    }

    // A concurrent registration of the same address may have won the race
    let registered = pool.register(worker.clone());
    let status = if registered {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };

    (
        status,
        Json(RegisterResponse {
            registered,
            pool_size: pool.len(),
            message: None,
        }),
    )
}

pub async fn handle_list_workers(
    Extension(service): Extension<Arc<CrackingService>>,
) -> (StatusCode, Json<WorkersResponse>) {
    let workers = service
        .pool()
        .members()
        .into_iter()
        .map(|worker| worker.to_string())
        .collect();

    (StatusCode::OK, Json(WorkersResponse { workers }))
}

pub async fn handle_crack_brute_force(
    Extension(service): Extension<Arc<CrackingService>>,
    payload: Result<Json<BruteForceJobRequest>, JsonRejection>,
) -> (StatusCode, Json<CrackingReport>) {
    let received = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed(rejection),
    };

    let (status, report) = service.crack_brute_force(request, received).await;
    (status, Json(report))
}

pub async fn handle_crack_dictionary(
    Extension(service): Extension<Arc<CrackingService>>,
    payload: Result<Json<DictionaryJobRequest>, JsonRejection>,
) -> (StatusCode, Json<CrackingReport>) {
    let received = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed(rejection),
    };

    let (status, report) = service.crack_dictionary(request, received).await;
    (status, Json(report))
}

fn malformed(rejection: JsonRejection) -> (StatusCode, Json<CrackingReport>) {
    let error = CrackError::Validation(rejection.body_text());
    tracing::warn!("Rejected malformed job request: {}", error);
    (StatusCode::BAD_REQUEST, Json(error_report(&error, None)))
}
