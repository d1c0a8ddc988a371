use super::protocol::*;
use crate::pool::types::WorkerId;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// A worker refused the request itself (400 or 404). Every worker would
/// answer the same way, so the job fails instead of the worker being evicted.
#[derive(Debug, Clone, Error)]
#[error("Server {worker} rejected the request with status code {status}: {message}")]
pub struct RequestRejected {
    pub worker: WorkerId,
    pub status: u16,
    pub message: String,
}

/// Calls the coordinator makes on a worker node.
///
/// Any `Err` other than `RequestRejected` is a communication failure: the
/// coordinator evicts the worker.
#[async_trait]
pub trait WorkerRpc: Send + Sync {
    async fn assign_brute_force(
        &self,
        worker: &WorkerId,
        request: &BruteForceRequest,
    ) -> Result<WorkerReply>;

    async fn assign_dictionary_chunk(
        &self,
        worker: &WorkerId,
        request: &DictionaryRequest,
    ) -> Result<WorkerReply>;

    async fn health_check(&self, worker: &WorkerId) -> Result<()>;
}

/// `WorkerRpc` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    http_client: reqwest::Client,
    dispatch_timeout: Duration,
    health_timeout: Duration,
}

impl HttpWorkerClient {
    pub fn new(dispatch_timeout: Duration, health_timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            dispatch_timeout,
            health_timeout,
        }
    }

    async fn post_assignment<T: serde::Serialize + Sync>(
        &self,
        worker: &WorkerId,
        endpoint: &str,
        payload: &T,
    ) -> Result<WorkerReply> {
        let url = format!("{}{}", worker.base_url(), endpoint);
        let response = self
            .http_client
            .post(url)
            .json(payload)
            .timeout(self.dispatch_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<WorkerReply>(&body) {
                Ok(WorkerReply::Error { message, .. }) => message,
                _ => body,
            };
            if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
                return Err(RequestRejected {
                    worker: worker.clone(),
                    status: status.as_u16(),
                    message: detail,
                }
                .into());
            }
            return Err(anyhow!(
                "Server {} responded with status code {}: {}",
                worker,
                status,
                detail
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| anyhow!("Malformed reply from server {}: {}", worker, e))
    }
}

#[async_trait]
impl WorkerRpc for HttpWorkerClient {
    async fn assign_brute_force(
        &self,
        worker: &WorkerId,
        request: &BruteForceRequest,
    ) -> Result<WorkerReply> {
        tracing::debug!(
            "Sending brute force request to {} with portion '{}'",
            worker,
            request.portion
        );
        self.post_assignment(worker, ENDPOINT_BRUTE_FORCE, request)
            .await
    }

    async fn assign_dictionary_chunk(
        &self,
        worker: &WorkerId,
        request: &DictionaryRequest,
    ) -> Result<WorkerReply> {
        tracing::debug!(
            "Sending chunk {}-{} to {}",
            request.start_line,
            request.end_line,
            worker
        );
        self.post_assignment(worker, ENDPOINT_DICTIONARY, request)
            .await
    }

    async fn health_check(&self, worker: &WorkerId) -> Result<()> {
        let url = format!("{}{}", worker.base_url(), ENDPOINT_HEALTH);
        let response = self
            .http_client
            .get(url)
            .timeout(self.health_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Server {} health check failed with status code {}",
                worker,
                response.status()
            ));
        }
        Ok(())
    }
}

/// Registers this worker with a central node, retrying with backoff.
pub async fn register_with_central(
    central: &str,
    advertised: &str,
    attempts: usize,
) -> Result<RegisterResponse> {
    let http_client = reqwest::Client::new();
    let url = format!("{}{}", WorkerId::new(central).base_url(), ENDPOINT_REGISTER);
    let payload = RegisterRequest {
        address: advertised.to_string(),
    };
    let mut delay_ms = 150u64;

    for attempt in 0..attempts {
        let result = http_client
            .post(url.clone())
            .json(&payload)
            .timeout(Duration::from_secs(30))
            .send()
            .await;

        let failure = match result {
            // 409: already registered, which is as good as success
            Ok(resp)
                if resp.status().is_success()
                    || resp.status() == StatusCode::CONFLICT =>
            {
                return Ok(resp.json::<RegisterResponse>().await?);
            }
            Ok(resp) => anyhow!("central responded with status code {}", resp.status()),
            Err(e) => anyhow!(e),
        };

        if attempt + 1 == attempts {
            return Err(failure);
        }
        tracing::warn!(
            "Registration attempt {} with {} failed: {}",
            attempt + 1,
            central,
            failure
        );

        let jitter = rand::random::<u64>() % 50;
        tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
        delay_ms = (delay_ms * 2).min(1200);
    }

    Err(anyhow!("Registration attempts exhausted"))
}
