//! Network Protocol Definitions
//!
//! Data Transfer Objects shared by the central node and worker nodes, plus
//! the endpoint paths both sides route on.

use serde::{Deserialize, Serialize};

// --- Worker endpoints ---

/// Liveness probe used before every assignment.
pub const ENDPOINT_HEALTH: &str = "/api/health";
/// Brute-force search over one character portion.
pub const ENDPOINT_BRUTE_FORCE: &str = "/api/brute-force";
/// Dictionary search over one line range.
pub const ENDPOINT_DICTIONARY: &str = "/api/dictionary/cracking";

// --- Central endpoints ---

/// Worker registration handshake.
pub const ENDPOINT_REGISTER: &str = "/api/workers/register";
/// Registered worker listing.
pub const ENDPOINT_WORKERS: &str = "/api/workers";
/// Public brute-force job entry point.
pub const ENDPOINT_CRACK_BRUTE_FORCE: &str = "/api/cracking/brute-force";
/// Public dictionary job entry point.
pub const ENDPOINT_CRACK_DICTIONARY: &str = "/api/cracking/dictionary";

/// Longest password length either node accepts.
pub const MAX_PASSWORD_LENGTH: usize = 16;

/// One brute-force unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BruteForceRequest {
    pub username: String,
    pub password_length: usize,
    /// Characters owned by the receiving worker.
    pub portion: String,
    /// Full job alphabet. When present the portion only constrains the
    /// leading character; otherwise every position ranges over the portion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<String>,
}

/// One dictionary unit of work: an inclusive, 1-based line range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryRequest {
    pub username: String,
    pub start_line: u64,
    pub end_line: u64,
}

/// Result of one unit of work, as reported by a worker.
///
/// `elapsed_ms` covers the whole request on the worker; `calculation_ms`
/// only the search itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum WorkerReply {
    Found {
        password: String,
        elapsed_ms: u64,
        calculation_ms: u64,
    },
    NotFound {
        elapsed_ms: u64,
        calculation_ms: u64,
        /// The time budget ran out before the range was exhausted.
        #[serde(default)]
        budget_exhausted: bool,
    },
    Error {
        message: String,
        elapsed_ms: u64,
    },
}

impl WorkerReply {
    pub fn error(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Error {
            message: message.into(),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub registered: bool,
    pub pool_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersResponse {
    pub workers: Vec<String>,
}
