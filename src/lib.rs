//! Distributed Password Cracker Library
//!
//! Recovers a password for a known username by testing candidates across a
//! pool of remote worker nodes and racing them to the first match. The two
//! binaries (`central` and `worker`) are thin wrappers around these modules.
//!
//! ## Architecture Modules
//! - **`partition`**: Splits work into units. Alphabet portions for brute
//!   force, line-range chunks for dictionary search.
//! - **`pool`**: The registered worker set with permanent eviction.
//! - **`coordinator`**: The dispatch-and-race round loop with its set-once
//!   found latch and cooperative cancellation.
//! - **`cracking`**: Job flows, the response aggregator and the central HTTP
//!   API.
//! - **`worker`**: Candidate enumeration, the brute-force and dictionary
//!   executors and the worker HTTP API.
//! - **`rpc`**: Wire protocol and the HTTP client the coordinator dispatches
//!   through.
//! - **`storage`**: Read access to the dictionary corpus.
//! - **`config`**, **`error`**, **`metrics`**: Command line configuration,
//!   the error taxonomy and the optional CSV performance log.

pub mod config;
pub mod coordinator;
pub mod cracking;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod pool;
pub mod rpc;
pub mod storage;
pub mod worker;
