//! Worker Pool Module
//!
//! Owns the set of worker nodes registered with this coordinator.
//!
//! ## Core Mechanisms
//! - **Registration**: an external handshake adds a worker address to the pool.
//!   Registration order is remembered so job snapshots are deterministic.
//! - **Job snapshots**: each job copies the pool into `WorkerState`s whose
//!   `busy` flag toggles around dispatch.
//! - **Eviction**: a worker that fails a health probe or a dispatch is removed
//!   from the pool outright. Only a fresh registration can bring it back.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;
