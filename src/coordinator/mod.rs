//! Task Coordination Module
//!
//! Races units of work across the worker pool until one worker reports a
//! match or the work runs out.
//!
//! ## Per-worker lifecycle
//! `Idle -> Dispatched -> {Matched, NoMatch, Failed}`. A worker only leaves
//! `Idle` after passing the gate (see `coordinator`). `Failed` is terminal
//! for the job: the worker is evicted from the pool and its unit goes back
//! to the work source for someone else.
//!
//! ## Submodules
//! - **`types`**: settings, dispatch outcomes, the found latch and the job
//!   outcome handed to the response aggregator.
//! - **`work`**: the `WorkSource` abstraction with its two implementations,
//!   alphabet portions (brute force) and corpus chunks (dictionary).
//! - **`coordinator`**: the round loop itself.

pub mod coordinator;
pub mod types;
pub mod work;

#[cfg(test)]
mod tests;
