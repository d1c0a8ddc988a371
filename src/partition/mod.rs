//! Work Partitioning Module
//!
//! Splits a cracking job into independent units of work that can be handed to
//! workers one at a time.
//!
//! ## Strategies
//! - **Character space** (`alphabet`): the brute-force alphabet is cut into
//!   contiguous, non-overlapping portions, one per active worker. Taken in
//!   order, the portions reconstruct the alphabet exactly once.
//! - **Line ranges** (`chunk`): the dictionary corpus is cut into sequential
//!   chunks of at most `granularity` lines. Taken in order, the chunks cover
//!   `[1, total_lines]` exactly once.

pub mod alphabet;
pub mod chunk;
