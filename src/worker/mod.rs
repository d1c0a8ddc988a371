//! Worker Node
//!
//! Everything a calculating node runs: the executors that search one unit of
//! work and the HTTP surface the central node dispatches to.
//!
//! ## Submodules
//! - **`enumerate`**: Index to candidate bijection over a (mixed-radix)
//!   keyspace, plus the iterator executors walk.
//! - **`credentials`**: Stored digests per username and the MD5 digest
//!   function.
//! - **`brute_force`**: Exhaustive search of one character portion.
//! - **`dictionary`**: Budgeted search of one corpus line range.
//! - **`handlers`**: Axum handlers mapping executor outcomes to tagged
//!   `WorkerReply` bodies and HTTP status codes.
//!
//! Executors are synchronous and CPU bound; handlers run them on the
//! blocking pool so health probes keep answering during a long search.

pub mod brute_force;
pub mod credentials;
pub mod dictionary;
pub mod enumerate;
pub mod handlers;
