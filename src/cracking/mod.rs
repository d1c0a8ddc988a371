//! Cracking Jobs Module
//!
//! The public face of the central node. A job request is validated,
//! partitioned, handed to the task coordinator and its outcome shaped into a
//! `CrackingReport`.
//!
//! ## Job flows
//! - **Brute force**: the alphabet is split into one portion per registered
//!   worker. In the default keyspace mode a portion fixes the first character
//!   of the candidates and the remaining positions range over the whole
//!   alphabet, so the workers jointly cover every password of the length.
//! - **Dictionary**: the newest corpus file is counted and cut into chunks of
//!   the configured granularity, handed out lazily as workers free up.
//!
//! ## Submodules
//! - **`types`**: request bodies and the tagged `CrackingReport`.
//! - **`response`**: the response aggregator and phase timing.
//! - **`service`**: `CrackingService`, shared job plumbing and the job lock.
//! - **`brute_force`** / **`dictionary`**: the two job flows.
//! - **`handlers`**: axum handlers for jobs and worker registration.

pub mod brute_force;
pub mod dictionary;
pub mod handlers;
pub mod response;
pub mod service;
pub mod types;
