//! Worker RPC Module
//!
//! Contract between the coordinator and worker nodes.
//!
//! - **`protocol`**: endpoint paths and the JSON DTOs exchanged over HTTP.
//!   Worker results use a tagged `WorkerReply` and are parsed by schema only.
//! - **`client`**: the `WorkerRpc` trait the coordinator dispatches through,
//!   its reqwest implementation, and the worker self-registration handshake.

pub mod client;
pub mod protocol;
