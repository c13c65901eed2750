//! Graph Store
//!
//! The single owner of the shared `{nodes, edges, title}` state. Every mutation
//! is tagged with a `Provenance`:
//!
//! - `Local` mutations record one undo checkpoint before the change and queue
//!   a `GraphMutation` in the outbox for the collaboration client to broadcast
//! - `Remote` mutations are applied directly with no undo entry and nothing
//!   queued, so remote traffic can never echo back or pollute local history

mod graph_store;
mod mutation;

pub use graph_store::GraphStore;
pub use mutation::{GraphMutation, Provenance};
