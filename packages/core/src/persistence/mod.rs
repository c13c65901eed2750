//! Persistence boundary
//!
//! The backend stores graphs as flat row records (`DbNode`, `DbEdge`) with
//! snake_case columns. This module defines the async `GraphPersistence`
//! contract, the row conversions, an in-memory backend, and
//! `SessionPersistence`, which wires load/save into the graph store and turns
//! failures into user-facing notifications.

mod memory;
mod records;
mod session;

pub use memory::InMemoryPersistence;
pub use records::{DbEdge, DbNode, LoadedGraph, SaveRequest};
pub use session::{Notification, NotificationLevel, SessionPersistence};

use crate::error::NetworkError;
use async_trait::async_trait;

#[async_trait]
pub trait GraphPersistence: Send + Sync {
    async fn load(&self, graph_id: &str) -> Result<LoadedGraph, NetworkError>;

    /// Persist the fields present in `request`; absent fields are left as stored
    async fn save(&self, graph_id: &str, request: SaveRequest) -> Result<(), NetworkError>;
}
