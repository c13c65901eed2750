use crate::models::{Edge, Node};

/// Origin of a store mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Made by the local user: undoable and broadcast
    Local,
    /// Received from another editor or loaded from persistence
    Remote,
}

impl Provenance {
    pub fn is_local(self) -> bool {
        self == Provenance::Local
    }
}

/// A local change waiting in the outbox to be broadcast.
///
/// Updates carry the full post-change entity; receivers merge it field-wise.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    NodeCreated(Node),
    NodeUpdated(Node),
    NodeDeleted { id: String },
    EdgeCreated(Edge),
    EdgeUpdated(Edge),
    EdgeDeleted { id: String },
    TitleChanged { title: String },
}

impl GraphMutation {
    pub fn event_type(&self) -> &'static str {
        match self {
            GraphMutation::NodeCreated(_) => "node:created",
            GraphMutation::NodeUpdated(_) => "node:updated",
            GraphMutation::NodeDeleted { .. } => "node:deleted",
            GraphMutation::EdgeCreated(_) => "edge:created",
            GraphMutation::EdgeUpdated(_) => "edge:updated",
            GraphMutation::EdgeDeleted { .. } => "edge:deleted",
            GraphMutation::TitleChanged { .. } => "graph:title",
        }
    }
}
