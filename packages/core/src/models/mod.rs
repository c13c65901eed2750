//! Data Models
//!
//! This module contains the core data structures shared by every component:
//!
//! - `Node` / `NodePayload` - Canvas nodes with a tagged kind-specific payload
//! - `Edge` - Connections between node ids (dangling endpoints tolerated)
//! - `Snapshot` - Immutable deep copy of `{nodes, edges, title}`
//! - `CollaborationState` - Advisory presence of remote editors

mod edge;
mod geometry;
pub(crate) mod node;
mod presence;
mod snapshot;
mod style;

pub use edge::{Edge, EdgeKind, EdgePatch};
pub use geometry::{BoundingBox, Position, Size, DEFAULT_NODE_SIZE};
pub use node::{ChecklistItem, DeleteResult, Node, NodeKind, NodePatch, NodePayload};
pub use presence::{CollaborationState, PresenceStatus, RemoteUser, UserId, UserProfile};
pub use snapshot::Snapshot;
pub use style::{NodeShape, StyleRecord};
