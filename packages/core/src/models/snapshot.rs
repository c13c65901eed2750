//! Graph snapshots
//!
//! A `Snapshot` is a plain deep copy of the shared graph state. Undo/redo
//! checkpoints, JSON export and save requests are all built from one.

use crate::models::edge::Edge;
use crate::models::geometry::BoundingBox;
use crate::models::node::Node;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub title: String,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, title: impl Into<String>) -> Self {
        Self {
            nodes,
            edges,
            title: title.into(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Bounding box of every top-level node, in absolute coordinates
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(
            self.nodes
                .iter()
                .filter(|node| node.parent_id.is_none())
                .map(|node| (node.position, node.effective_size())),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
