//! Layout Engine
//!
//! Pure, deterministic arrangement of top-level nodes. Every algorithm takes
//! the node list in its given order and returns the same list with new
//! positions; nothing else about a node changes. Nodes inside a group keep
//! their container-relative position.
//!
//! | kind           | arrangement                                              |
//! |----------------|----------------------------------------------------------|
//! | `Grid`         | row-major, `ceil(sqrt(n))` columns                       |
//! | `Circular`     | evenly spaced, clockwise from the top                    |
//! | `Tree`         | edge forest, left-aligned by subtree order               |
//! | `Hierarchical` | edge forest, each depth layer centered                   |
//! | `Force`        | seeded spring/repulsion simulation with linear cooling   |

mod circular;
mod force;
mod grid;
mod tree;

pub use circular::circular_layout;
pub use force::force_layout;
pub use grid::grid_layout;
pub use tree::{hierarchical_layout, tree_layout};

use crate::config::LayoutConfig;
use crate::models::{Edge, Node, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Grid,
    Circular,
    Tree,
    Hierarchical,
    Force,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::Grid,
        LayoutKind::Circular,
        LayoutKind::Tree,
        LayoutKind::Hierarchical,
        LayoutKind::Force,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Grid => "grid",
            LayoutKind::Circular => "circular",
            LayoutKind::Tree => "tree",
            LayoutKind::Hierarchical => "hierarchical",
            LayoutKind::Force => "force",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutKind::Grid),
            "circular" | "circle" => Ok(LayoutKind::Circular),
            "tree" => Ok(LayoutKind::Tree),
            "hierarchical" | "layered" => Ok(LayoutKind::Hierarchical),
            "force" | "force-directed" => Ok(LayoutKind::Force),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

/// Arrange `nodes` with the chosen algorithm
pub fn layout(kind: LayoutKind, nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    let top_level: Vec<&Node> = nodes.iter().filter(|node| node.parent_id.is_none()).collect();

    let positions = match kind {
        LayoutKind::Grid => grid_layout(top_level.len(), config),
        LayoutKind::Circular => circular_layout(top_level.len(), config),
        LayoutKind::Tree => tree_layout(&top_level, edges, config),
        LayoutKind::Hierarchical => hierarchical_layout(&top_level, edges, config),
        LayoutKind::Force => force_layout(&top_level, edges, &config.force),
    };

    tracing::debug!("Computed {} layout for {} nodes", kind, top_level.len());
    with_positions(nodes, &top_level, &positions)
}

fn with_positions(nodes: &[Node], placed: &[&Node], positions: &[Position]) -> Vec<Node> {
    let mut result: Vec<Node> = nodes.to_vec();
    for (node, position) in placed.iter().zip(positions) {
        if let Some(target) = result.iter_mut().find(|candidate| candidate.id == node.id) {
            target.position = *position;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodePayload;

    fn text(id: &str) -> Node {
        Node::new_with_id(id, NodePayload::text(id), Position::new(-1.0, -1.0))
    }

    #[test]
    fn test_layout_leaves_group_children_alone() {
        let nodes = vec![
            Node::new_with_id("g", NodePayload::group("g"), Position::ORIGIN),
            text("child").with_parent("g"),
            text("free"),
        ];
        let result = layout(LayoutKind::Grid, &nodes, &[], &LayoutConfig::default());

        assert_eq!(result[1].position, Position::new(-1.0, -1.0));
        assert_eq!(result[0].position, Position::new(0.0, 0.0));
        assert_eq!(result[2].position, Position::new(250.0, 0.0));
    }

    #[test]
    fn test_every_layout_is_deterministic() {
        let nodes: Vec<Node> = (0..6).map(|i| text(&format!("n{}", i))).collect();
        let edges = vec![
            Edge::new_with_id("e1", "n0", "n1"),
            Edge::new_with_id("e2", "n0", "n2"),
            Edge::new_with_id("e3", "n2", "n3"),
        ];
        let config = LayoutConfig::default();

        for kind in LayoutKind::ALL {
            let first = layout(kind, &nodes, &edges, &config);
            let second = layout(kind, &nodes, &edges, &config);
            assert_eq!(first, second, "{} layout is not deterministic", kind);
            assert_eq!(first.len(), nodes.len());
        }
    }

    #[test]
    fn test_layout_kind_parses_names() {
        for kind in LayoutKind::ALL {
            assert_eq!(kind.as_str().parse::<LayoutKind>().unwrap(), kind);
        }
        assert_eq!("Force".parse::<LayoutKind>().unwrap(), LayoutKind::Force);
        assert!("spiral".parse::<LayoutKind>().is_err());
    }
}
