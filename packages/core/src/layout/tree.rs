//! Layered layouts over the forest implied by edges.
//!
//! Nodes without an inbound edge are roots; depth is assigned breadth-first
//! from all roots at once, and each node hangs under the parent that reached
//! it first. Components that are pure cycles get their first node (in node
//! order) promoted to a root. Nodes that touch no edge at all go to an
//! overflow row below the deepest layer.

use crate::config::LayoutConfig;
use crate::models::{Edge, Node, Position};
use std::collections::{HashMap, VecDeque};

struct Forest {
    depth: Vec<usize>,
    children: Vec<Vec<usize>>,
    /// Indices per depth, stably sorted by parent slot then node index
    layers: Vec<Vec<usize>>,
    overflow: Vec<usize>,
}

impl Forest {
    fn build(nodes: &[&Node], edges: &[Edge]) -> Self {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let count = nodes.len();
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut indegree = vec![0usize; count];
        let mut connected = vec![false; count];

        for edge in edges {
            let (Some(&source), Some(&target)) = (
                index.get(edge.source_id.as_str()),
                index.get(edge.target_id.as_str()),
            ) else {
                continue;
            };
            if source == target || outgoing[source].contains(&target) {
                continue;
            }
            outgoing[source].push(target);
            indegree[target] += 1;
            connected[source] = true;
            connected[target] = true;
        }
        for targets in &mut outgoing {
            targets.sort_unstable();
        }

        let mut depth = vec![usize::MAX; count];
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut roots: Vec<usize> = (0..count)
            .filter(|&i| connected[i] && indegree[i] == 0)
            .collect();

        let mut bfs = |sources: &[usize], depth: &mut Vec<usize>| {
            let mut queue: VecDeque<usize> = VecDeque::new();
            for &root in sources {
                depth[root] = 0;
                queue.push_back(root);
            }
            while let Some(current) = queue.pop_front() {
                for &next in &outgoing[current] {
                    if depth[next] == usize::MAX {
                        depth[next] = depth[current] + 1;
                        parent[next] = Some(current);
                        children[current].push(next);
                        queue.push_back(next);
                    }
                }
            }
        };

        bfs(&roots, &mut depth);
        while let Some(orphan) = (0..count).find(|&i| connected[i] && depth[i] == usize::MAX) {
            roots.push(orphan);
            bfs(&[orphan], &mut depth);
        }

        let max_depth = (0..count)
            .filter(|&i| connected[i])
            .map(|i| depth[i])
            .max();

        let mut layers: Vec<Vec<usize>> = Vec::new();
        if let Some(max_depth) = max_depth {
            layers.push(roots);
            for level in 1..=max_depth {
                let previous = &layers[level - 1];
                let slot: HashMap<usize, usize> =
                    previous.iter().enumerate().map(|(s, &i)| (i, s)).collect();
                let mut layer: Vec<usize> = (0..count)
                    .filter(|&i| connected[i] && depth[i] == level)
                    .collect();
                layer.sort_by_key(|&i| {
                    let parent_slot = parent[i].and_then(|p| slot.get(&p).copied());
                    (parent_slot.unwrap_or(usize::MAX), i)
                });
                layers.push(layer);
            }
        }

        let overflow = (0..count).filter(|&i| !connected[i]).collect();

        Self {
            depth,
            children,
            layers,
            overflow,
        }
    }

    fn overflow_row(&self) -> usize {
        self.layers.len()
    }
}

/// Left-aligned tree: each node takes the column of its first leaf
pub fn tree_layout(nodes: &[&Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Position> {
    let forest = Forest::build(nodes, edges);
    let mut positions = vec![Position::ORIGIN; nodes.len()];

    let mut next_column = 0usize;
    let mut stack: Vec<usize> = forest
        .layers
        .first()
        .map(|roots| roots.iter().rev().copied().collect())
        .unwrap_or_default();

    while let Some(current) = stack.pop() {
        positions[current] = Position::new(
            next_column as f64 * config.tree_spacing_x,
            forest.depth[current] as f64 * config.tree_spacing_y,
        );
        let children = &forest.children[current];
        if children.is_empty() {
            next_column += 1;
        } else {
            stack.extend(children.iter().rev());
        }
    }

    place_overflow(&forest, &mut positions, config.tree_spacing_x, config.tree_spacing_y);
    positions
}

/// Layered layout with every depth layer centered on x = 0
pub fn hierarchical_layout(nodes: &[&Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Position> {
    let forest = Forest::build(nodes, edges);
    let mut positions = vec![Position::ORIGIN; nodes.len()];

    for (level, layer) in forest.layers.iter().enumerate() {
        let offset = (layer.len() as f64 - 1.0) / 2.0;
        for (slot, &index) in layer.iter().enumerate() {
            positions[index] = Position::new(
                (slot as f64 - offset) * config.tree_spacing_x,
                level as f64 * config.tree_spacing_y,
            );
        }
    }

    place_overflow(&forest, &mut positions, config.tree_spacing_x, config.tree_spacing_y);
    positions
}

fn place_overflow(forest: &Forest, positions: &mut [Position], spacing_x: f64, spacing_y: f64) {
    let y = forest.overflow_row() as f64 * spacing_y;
    for (slot, &index) in forest.overflow.iter().enumerate() {
        positions[index] = Position::new(slot as f64 * spacing_x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodePayload;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new_with_id(*id, NodePayload::text(*id), Position::ORIGIN))
            .collect()
    }

    fn sample() -> (Vec<Node>, Vec<Edge>) {
        (
            nodes(&["r", "a", "b", "c", "lonely"]),
            vec![
                Edge::new_with_id("1", "r", "a"),
                Edge::new_with_id("2", "r", "b"),
                Edge::new_with_id("3", "a", "c"),
            ],
        )
    }

    #[test]
    fn test_tree_columns_follow_subtree_order() {
        let (nodes, edges) = sample();
        let refs: Vec<&Node> = nodes.iter().collect();
        let positions = tree_layout(&refs, &edges, &LayoutConfig::default());

        assert_eq!(positions[0], Position::new(0.0, 0.0));
        assert_eq!(positions[1], Position::new(0.0, 160.0));
        assert_eq!(positions[3], Position::new(0.0, 320.0));
        assert_eq!(positions[2], Position::new(220.0, 160.0));
        assert_eq!(positions[4], Position::new(0.0, 480.0));
    }

    #[test]
    fn test_hierarchical_centers_layers() {
        let (nodes, edges) = sample();
        let refs: Vec<&Node> = nodes.iter().collect();
        let positions = hierarchical_layout(&refs, &edges, &LayoutConfig::default());

        assert_eq!(positions[0], Position::new(0.0, 0.0));
        assert_eq!(positions[1], Position::new(-110.0, 160.0));
        assert_eq!(positions[2], Position::new(110.0, 160.0));
        assert_eq!(positions[3], Position::new(0.0, 320.0));
        assert_eq!(positions[4], Position::new(0.0, 480.0));
    }

    #[test]
    fn test_cycle_promotes_first_node_to_root() {
        let nodes = nodes(&["x", "y"]);
        let edges = vec![Edge::new_with_id("1", "x", "y"), Edge::new_with_id("2", "y", "x")];
        let refs: Vec<&Node> = nodes.iter().collect();
        let positions = hierarchical_layout(&refs, &edges, &LayoutConfig::default());

        assert_eq!(positions[0], Position::new(0.0, 0.0));
        assert_eq!(positions[1], Position::new(0.0, 160.0));
    }

    #[test]
    fn test_edgeless_nodes_fill_overflow_row() {
        let nodes = nodes(&["p", "q"]);
        let refs: Vec<&Node> = nodes.iter().collect();
        let positions = tree_layout(&refs, &[], &LayoutConfig::default());

        assert_eq!(positions, vec![Position::new(0.0, 0.0), Position::new(220.0, 0.0)]);
    }
}
