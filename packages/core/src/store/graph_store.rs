//! In-memory graph state with provenance-aware mutation.
//!
//! Nodes and edges live in id-keyed maps with a separate insertion order, so
//! lookups are constant time while snapshots, layouts and fuzzy matching see a
//! stable "node order".

use crate::config::EditorConfig;
use crate::grouping::absolute_position_with;
use crate::history::{UndoManager, DEFAULT_UNDO_CAPACITY};
use crate::models::{DeleteResult, Edge, EdgePatch, Node, NodePatch, Position, Snapshot};
use crate::store::mutation::{GraphMutation, Provenance};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: HashMap<String, Node>,
    node_order: Vec<String>,
    edges: HashMap<String, Edge>,
    edge_order: Vec<String>,
    title: String,
    history: UndoManager,
    outbox: Vec<GraphMutation>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl GraphStore {
    pub fn new(undo_capacity: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            title: String::new(),
            history: UndoManager::new(undo_capacity),
            outbox: Vec::new(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.undo_capacity)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Nodes in node order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Absolute canvas position of a node, walking its ancestor chain
    pub fn absolute_position(&self, id: &str) -> Option<Position> {
        absolute_position_with(|key| self.nodes.get(key), id)
    }

    /// Deep copy of the current graph
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.nodes().cloned().collect(),
            self.edges().cloned().collect(),
            self.title.clone(),
        )
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forget every undo and redo checkpoint
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Local mutations not yet handed to the collaboration client
    pub fn pending_mutations(&self) -> &[GraphMutation] {
        &self.outbox
    }

    /// Drain the outbox in the order the mutations happened
    pub fn take_outbox(&mut self) -> Vec<GraphMutation> {
        std::mem::take(&mut self.outbox)
    }

    // ------------------------------------------------------------------
    // Node mutations
    // ------------------------------------------------------------------

    /// Insert a node. Returns `false` (and changes nothing) if the id exists.
    pub fn add_node(&mut self, node: Node, provenance: Provenance) -> bool {
        if self.nodes.contains_key(&node.id) {
            tracing::debug!("Ignoring add of existing node {}", node.id);
            return false;
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::NodeCreated(node.clone()));
        self.insert_node(node);
        true
    }

    /// Merge `patch` into an existing node.
    ///
    /// Returns `false` for unknown ids, for patches that change nothing, and
    /// for parent changes that would create a cycle.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch, provenance: Provenance) -> bool {
        let Some(existing) = self.nodes.get(id) else {
            tracing::debug!("Ignoring update of unknown node {}", id);
            return false;
        };

        if let Some(Some(parent_id)) = &patch.parent_id {
            if self.would_cycle(id, parent_id) {
                tracing::warn!("Rejecting parent {} for {}: cycle", parent_id, id);
                return false;
            }
        }

        let mut updated = existing.clone();
        if !updated.apply_patch(patch) {
            return false;
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::NodeUpdated(updated.clone()));
        self.nodes.insert(id.to_string(), updated);
        true
    }

    /// Remove a node, its attached edges, and detach its children.
    ///
    /// Children keep their on-canvas position. Unknown ids are a no-op.
    pub fn remove_node(&mut self, id: &str, provenance: Provenance) -> DeleteResult {
        if !self.nodes.contains_key(id) {
            return DeleteResult::not_found();
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::NodeDeleted { id: id.to_string() });

        let origin = self.absolute_position(id).unwrap_or(Position::ORIGIN);
        for child in self.nodes.values_mut() {
            if child.parent_id.as_deref() == Some(id) {
                child.position = child.position + origin;
                child.parent_id = None;
            }
        }

        let attached: Vec<String> = self
            .edges()
            .filter(|edge| edge.touches(id))
            .map(|edge| edge.id.clone())
            .collect();
        for edge_id in &attached {
            self.edges.remove(edge_id);
        }
        self.edge_order.retain(|edge_id| !attached.contains(edge_id));

        self.nodes.remove(id);
        self.node_order.retain(|node_id| node_id != id);

        tracing::debug!("Removed node {} and {} attached edges", id, attached.len());
        DeleteResult::existed()
    }

    // ------------------------------------------------------------------
    // Edge mutations
    // ------------------------------------------------------------------

    /// Insert an edge. Endpoints need not exist yet.
    pub fn add_edge(&mut self, edge: Edge, provenance: Provenance) -> bool {
        if self.edges.contains_key(&edge.id) {
            tracing::debug!("Ignoring add of existing edge {}", edge.id);
            return false;
        }
        if !self.nodes.contains_key(&edge.source_id) || !self.nodes.contains_key(&edge.target_id) {
            tracing::debug!("Edge {} has a dangling endpoint", edge.id);
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::EdgeCreated(edge.clone()));
        self.edge_order.push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        true
    }

    pub fn update_edge(&mut self, id: &str, patch: &EdgePatch, provenance: Provenance) -> bool {
        let Some(existing) = self.edges.get(id) else {
            tracing::debug!("Ignoring update of unknown edge {}", id);
            return false;
        };

        let mut updated = existing.clone();
        if !updated.apply_patch(patch) {
            return false;
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::EdgeUpdated(updated.clone()));
        self.edges.insert(id.to_string(), updated);
        true
    }

    pub fn remove_edge(&mut self, id: &str, provenance: Provenance) -> DeleteResult {
        if !self.edges.contains_key(id) {
            return DeleteResult::not_found();
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::EdgeDeleted { id: id.to_string() });
        self.edges.remove(id);
        self.edge_order.retain(|edge_id| edge_id != id);
        DeleteResult::existed()
    }

    // ------------------------------------------------------------------
    // Whole-graph mutations
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>, provenance: Provenance) -> bool {
        let title = title.into();
        if title == self.title {
            return false;
        }

        self.checkpoint(provenance);
        self.enqueue(provenance, || GraphMutation::TitleChanged {
            title: title.clone(),
        });
        self.title = title;
        true
    }

    /// Replace every node and edge at once.
    ///
    /// A local replacement is one undo step and queues the per-entity diff
    /// against the previous state. Returns `false` if nothing changed.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>, provenance: Provenance) -> bool {
        let before = self.snapshot();
        if before.nodes == nodes && before.edges == edges {
            return false;
        }

        self.checkpoint(provenance);
        if provenance.is_local() {
            self.outbox.extend(diff(&before.nodes, &before.edges, &nodes, &edges));
        }
        self.install(nodes, edges);
        true
    }

    /// Install positions computed by a layout.
    ///
    /// One undo step; layout results are never broadcast. Nodes missing from
    /// `laid_out` keep their position.
    pub fn apply_layout(&mut self, laid_out: &[Node]) -> bool {
        let positions: HashMap<&str, Position> = laid_out
            .iter()
            .map(|node| (node.id.as_str(), node.position))
            .collect();

        let nodes: Vec<Node> = self
            .nodes()
            .map(|node| {
                let mut node = node.clone();
                if let Some(position) = positions.get(node.id.as_str()) {
                    node.position = *position;
                }
                node
            })
            .collect();

        let changed = nodes
            .iter()
            .any(|node| self.nodes.get(&node.id).map(|current| current.position) != Some(node.position));
        if !changed {
            return false;
        }

        let edges: Vec<Edge> = self.edges().cloned().collect();
        self.checkpoint(Provenance::Local);
        self.install(nodes, edges);
        tracing::debug!("Applied layout to {} nodes", positions.len());
        true
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Restore the previous checkpoint. Returns `false` if history is empty.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn checkpoint(&mut self, provenance: Provenance) {
        if provenance.is_local() {
            let snapshot = self.snapshot();
            self.history.push_undo(snapshot);
        }
    }

    fn enqueue<F>(&mut self, provenance: Provenance, mutation: F)
    where
        F: FnOnce() -> GraphMutation,
    {
        if provenance.is_local() {
            self.outbox.push(mutation());
        }
    }

    /// Undo/redo restores are local changes: broadcast, but not re-recorded
    fn restore(&mut self, snapshot: Snapshot) {
        let before = self.snapshot();
        self.outbox
            .extend(diff(&before.nodes, &before.edges, &snapshot.nodes, &snapshot.edges));
        if before.title != snapshot.title {
            self.outbox.push(GraphMutation::TitleChanged {
                title: snapshot.title.clone(),
            });
        }
        self.title = snapshot.title;
        self.install(snapshot.nodes, snapshot.edges);
    }

    fn install(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
        self.edge_order.clear();

        for node in nodes {
            if self.nodes.contains_key(&node.id) {
                tracing::warn!("Dropping duplicate node id {}", node.id);
                continue;
            }
            self.insert_node(node);
        }
        for edge in edges {
            if self.edges.contains_key(&edge.id) {
                tracing::warn!("Dropping duplicate edge id {}", edge.id);
                continue;
            }
            self.edge_order.push(edge.id.clone());
            self.edges.insert(edge.id.clone(), edge);
        }
    }

    fn insert_node(&mut self, node: Node) {
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Whether making `parent_id` the parent of `id` would close a loop
    fn would_cycle(&self, id: &str, parent_id: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(candidate) = current {
            if candidate == id {
                return true;
            }
            if !visited.insert(candidate) {
                return true;
            }
            current = self
                .nodes
                .get(candidate)
                .and_then(|node| node.parent_id.as_deref());
        }
        false
    }
}

/// Per-entity mutations turning `(old_nodes, old_edges)` into `(new_nodes, new_edges)`
fn diff(old_nodes: &[Node], old_edges: &[Edge], new_nodes: &[Node], new_edges: &[Edge]) -> Vec<GraphMutation> {
    let old_node_map: HashMap<&str, &Node> = old_nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let new_node_ids: HashSet<&str> = new_nodes.iter().map(|n| n.id.as_str()).collect();
    let old_edge_map: HashMap<&str, &Edge> = old_edges.iter().map(|e| (e.id.as_str(), e)).collect();
    let new_edge_ids: HashSet<&str> = new_edges.iter().map(|e| e.id.as_str()).collect();

    let mut mutations = Vec::new();

    for node in new_nodes {
        match old_node_map.get(node.id.as_str()) {
            None => mutations.push(GraphMutation::NodeCreated(node.clone())),
            Some(old) if *old != node => mutations.push(GraphMutation::NodeUpdated(node.clone())),
            Some(_) => {}
        }
    }

    for edge in new_edges {
        match old_edge_map.get(edge.id.as_str()) {
            None => mutations.push(GraphMutation::EdgeCreated(edge.clone())),
            Some(old) if *old != edge => mutations.push(GraphMutation::EdgeUpdated(edge.clone())),
            Some(_) => {}
        }
    }

    for edge in old_edges {
        if !new_edge_ids.contains(edge.id.as_str()) {
            mutations.push(GraphMutation::EdgeDeleted { id: edge.id.clone() });
        }
    }

    for node in old_nodes {
        if !new_node_ids.contains(node.id.as_str()) {
            mutations.push(GraphMutation::NodeDeleted { id: node.id.clone() });
        }
    }

    mutations
}
