//! Editor session
//!
//! Composes a `GraphStore` with the state that stays local to one editor:
//! selection, clipboard, active theme and keymap. Every operation here that
//! changes the graph does so with at most one store mutation, so each is at
//! most one undo step.

use crate::config::EditorConfig;
use crate::error::{CanvasError, RenderExportError, ValidationError};
use crate::export::{export, ExportArtifact, ExportFormat};
use crate::grouping;
use crate::keymap::{EditorCommand, KeyChord, Keymap};
use crate::layout::{layout, LayoutKind};
use crate::models::{Edge, EdgePatch, Node, Position, Snapshot, StyleRecord};
use crate::store::{GraphStore, Provenance};
use crate::theme::Theme;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
struct Clipboard {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Result of running an `EditorCommand`
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The caller should persist this snapshot
    SaveRequested(Snapshot),
    Exported(ExportArtifact),
    Undone(bool),
    Redone(bool),
    CommandPaletteRequested,
}

pub struct EditorSession {
    store: GraphStore,
    config: EditorConfig,
    selection: Vec<String>,
    clipboard: Clipboard,
    paste_count: usize,
    theme: Theme,
    keymap: Keymap,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: GraphStore::from_config(&config),
            config,
            selection: Vec::new(),
            clipboard: Clipboard::default(),
            paste_count: 0,
            theme: Theme::default(),
            keymap: Keymap::default(),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    // ------------------------------------------------------------------
    // Selection and clipboard
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Replace the selection; unknown ids are ignored
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.selection = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| self.store.contains_node(id) && seen.insert(id.clone()))
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Copy the selected nodes, descendants of selected groups, and the edges
    /// running between copied nodes. Returns the number of copied nodes.
    pub fn copy_selection(&mut self) -> usize {
        let snapshot = self.store.snapshot();
        let mut included: HashSet<String> = self.selection.iter().cloned().collect();

        loop {
            let before = included.len();
            for node in &snapshot.nodes {
                if node
                    .parent_id
                    .as_ref()
                    .is_some_and(|parent| included.contains(parent))
                {
                    included.insert(node.id.clone());
                }
            }
            if included.len() == before {
                break;
            }
        }

        let nodes: Vec<Node> = snapshot
            .nodes
            .iter()
            .filter(|node| included.contains(&node.id))
            .map(|node| {
                let mut copy = node.clone();
                let parent_copied = copy
                    .parent_id
                    .as_ref()
                    .is_some_and(|parent| included.contains(parent));
                if !parent_copied {
                    copy.position = self.store.absolute_position(&node.id).unwrap_or(node.position);
                    copy.parent_id = None;
                }
                copy.editing = false;
                copy
            })
            .collect();
        let edges: Vec<Edge> = snapshot
            .edges
            .iter()
            .filter(|edge| included.contains(&edge.source_id) && included.contains(&edge.target_id))
            .cloned()
            .collect();

        let count = nodes.len();
        self.clipboard = Clipboard { nodes, edges };
        tracing::debug!("Copied {} nodes", count);
        count
    }

    /// Paste the clipboard shifted by `offset`, with fresh `{id}-copy-{n}` ids.
    ///
    /// The pasted nodes become the selection. Returns their ids.
    pub fn paste(&mut self, offset: Position) -> Vec<String> {
        if self.clipboard.nodes.is_empty() {
            return Vec::new();
        }

        let taken: HashSet<String> = self
            .store
            .nodes()
            .map(|node| node.id.clone())
            .chain(self.store.edges().map(|edge| edge.id.clone()))
            .collect();
        let suffix = loop {
            self.paste_count += 1;
            let suffix = format!("-copy-{}", self.paste_count);
            let collides = self
                .clipboard
                .nodes
                .iter()
                .map(|node| &node.id)
                .chain(self.clipboard.edges.iter().map(|edge| &edge.id))
                .any(|id| taken.contains(&format!("{}{}", id, suffix)));
            if !collides {
                break suffix;
            }
        };

        let remap: HashMap<&str, String> = self
            .clipboard
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), format!("{}{}", node.id, suffix)))
            .collect();

        let pasted_nodes: Vec<Node> = self
            .clipboard
            .nodes
            .iter()
            .map(|node| {
                let mut copy = node.clone();
                copy.id = remap[node.id.as_str()].clone();
                match copy.parent_id.as_deref().and_then(|parent| remap.get(parent)) {
                    Some(parent) => copy.parent_id = Some(parent.clone()),
                    None => copy.position = copy.position + offset,
                }
                copy
            })
            .collect();
        let pasted_edges: Vec<Edge> = self
            .clipboard
            .edges
            .iter()
            .map(|edge| {
                let mut copy = edge.clone();
                copy.id = format!("{}{}", edge.id, suffix);
                copy.source_id = remap[edge.source_id.as_str()].clone();
                copy.target_id = remap[edge.target_id.as_str()].clone();
                copy
            })
            .collect();

        let ids: Vec<String> = pasted_nodes.iter().map(|node| node.id.clone()).collect();
        let snapshot = self.store.snapshot();
        let mut nodes = snapshot.nodes;
        let mut edges = snapshot.edges;
        nodes.extend(pasted_nodes);
        edges.extend(pasted_edges);
        self.store.replace_all(nodes, edges, Provenance::Local);

        self.selection = ids.clone();
        ids
    }

    // ------------------------------------------------------------------
    // Whole-graph edits
    // ------------------------------------------------------------------

    pub fn apply_layout(&mut self, kind: LayoutKind) -> bool {
        let snapshot = self.store.snapshot();
        let laid_out = layout(kind, &snapshot.nodes, &snapshot.edges, &self.config.layout);
        self.store.apply_layout(&laid_out)
    }

    pub fn apply_theme(&mut self, theme: Theme) -> bool {
        let snapshot = self.store.snapshot();
        let (nodes, edges) = theme.apply(&snapshot.nodes, &snapshot.edges);
        tracing::info!("Applying theme {}", theme.name);
        self.theme = theme;
        self.store.replace_all(nodes, edges, Provenance::Local)
    }

    /// Merge `style` into each listed node
    pub fn apply_node_style(&mut self, ids: &[String], style: &StyleRecord) -> bool {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let snapshot = self.store.snapshot();
        let nodes = snapshot
            .nodes
            .into_iter()
            .map(|mut node| {
                if targets.contains(node.id.as_str()) {
                    node.style.merge(style);
                }
                node
            })
            .collect();
        self.store.replace_all(nodes, snapshot.edges, Provenance::Local)
    }

    /// Apply `patch` to each listed edge
    pub fn apply_edge_style(&mut self, ids: &[String], patch: &EdgePatch) -> bool {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let snapshot = self.store.snapshot();
        let edges = snapshot
            .edges
            .into_iter()
            .map(|mut edge| {
                if targets.contains(edge.id.as_str()) {
                    edge.apply_patch(patch);
                }
                edge
            })
            .collect();
        self.store.replace_all(snapshot.nodes, edges, Provenance::Local)
    }

    /// Group the selection; the new container becomes the selection
    pub fn group_selection(&mut self) -> Result<String, ValidationError> {
        let snapshot = self.store.snapshot();
        let outcome = grouping::group(&snapshot.nodes, &self.selection, self.config.group_padding)?;
        self.store
            .replace_all(outcome.nodes, snapshot.edges, Provenance::Local);
        self.selection = vec![outcome.group_id.clone()];
        Ok(outcome.group_id)
    }

    pub fn ungroup_selection(&mut self) -> Result<(), ValidationError> {
        let snapshot = self.store.snapshot();
        let nodes = grouping::ungroup(&snapshot.nodes, &self.selection)?;
        let remaining: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let edges: Vec<Edge> = snapshot
            .edges
            .into_iter()
            .filter(|edge| remaining.contains(edge.source_id.as_str()) && remaining.contains(edge.target_id.as_str()))
            .collect();
        self.selection.retain(|id| remaining.contains(id.as_str()));
        self.store.replace_all(nodes, edges, Provenance::Local);
        Ok(())
    }

    pub fn reparent(&mut self, id: &str, new_parent: Option<&str>) -> Result<(), ValidationError> {
        let snapshot = self.store.snapshot();
        let nodes = grouping::reparent(&snapshot.nodes, id, new_parent)?;
        self.store.replace_all(nodes, snapshot.edges, Provenance::Local);
        Ok(())
    }

    /// Delete every selected node as one undo step
    pub fn delete_selection(&mut self) -> usize {
        let mut scratch = self.store.clone();
        let removed = self
            .selection
            .iter()
            .filter(|id| scratch.remove_node(id, Provenance::Remote).existed)
            .count();
        if removed > 0 {
            let remaining = scratch.snapshot();
            self.store
                .replace_all(remaining.nodes, remaining.edges, Provenance::Local);
        }
        self.selection.clear();
        removed
    }

    // ------------------------------------------------------------------
    // History, export, commands
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let undone = self.store.undo();
        self.prune_selection();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.store.redo();
        self.prune_selection();
        redone
    }

    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, RenderExportError> {
        export(&self.store.snapshot(), format, &self.theme.svg_style())
    }

    pub fn dispatch(&mut self, command: EditorCommand) -> Result<DispatchOutcome, CanvasError> {
        tracing::debug!("Dispatching {:?}", command);
        Ok(match command {
            EditorCommand::Save => DispatchOutcome::SaveRequested(self.store.snapshot()),
            EditorCommand::ExportJson => DispatchOutcome::Exported(self.export(ExportFormat::Json)?),
            EditorCommand::Undo => DispatchOutcome::Undone(self.undo()),
            EditorCommand::Redo => DispatchOutcome::Redone(self.redo()),
            EditorCommand::OpenCommandPalette => DispatchOutcome::CommandPaletteRequested,
        })
    }

    /// Run whatever `chord` is bound to; unbound chords do nothing
    pub fn handle_key(&mut self, chord: &KeyChord) -> Option<Result<DispatchOutcome, CanvasError>> {
        let command = self.keymap.resolve(chord)?;
        Some(self.dispatch(command))
    }

    fn prune_selection(&mut self) {
        let store = &self.store;
        self.selection.retain(|id| store.contains_node(id));
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
