//! Note import.
//!
//! Node ids follow `note-{noteId}-{kind}-{index}`. The index for each
//! `(noteId, kind)` pair continues after the highest one already in the graph,
//! so importing the same note twice never collides.

use crate::config::LayoutConfig;
use crate::models::{BoundingBox, ChecklistItem, Edge, EdgeKind, Node, NodePayload, Position, Snapshot};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Vertical distance between satellites of one note
const SATELLITE_ROW_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub takeaways: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteItemKind {
    Summary,
    Takeaway,
    Action,
}

impl NoteItemKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NoteItemKind::Summary => "summary",
            NoteItemKind::Takeaway => "takeaway",
            NoteItemKind::Action => "action",
        }
    }
}

impl fmt::Display for NoteItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Takeaways,
    Actions,
}

impl Section {
    fn classify(heading: &str) -> Self {
        let heading = heading.to_lowercase();
        if heading.contains("takeaway") || heading.contains("key point") || heading.contains("insight") {
            Section::Takeaways
        } else if heading.contains("action") || heading.contains("next step") || heading.contains("todo") {
            Section::Actions
        } else {
            Section::Summary
        }
    }
}

impl Note {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_takeaway(mut self, takeaway: impl Into<String>) -> Self {
        self.takeaways.push(takeaway.into());
        self
    }

    pub fn with_action_item(mut self, item: impl Into<String>) -> Self {
        self.action_items.push(item.into());
        self
    }

    /// Parse a markdown note.
    ///
    /// The first `#` heading is the title. List items under a heading that
    /// mentions takeaways, key points or insights become takeaways; items under
    /// actions, next steps or todo become action items, as does any task-list
    /// item (`- [ ] ...`). Remaining prose and bullets form the summary.
    pub fn from_markdown(id: impl Into<String>, markdown: &str) -> Self {
        let mut note = Note::new(id, "");
        let mut section = Section::Summary;
        let mut summary_parts: Vec<String> = Vec::new();

        let mut heading: Option<(HeadingLevel, String)> = None;
        let mut paragraph = String::new();
        let mut items: Vec<(String, bool)> = Vec::new();

        for event in Parser::new_ext(markdown, Options::ENABLE_TASKLISTS) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => heading = Some((level, String::new())),
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = heading.take() {
                        let text = text.trim().to_string();
                        if level == HeadingLevel::H1 && note.title.is_empty() {
                            note.title = text;
                        } else {
                            section = Section::classify(&text);
                        }
                    }
                }
                Event::Start(Tag::Item) => items.push((String::new(), false)),
                Event::TaskListMarker(_) => {
                    if let Some(item) = items.last_mut() {
                        item.1 = true;
                    }
                }
                Event::End(TagEnd::Item) => {
                    if let Some((text, is_task)) = items.pop() {
                        let text = text.trim().to_string();
                        if text.is_empty() {
                            continue;
                        }
                        match (is_task, section) {
                            (true, _) | (false, Section::Actions) => note.action_items.push(text),
                            (false, Section::Takeaways) => note.takeaways.push(text),
                            (false, Section::Summary) => summary_parts.push(format!("- {}", text)),
                        }
                    }
                }
                Event::End(TagEnd::Paragraph) if items.is_empty() => {
                    let text = std::mem::take(&mut paragraph);
                    let text = text.trim();
                    if !text.is_empty() && section == Section::Summary {
                        summary_parts.push(text.to_string());
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    push_text(&mut heading, &mut items, &mut paragraph, &text);
                }
                Event::SoftBreak | Event::HardBreak => {
                    push_text(&mut heading, &mut items, &mut paragraph, " ");
                }
                _ => {}
            }
        }

        note.summary = summary_parts.join("\n\n");
        if note.title.is_empty() {
            note.title = note
                .summary
                .lines()
                .next()
                .map(|line| line.trim_start_matches("- ").to_string())
                .unwrap_or_else(|| note.id.clone());
        }
        note
    }

    fn summary_text(&self) -> String {
        if self.summary.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.summary)
        }
    }
}

fn push_text(
    heading: &mut Option<(HeadingLevel, String)>,
    items: &mut [(String, bool)],
    paragraph: &mut String,
    text: &str,
) {
    if let Some((_, buffer)) = heading {
        buffer.push_str(text);
    } else if let Some((buffer, _)) = items.last_mut() {
        buffer.push_str(text);
    } else {
        paragraph.push_str(text);
    }
}

/// Nodes and edges produced by an import, not yet applied
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphFragment {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphFragment {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Build the fragment for `notes` against the current graph.
///
/// Summary nodes sit on a `ceil(sqrt(n))`-column grid that starts one row
/// below the graph's bounding box; each note's satellites stack in the column
/// to the right of its summary.
pub fn import_notes(notes: &[Note], graph: &Snapshot, config: &LayoutConfig) -> GraphFragment {
    if notes.is_empty() {
        return GraphFragment::default();
    }

    let mut next_index = existing_indices(graph);
    let mut allocate = |note_id: &str, kind: NoteItemKind| -> String {
        let slot = next_index.entry((note_id.to_string(), kind)).or_insert(0);
        let id = format!("note-{}-{}-{}", note_id, kind, slot);
        *slot += 1;
        id
    };

    let origin = match graph.bounding_box() {
        Some(BoundingBox { min, max }) => Position::new(min.x, max.y + config.grid_spacing_y),
        None => Position::ORIGIN,
    };

    let columns = (notes.len() as f64).sqrt().ceil() as usize;
    let tallest = notes
        .iter()
        .map(|note| note.takeaways.len() + note.action_items.len())
        .max()
        .unwrap_or(0)
        .max(1);
    let cell_width = 2.0 * config.grid_spacing_x;
    let cell_height = tallest as f64 * SATELLITE_ROW_HEIGHT + config.grid_spacing_y;

    let mut fragment = GraphFragment::default();
    for (index, note) in notes.iter().enumerate() {
        let cell = Position::new(
            origin.x + (index % columns) as f64 * cell_width,
            origin.y + (index / columns) as f64 * cell_height,
        );

        let summary_id = allocate(&note.id, NoteItemKind::Summary);
        fragment.nodes.push(Node::new_with_id(
            summary_id.clone(),
            NodePayload::text(note.summary_text()),
            cell,
        ));

        let satellites = note
            .takeaways
            .iter()
            .map(|text| (NoteItemKind::Takeaway, text))
            .chain(note.action_items.iter().map(|text| (NoteItemKind::Action, text)));

        for (row, (kind, text)) in satellites.enumerate() {
            let id = allocate(&note.id, kind);
            let payload = match kind {
                NoteItemKind::Action => NodePayload::Checklist {
                    title: text.clone(),
                    items: vec![ChecklistItem::new(text.clone())],
                },
                _ => NodePayload::text(text.clone()),
            };
            let position = Position::new(
                cell.x + config.grid_spacing_x,
                cell.y + row as f64 * SATELLITE_ROW_HEIGHT,
            );
            fragment.nodes.push(Node::new_with_id(id.clone(), payload, position));
            fragment.edges.push(
                Edge::new_with_id(format!("edge-{}", id), summary_id.clone(), id)
                    .with_kind(EdgeKind::Smooth),
            );
        }
    }

    tracing::debug!(
        "Prepared import of {} notes as {} nodes",
        notes.len(),
        fragment.nodes.len()
    );
    fragment
}

/// Next free index per `(noteId, kind)` given the ids already in `graph`
fn existing_indices(graph: &Snapshot) -> HashMap<(String, NoteItemKind), usize> {
    let mut next: HashMap<(String, NoteItemKind), usize> = HashMap::new();
    for node in &graph.nodes {
        let Some(rest) = node.id.strip_prefix("note-") else {
            continue;
        };
        for kind in [NoteItemKind::Summary, NoteItemKind::Takeaway, NoteItemKind::Action] {
            let marker = format!("-{}-", kind);
            let Some(split) = rest.rfind(&marker) else {
                continue;
            };
            let (note_id, tail) = (&rest[..split], &rest[split + marker.len()..]);
            if let Ok(index) = tail.parse::<usize>() {
                let slot = next.entry((note_id.to_string(), kind)).or_insert(0);
                *slot = (*slot).max(index + 1);
            }
        }
    }
    next
}
