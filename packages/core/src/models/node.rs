//! Node Data Structures
//!
//! This module defines the canvas `Node` and its kind-specific payloads.
//!
//! # Architecture
//!
//! - **Tagged payload**: `NodePayload` carries one variant per node kind, so the
//!   kind of a node is always derived from its data and can never disagree with it
//! - **Flat arena**: nodes reference their parent by id, never by pointer; the
//!   graph store keeps them in an id-keyed map
//! - **Wire format**: serializes as `{id, kind, data, position, ...}`, the shape
//!   the canvas frontend and the realtime channel exchange
//!
//! # Examples
//!
//! ```rust
//! use nodecanvas_core::models::{Node, NodeKind, NodePayload, Position};
//!
//! let note = Node::new(NodePayload::text("Quarterly budget"), Position::new(10.0, 20.0));
//! assert_eq!(note.kind(), NodeKind::Text);
//! assert_eq!(note.label(), "Quarterly budget");
//! ```

use crate::models::geometry::{Position, Size, DEFAULT_NODE_SIZE};
use crate::models::style::StyleRecord;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Discriminant of a node's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Text,
    Image,
    Checklist,
    LinkPreview,
    Code,
    Group,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Checklist => "checklist",
            NodeKind::LinkPreview => "linkPreview",
            NodeKind::Code => "code",
            NodeKind::Group => "group",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(NodeKind::Text),
            "image" => Ok(NodeKind::Image),
            "checklist" => Ok(NodeKind::Checklist),
            "linkPreview" | "link_preview" | "link-preview" => Ok(NodeKind::LinkPreview),
            "code" => Ok(NodeKind::Code),
            "group" => Ok(NodeKind::Group),
            other => Err(format!("unknown node kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

/// Kind-specific node data.
///
/// Serialized adjacently tagged: `{"kind": "code", "data": {"code": ..., "language": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum NodePayload {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Checklist {
        title: String,
        #[serde(default)]
        items: Vec<ChecklistItem>,
    },
    #[serde(rename_all = "camelCase")]
    LinkPreview {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Code {
        code: String,
        #[serde(default)]
        language: String,
    },
    Group {
        #[serde(default)]
        label: String,
    },
}

impl NodePayload {
    pub fn text(text: impl Into<String>) -> Self {
        NodePayload::Text { text: text.into() }
    }

    pub fn group(label: impl Into<String>) -> Self {
        NodePayload::Group {
            label: label.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Text { .. } => NodeKind::Text,
            NodePayload::Image { .. } => NodeKind::Image,
            NodePayload::Checklist { .. } => NodeKind::Checklist,
            NodePayload::LinkPreview { .. } => NodeKind::LinkPreview,
            NodePayload::Code { .. } => NodeKind::Code,
            NodePayload::Group { .. } => NodeKind::Group,
        }
    }

    /// Human-readable label used for search, matching and export
    pub fn label(&self) -> &str {
        match self {
            NodePayload::Text { text } => text,
            NodePayload::Image { url, alt } => alt.as_deref().unwrap_or(url),
            NodePayload::Checklist { title, .. } => title,
            NodePayload::LinkPreview { url, title, .. } => title.as_deref().unwrap_or(url),
            NodePayload::Code { code, .. } => code.lines().next().unwrap_or(""),
            NodePayload::Group { label } => label,
        }
    }
}

/// Canvas node.
///
/// # Fields
///
/// - `id`: Unique within a graph
/// - `payload`: Kind-specific data; `kind()` is derived from it
/// - `position`: Top-left corner, relative to the parent group when `parent_id` is set
/// - `size`: Measured size, `None` until the renderer reports one
/// - `parent_id`: Containing group, by id
/// - `editing`: Whether a local user is currently editing the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    #[serde(flatten)]
    pub payload: NodePayload,

    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(default, skip_serializing_if = "StyleRecord::is_empty")]
    pub style: StyleRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub editing: bool,
}

impl Node {
    /// Create a node with an auto-generated UUID
    pub fn new(payload: NodePayload, position: Position) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), payload, position)
    }

    /// Create a node with a caller-chosen id (imports, tests, remote creates)
    pub fn new_with_id(id: impl Into<String>, payload: NodePayload, position: Position) -> Self {
        Self {
            id: id.into(),
            payload,
            position,
            size: None,
            style: StyleRecord::default(),
            parent_id: None,
            editing: false,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_style(mut self, style: StyleRecord) -> Self {
        self.style = style;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn label(&self) -> &str {
        self.payload.label()
    }

    pub fn is_group(&self) -> bool {
        self.kind() == NodeKind::Group
    }

    /// Measured size, or the default node size when the node was never measured
    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or(DEFAULT_NODE_SIZE)
    }

    /// Apply a partial update in place.
    ///
    /// Returns `true` if any field actually changed.
    pub fn apply_patch(&mut self, patch: &NodePatch) -> bool {
        let before = self.clone();
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        match &patch.style {
            Some(style) if patch.replace_style => self.style = style.clone(),
            Some(style) => {
                self.style.merge(style);
            }
            None => {}
        }
        if let Some(payload) = &patch.payload {
            self.payload = payload.clone();
        }
        if let Some(parent_id) = &patch.parent_id {
            self.parent_id = parent_id.clone();
        }
        if let Some(editing) = patch.editing {
            self.editing = editing;
        }
        *self != before
    }
}

/// Custom deserializer for double-Option fields
///
/// Distinguishes between:
/// - Missing field → None (don't update)
/// - null → Some(None) (clear the field)
/// - "value" → Some(Some("value")) (set to value)
pub(crate) fn deserialize_optional_field<'de, D, T>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update used by local edits and remote `update` messages
///
/// All fields are optional; only provided fields are changed. Style patches
/// merge per style field unless `replace_style` is set, in which case the
/// record is taken as a whole (full-node patches built with `From<&Node>`).
///
/// # Double-Option Pattern for Nullable Fields
///
/// `size` and `parent_id` use a double `Option`:
///
/// - `None`: Don't change this field
/// - `Some(None)`: Clear the field
/// - `Some(Some(value))`: Set the field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub size: Option<Option<Size>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,

    /// `style` is the complete record and replaces the current one
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replace_style: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<NodePayload>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_style(mut self, style: StyleRecord) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_payload(mut self, payload: NodePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_editing(mut self, editing: bool) -> Self {
        self.editing = Some(editing);
        self
    }

    /// Check if the patch contains any changes
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.style.is_none()
            && self.payload.is_none()
            && self.parent_id.is_none()
            && self.editing.is_none()
    }
}

impl From<&Node> for NodePatch {
    /// A patch that sets every field to the node's current value
    fn from(node: &Node) -> Self {
        Self {
            position: Some(node.position),
            size: Some(node.size),
            style: Some(node.style.clone()),
            replace_style: true,
            payload: Some(node.payload.clone()),
            parent_id: Some(node.parent_id.clone()),
            editing: Some(node.editing),
        }
    }
}

/// Result of a delete operation
///
/// Deletes are idempotent: removing an unknown id succeeds, and `existed`
/// records whether anything was actually removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    pub existed: bool,
}

impl DeleteResult {
    pub fn existed() -> Self {
        Self { existed: true }
    }

    pub fn not_found() -> Self {
        Self { existed: false }
    }
}
