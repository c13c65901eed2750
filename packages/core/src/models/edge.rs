//! Edge Data Structures
//!
//! Edges connect two node ids. Endpoints are *not* required to exist locally:
//! a remote `create` for an endpoint may still be in flight, so the graph is
//! eventually consistent rather than referentially strict. Renderers skip
//! dangling edges.

use crate::models::style::StyleRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    #[default]
    Default,
    Step,
    Smooth,
}

impl EdgeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Default => "default",
            EdgeKind::Step => "step",
            EdgeKind::Smooth => "smooth",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" | "straight" | "bezier" => Ok(EdgeKind::Default),
            "step" | "smoothstep" => Ok(EdgeKind::Step),
            "smooth" => Ok(EdgeKind::Smooth),
            other => Err(format!("unknown edge kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,

    #[serde(default)]
    pub kind: EdgeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub animated: bool,

    #[serde(default, skip_serializing_if = "StyleRecord::is_empty")]
    pub style: StyleRecord,
}

impl Edge {
    /// Create an edge with an auto-generated UUID
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), source_id, target_id)
    }

    pub fn new_with_id(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind: EdgeKind::Default,
            label: None,
            animated: false,
            style: StyleRecord::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    pub fn apply_patch(&mut self, patch: &EdgePatch) -> bool {
        let before = self.clone();
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(animated) = patch.animated {
            self.animated = animated;
        }
        match &patch.style {
            Some(style) if patch.replace_style => self.style = style.clone(),
            Some(style) => {
                self.style.merge(style);
            }
            None => {}
        }
        *self != before
    }
}

/// Partial edge update; `label` uses the double-Option pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EdgeKind>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::node::deserialize_optional_field"
    )]
    pub label: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replace_style: bool,
}

impl EdgePatch {
    pub fn with_style(mut self, style: StyleRecord) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl From<&Edge> for EdgePatch {
    fn from(edge: &Edge) -> Self {
        Self {
            kind: Some(edge.kind),
            label: Some(edge.label.clone()),
            animated: Some(edge.animated),
            style: Some(edge.style.clone()),
            replace_style: true,
        }
    }
}
