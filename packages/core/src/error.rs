//! Error Types
//!
//! The core distinguishes three failure families:
//!
//! - `ValidationError` - a request that would break a graph invariant (cyclic
//!   reparenting, unknown target, malformed export target)
//! - `NetworkError` - load/save/broadcast/suggestion-fetch failures
//! - `RenderExportError` - serialization or rasterization failures
//!
//! Concurrent-edit conflicts are not errors: they resolve silently by
//! last-event-wins. Every failure here is recoverable.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Reparenting would make a node its own ancestor
    #[error("Reparenting '{node_id}' under '{parent_id}' would create a cycle")]
    CyclicReparent { node_id: String, parent_id: String },

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Selection is empty")]
    EmptySelection,

    #[error("Invalid export target: {0}")]
    InvalidExportTarget(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValidationError {
    pub fn cyclic_reparent(node_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CyclicReparent {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
        }
    }

    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode(id.into())
    }

    pub fn invalid_export_target(msg: impl Into<String>) -> Self {
        Self::InvalidExportTarget(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Failed to load graph {graph_id}: {reason}")]
    LoadFailed { graph_id: String, reason: String },

    #[error("Failed to save graph {graph_id}: {reason}")]
    SaveFailed { graph_id: String, reason: String },

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error("Suggestion fetch failed: {0}")]
    SuggestionFetchFailed(String),

    /// The realtime channel was closed by the transport
    #[error("Realtime channel closed: {topic}")]
    ChannelClosed { topic: String },
}

impl NetworkError {
    pub fn load_failed(graph_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            graph_id: graph_id.into(),
            reason: reason.into(),
        }
    }

    pub fn save_failed(graph_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveFailed {
            graph_id: graph_id.into(),
            reason: reason.into(),
        }
    }

    pub fn broadcast_failed(msg: impl Into<String>) -> Self {
        Self::BroadcastFailed(msg.into())
    }

    pub fn suggestion_fetch_failed(msg: impl Into<String>) -> Self {
        Self::SuggestionFetchFailed(msg.into())
    }

    pub fn channel_closed(topic: impl Into<String>) -> Self {
        Self::ChannelClosed {
            topic: topic.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderExportError {
    #[error("Failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse generated SVG: {0}")]
    SvgParse(String),

    #[error("Failed to rasterize: {0}")]
    Rasterize(String),

    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Umbrella error for callers that mix components
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Export(#[from] RenderExportError),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
