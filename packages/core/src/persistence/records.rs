//! Row records exchanged with the persistence backend.

use crate::models::{Edge, EdgeKind, Node, NodeKind, NodePayload, NodeShape, Position, Size, Snapshot, StyleRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbNode {
    pub node_id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position_x: f64,
    pub position_y: f64,
    /// Kind-specific payload as JSON
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Parent, shape and stroke width, which have no dedicated column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbEdge {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    #[serde(rename = "type", default)]
    pub edge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedGraph {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub style_config: Value,
    #[serde(default)]
    pub nodes: Vec<DbNode>,
    #[serde(default)]
    pub edges: Vec<DbEdge>,
}

impl LoadedGraph {
    pub fn into_parts(self) -> (String, Vec<Node>, Vec<Edge>) {
        let nodes = self.nodes.into_iter().map(DbNode::into_node).collect();
        let edges = self.edges.into_iter().map(DbEdge::into_edge).collect();
        (self.title, nodes, edges)
    }
}

/// Partial save; `None` fields are not written
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<DbNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<DbEdge>>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "is_public")]
    pub is_public: Option<bool>,
}

impl SaveRequest {
    /// Full save of `snapshot` as it is right now
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            title: Some(snapshot.title.clone()),
            style_config: None,
            nodes: Some(snapshot.nodes.iter().map(DbNode::from_node).collect()),
            edges: Some(snapshot.edges.iter().map(DbEdge::from_edge).collect()),
            is_public: None,
        }
    }

    pub fn with_style_config(mut self, style_config: Value) -> Self {
        self.style_config = Some(style_config);
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }
}

impl DbNode {
    pub fn from_node(node: &Node) -> Self {
        let content = serde_json::to_value(&node.payload)
            .ok()
            .and_then(|value| value.get("data").cloned())
            .unwrap_or(Value::Null);

        let mut metadata = serde_json::Map::new();
        if let Some(parent_id) = &node.parent_id {
            metadata.insert("parentId".to_string(), json!(parent_id));
        }
        if let Some(shape) = node.style.shape {
            metadata.insert("shape".to_string(), json!(shape));
        }
        if let Some(width) = node.style.stroke_width {
            metadata.insert("strokeWidth".to_string(), json!(width));
        }

        Self {
            node_id: node.id.clone(),
            node_type: node.kind().as_str().to_string(),
            position_x: node.position.x,
            position_y: node.position.y,
            content,
            color: node.style.color.clone(),
            background_color: node.style.background_color.clone(),
            width: node.size.map(|size| size.width),
            height: node.size.map(|size| size.height),
            border_color: node.style.border_color.clone(),
            metadata: (!metadata.is_empty()).then_some(Value::Object(metadata)),
        }
    }

    /// Convert back to a node. Unknown types and unreadable content become text.
    pub fn into_node(self) -> Node {
        let payload = decode_payload(&self.node_type, &self.content);
        let metadata = self.metadata.unwrap_or(Value::Null);

        let style = StyleRecord {
            color: self.color,
            background_color: self.background_color,
            border_color: self.border_color,
            stroke_width: metadata.get("strokeWidth").and_then(Value::as_f64),
            shape: metadata
                .get("shape")
                .and_then(|shape| serde_json::from_value::<NodeShape>(shape.clone()).ok()),
        };

        let mut node = Node::new_with_id(
            self.node_id,
            payload,
            Position::new(self.position_x, self.position_y),
        )
        .with_style(style);
        if let (Some(width), Some(height)) = (self.width, self.height) {
            node.size = Some(Size::new(width, height));
        }
        node.parent_id = metadata
            .get("parentId")
            .and_then(Value::as_str)
            .map(str::to_string);
        node
    }
}

fn decode_payload(node_type: &str, content: &Value) -> NodePayload {
    if let Ok(kind) = node_type.parse::<NodeKind>() {
        let tagged = json!({ "kind": kind.as_str(), "data": content });
        if let Ok(payload) = serde_json::from_value::<NodePayload>(tagged) {
            return payload;
        }
        tracing::warn!("Unreadable {} content, falling back to text", node_type);
    } else {
        tracing::warn!("Unknown node type '{}', treating as text", node_type);
    }

    let text = match content {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| content.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    NodePayload::text(text)
}

impl DbEdge {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            edge_id: edge.id.clone(),
            source_node_id: edge.source_id.clone(),
            target_node_id: edge.target_id.clone(),
            edge_type: edge.kind.as_str().to_string(),
            label: edge.label.clone(),
            animated: Some(edge.animated),
            color: edge.style.color.clone(),
        }
    }

    pub fn into_edge(self) -> Edge {
        let kind = self.edge_type.parse::<EdgeKind>().unwrap_or_default();
        let mut edge = Edge::new_with_id(self.edge_id, self.source_node_id, self.target_node_id)
            .with_kind(kind);
        edge.label = self.label;
        edge.animated = self.animated.unwrap_or(false);
        edge.style.color = self.color;
        edge
    }
}
