//! Wire messages exchanged over the realtime channel.
//!
//! Payloads are camelCase JSON. Mutation `data` carries the full entity for
//! `create` and a field-wise patch for `update`; `delete` has no data.

use crate::models::{Edge, EdgePatch, Node, NodePatch, Position, PresenceStatus, UserId, UserProfile};
use crate::store::GraphMutation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `node_id` used by graph-level messages such as title changes
pub const GRAPH_ENTITY_ID: &str = "graph";

pub fn mutation_topic(graph_id: &str) -> String {
    format!("graph:{}:mutations", graph_id)
}

pub fn presence_topic(graph_id: &str) -> String {
    format!("graph:{}:presence", graph_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationEntity {
    #[default]
    Node,
    Edge,
    Graph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationMessage {
    pub action: MutationAction,

    /// Older clients omit this; such messages address nodes
    #[serde(default)]
    pub entity: MutationEntity,

    /// Id of the addressed node or edge
    pub node_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    pub user_id: UserId,
}

impl MutationMessage {
    /// Encode a store outbox entry on behalf of `user_id`
    pub fn from_mutation(mutation: &GraphMutation, user_id: &str) -> Result<Self, serde_json::Error> {
        let (action, entity, node_id, data) = match mutation {
            GraphMutation::NodeCreated(node) => (
                MutationAction::Create,
                MutationEntity::Node,
                node.id.clone(),
                Some(serde_json::to_value(node)?),
            ),
            GraphMutation::NodeUpdated(node) => (
                MutationAction::Update,
                MutationEntity::Node,
                node.id.clone(),
                Some(serde_json::to_value(NodePatch::from(node))?),
            ),
            GraphMutation::NodeDeleted { id } => {
                (MutationAction::Delete, MutationEntity::Node, id.clone(), None)
            }
            GraphMutation::EdgeCreated(edge) => (
                MutationAction::Create,
                MutationEntity::Edge,
                edge.id.clone(),
                Some(serde_json::to_value(edge)?),
            ),
            GraphMutation::EdgeUpdated(edge) => (
                MutationAction::Update,
                MutationEntity::Edge,
                edge.id.clone(),
                Some(serde_json::to_value(EdgePatch::from(edge))?),
            ),
            GraphMutation::EdgeDeleted { id } => {
                (MutationAction::Delete, MutationEntity::Edge, id.clone(), None)
            }
            GraphMutation::TitleChanged { title } => (
                MutationAction::Update,
                MutationEntity::Graph,
                GRAPH_ENTITY_ID.to_string(),
                Some(json!({ "title": title })),
            ),
        };

        Ok(Self {
            action,
            entity,
            node_id,
            data,
            user_id: user_id.to_string(),
        })
    }

    pub fn create_node(node: &Node, user_id: &str) -> Result<Self, serde_json::Error> {
        Self::from_mutation(&GraphMutation::NodeCreated(node.clone()), user_id)
    }

    pub fn create_edge(edge: &Edge, user_id: &str) -> Result<Self, serde_json::Error> {
        Self::from_mutation(&GraphMutation::EdgeCreated(edge.clone()), user_id)
    }

    pub fn delete_node(node_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            action: MutationAction::Delete,
            entity: MutationEntity::Node,
            node_id: node_id.into(),
            data: None,
            user_id: user_id.into(),
        }
    }
}

/// Partial presence update; absent fields leave the receiver's view unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMessage {
    pub user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceStatus>,

    /// `null` clears the focus, absence leaves it alone
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::node::deserialize_optional_field"
    )]
    pub focused_node_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub left: bool,
}

impl PresenceMessage {
    pub fn joined(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            name: Some(profile.name.clone()),
            avatar: profile.avatar.clone(),
            status: Some(PresenceStatus::Viewing),
            ..Self::default()
        }
    }

    pub fn cursor(user_id: impl Into<String>, cursor: Position) -> Self {
        Self {
            user_id: user_id.into(),
            cursor: Some(cursor),
            ..Self::default()
        }
    }

    /// Focus plus lock claim sent when an interaction starts
    pub fn focus(user_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            user_id: user_id.into(),
            status: Some(PresenceStatus::Editing),
            focused_node_id: Some(Some(node_id.clone())),
            lock: Some(node_id),
            ..Self::default()
        }
    }

    /// Focus cleared plus unlock sent when an interaction ends
    pub fn blur(user_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: Some(PresenceStatus::Viewing),
            focused_node_id: Some(None),
            unlock: Some(node_id.into()),
            ..Self::default()
        }
    }

    pub fn left(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            left: true,
            ..Self::default()
        }
    }
}

/// Everything a subscription can yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ChannelEvent {
    Mutation(MutationMessage),
    Presence(PresenceMessage),
}

impl ChannelEvent {
    /// Originating user, used for echo suppression
    pub fn user_id(&self) -> &str {
        match self {
            ChannelEvent::Mutation(message) => &message.user_id,
            ChannelEvent::Presence(message) => &message.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodePayload;

    #[test]
    fn test_mutation_message_wire_shape() {
        let node = Node::new_with_id("n1", NodePayload::text("hello"), Position::new(1.0, 2.0));
        let message = MutationMessage::create_node(&node, "alice").unwrap();
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["action"], "create");
        assert_eq!(value["entity"], "node");
        assert_eq!(value["nodeId"], "n1");
        assert_eq!(value["userId"], "alice");
        assert_eq!(value["data"]["data"]["text"], "hello");
    }

    #[test]
    fn test_entity_defaults_to_node() {
        let message: MutationMessage = serde_json::from_value(json!({
            "action": "delete",
            "nodeId": "n1",
            "userId": "bob"
        }))
        .unwrap();

        assert_eq!(message.entity, MutationEntity::Node);
        assert!(message.data.is_none());
    }

    #[test]
    fn test_blur_serializes_null_focus() {
        let value = serde_json::to_value(PresenceMessage::blur("alice", "n1")).unwrap();
        assert!(value["focusedNodeId"].is_null());
        assert!(value.as_object().unwrap().contains_key("focusedNodeId"));
        assert_eq!(value["unlock"], "n1");
        assert!(value.get("left").is_none());
    }

    #[test]
    fn test_title_change_targets_graph_entity() {
        let message = MutationMessage::from_mutation(
            &GraphMutation::TitleChanged {
                title: "Roadmap".to_string(),
            },
            "alice",
        )
        .unwrap();

        assert_eq!(message.entity, MutationEntity::Graph);
        assert_eq!(message.node_id, GRAPH_ENTITY_ID);
        assert_eq!(message.data, Some(json!({"title": "Roadmap"})));
    }
}
