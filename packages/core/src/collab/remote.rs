//! Applying inbound mutations to the store.
//!
//! Rules, all through `Provenance::Remote`:
//!
//! - `create` is a no-op if the id already exists
//! - `update` merges into an existing entity and is dropped otherwise
//! - `delete` removes the entity if present; it wins over any local edit in progress

use crate::collab::messages::{MutationAction, MutationEntity, MutationMessage};
use crate::models::{Edge, EdgePatch, Node, NodePatch};
use crate::store::{GraphStore, Provenance};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteApplyError {
    #[error("{action:?} {entity:?} message for '{id}' carries no data")]
    MissingData {
        action: MutationAction,
        entity: MutationEntity,
        id: String,
    },

    #[error("Malformed {entity:?} payload: {source}")]
    Malformed {
        entity: MutationEntity,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported {action:?} on graph entity")]
    UnsupportedGraphAction { action: MutationAction },
}

#[derive(Deserialize)]
struct TitlePayload {
    title: String,
}

/// Apply one remote mutation. Returns `true` if the store changed.
pub fn apply_remote(store: &mut GraphStore, message: &MutationMessage) -> Result<bool, RemoteApplyError> {
    let id = message.node_id.as_str();
    match (message.entity, message.action) {
        (MutationEntity::Node, MutationAction::Create) => {
            let mut node: Node = decode(message)?;
            node.id = id.to_string();
            Ok(store.add_node(node, Provenance::Remote))
        }
        (MutationEntity::Node, MutationAction::Update) => {
            if !store.contains_node(id) {
                tracing::debug!("Dropping update for unknown node {}", id);
                return Ok(false);
            }
            let patch: NodePatch = decode(message)?;
            Ok(store.update_node(id, &patch, Provenance::Remote))
        }
        (MutationEntity::Node, MutationAction::Delete) => {
            Ok(store.remove_node(id, Provenance::Remote).existed)
        }
        (MutationEntity::Edge, MutationAction::Create) => {
            let mut edge: Edge = decode(message)?;
            edge.id = id.to_string();
            Ok(store.add_edge(edge, Provenance::Remote))
        }
        (MutationEntity::Edge, MutationAction::Update) => {
            if store.edge(id).is_none() {
                tracing::debug!("Dropping update for unknown edge {}", id);
                return Ok(false);
            }
            let patch: EdgePatch = decode(message)?;
            Ok(store.update_edge(id, &patch, Provenance::Remote))
        }
        (MutationEntity::Edge, MutationAction::Delete) => {
            Ok(store.remove_edge(id, Provenance::Remote).existed)
        }
        (MutationEntity::Graph, MutationAction::Update) => {
            let payload: TitlePayload = decode(message)?;
            Ok(store.set_title(payload.title, Provenance::Remote))
        }
        (MutationEntity::Graph, action) => Err(RemoteApplyError::UnsupportedGraphAction { action }),
    }
}

fn decode<T>(message: &MutationMessage) -> Result<T, RemoteApplyError>
where
    T: for<'de> Deserialize<'de>,
{
    let data = message
        .data
        .clone()
        .ok_or_else(|| RemoteApplyError::MissingData {
            action: message.action,
            entity: message.entity,
            id: message.node_id.clone(),
        })?;
    serde_json::from_value(data).map_err(|source| RemoteApplyError::Malformed {
        entity: message.entity,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodePayload, Position};
    use crate::store::GraphMutation;
    use serde_json::json;

    fn create(id: &str, x: f64) -> MutationMessage {
        let node = Node::new_with_id(id, NodePayload::text(id), Position::new(x, 0.0));
        MutationMessage::create_node(&node, "bob").unwrap()
    }

    #[test]
    fn test_create_is_idempotent_and_skips_history() {
        let mut store = GraphStore::default();
        assert!(apply_remote(&mut store, &create("n1", 1.0)).unwrap());
        assert!(!apply_remote(&mut store, &create("n1", 99.0)).unwrap());

        assert_eq!(store.node("n1").unwrap().position, Position::new(1.0, 0.0));
        assert!(!store.can_undo());
        assert!(store.pending_mutations().is_empty());
    }

    #[test]
    fn test_update_of_unknown_node_is_dropped() {
        let mut store = GraphStore::default();
        let message = MutationMessage {
            action: MutationAction::Update,
            entity: MutationEntity::Node,
            node_id: "ghost".to_string(),
            data: Some(json!({"position": {"x": 1.0, "y": 1.0}})),
            user_id: "bob".to_string(),
        };

        assert!(!apply_remote(&mut store, &message).unwrap());
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_update_merges_full_patch() {
        let mut sender = GraphStore::default();
        sender.add_node(
            Node::new_with_id("n1", NodePayload::text("old"), Position::ORIGIN),
            Provenance::Remote,
        );
        let mut receiver = sender.clone();

        sender.update_node(
            "n1",
            &NodePatch::new().with_payload(NodePayload::text("new")),
            Provenance::Local,
        );
        let outbox = sender.take_outbox();
        let message = MutationMessage::from_mutation(&outbox[0], "bob").unwrap();

        assert!(apply_remote(&mut receiver, &message).unwrap());
        assert_eq!(receiver.node("n1").unwrap().label(), "new");
        assert!(matches!(outbox[0], GraphMutation::NodeUpdated(_)));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = GraphStore::default();
        apply_remote(&mut store, &create("n1", 0.0)).unwrap();

        let delete = MutationMessage::delete_node("n1", "bob");
        assert!(apply_remote(&mut store, &delete).unwrap());
        assert!(!apply_remote(&mut store, &delete).unwrap());
    }

    #[test]
    fn test_create_without_data_is_malformed() {
        let mut store = GraphStore::default();
        let message = MutationMessage {
            action: MutationAction::Create,
            entity: MutationEntity::Edge,
            node_id: "e1".to_string(),
            data: None,
            user_id: "bob".to_string(),
        };

        assert!(matches!(
            apply_remote(&mut store, &message),
            Err(RemoteApplyError::MissingData { .. })
        ));
    }
}
