//! Accepting AI suggestions.
//!
//! Suggestions arrive as plain labels. A suggested connection names its
//! endpoints by label fragments, which are resolved against the graph with a
//! case-insensitive substring match; the first matching node in node order
//! wins.

use crate::error::NetworkError;
use crate::models::{Edge, Node, NodePayload, Position, Snapshot, DEFAULT_NODE_SIZE};
use crate::store::{GraphStore, Provenance};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedConcept {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SuggestedConcept {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedConnection {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SuggestedConnection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }
}

/// Remote generator of suggestions for a graph
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch_concepts(&self, graph: &Snapshot) -> Result<Vec<SuggestedConcept>, NetworkError>;

    async fn fetch_connections(&self, graph: &Snapshot) -> Result<Vec<SuggestedConnection>, NetworkError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    NodeAdded {
        node_id: String,
    },
    EdgeAdded {
        edge_id: String,
        source_id: String,
        target_id: String,
    },
    /// An endpoint matched no node, or both endpoints matched the same node
    NoMatch,
}

/// First node in `nodes` whose label contains `query`, ignoring case
pub fn find_node_by_label<'a, I>(nodes: I, query: &str) -> Option<&'a Node>
where
    I: IntoIterator<Item = &'a Node>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    nodes
        .into_iter()
        .find(|node| node.label().to_lowercase().contains(&needle))
}

/// Add the concept as one node placed inside the current bounding box
pub fn accept_suggested_concept(store: &mut GraphStore, concept: &SuggestedConcept) -> IngestOutcome {
    let position = match store.snapshot().bounding_box() {
        Some(bbox) => {
            let center = bbox.center();
            Position::new(
                (center.x - DEFAULT_NODE_SIZE.width / 2.0).max(bbox.min.x),
                (center.y - DEFAULT_NODE_SIZE.height / 2.0).max(bbox.min.y),
            )
        }
        None => Position::ORIGIN,
    };

    let text = match &concept.description {
        Some(description) if !description.is_empty() => {
            format!("{}\n\n{}", concept.label, description)
        }
        _ => concept.label.clone(),
    };

    let node_id = format!("suggestion-{}", Uuid::new_v4());
    store.add_node(
        Node::new_with_id(node_id.clone(), NodePayload::text(text), position),
        Provenance::Local,
    );
    tracing::debug!("Accepted concept '{}' as {}", concept.label, node_id);
    IngestOutcome::NodeAdded { node_id }
}

/// Connect the nodes best matching `from` and `to`
pub fn accept_suggested_connection(
    store: &mut GraphStore,
    connection: &SuggestedConnection,
) -> IngestOutcome {
    let source = find_node_by_label(store.nodes(), &connection.from).map(|node| node.id.clone());
    let target = find_node_by_label(store.nodes(), &connection.to).map(|node| node.id.clone());

    let (Some(source_id), Some(target_id)) = (source, target) else {
        tracing::debug!(
            "No match for suggested connection '{}' -> '{}'",
            connection.from,
            connection.to
        );
        return IngestOutcome::NoMatch;
    };
    if source_id == target_id {
        return IngestOutcome::NoMatch;
    }

    let mut edge = Edge::new(source_id.clone(), target_id.clone());
    edge.label = connection.label.clone();
    let edge_id = edge.id.clone();
    store.add_edge(edge, Provenance::Local);

    IngestOutcome::EdgeAdded {
        edge_id,
        source_id,
        target_id,
    }
}

/// Fetch concepts and connections from `source` and accept all of them.
///
/// Concepts are accepted first so that connections may refer to them. The
/// whole batch lands in `store` as one undo step.
pub async fn ingest_suggestions(
    source: &dyn SuggestionSource,
    store: &mut GraphStore,
) -> Result<Vec<IngestOutcome>, NetworkError> {
    let graph = store.snapshot();
    let concepts = source.fetch_concepts(&graph).await.map_err(|e| {
        tracing::error!("Fetching concepts failed: {}", e);
        e
    })?;
    let connections = source.fetch_connections(&graph).await.map_err(|e| {
        tracing::error!("Fetching connections failed: {}", e);
        e
    })?;

    let mut scratch = store.clone();
    let mut outcomes = Vec::with_capacity(concepts.len() + connections.len());
    for concept in &concepts {
        outcomes.push(accept_suggested_concept(&mut scratch, concept));
    }
    for connection in &connections {
        outcomes.push(accept_suggested_connection(&mut scratch, connection));
    }

    let batch = scratch.snapshot();
    if store.replace_all(batch.nodes, batch.edges, Provenance::Local) {
        tracing::info!("Accepted {} suggestions", outcomes.len());
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    fn store_with(labels: &[(&str, &str)]) -> GraphStore {
        let mut store = GraphStore::default();
        for (i, (id, label)) in labels.iter().enumerate() {
            store.add_node(
                Node::new_with_id(*id, NodePayload::text(*label), Position::new(i as f64 * 300.0, 0.0)),
                Provenance::Remote,
            );
        }
        store
    }

    #[test]
    fn test_fuzzy_match_prefers_first_in_node_order() {
        let mut store = store_with(&[
            ("a", "Budget Review"),
            ("b", "budget forecast"),
            ("c", "Hiring plan"),
        ]);

        let outcome = accept_suggested_connection(&mut store, &SuggestedConnection::new("BUDGET", "hiring"));
        match outcome {
            IngestOutcome::EdgeAdded { source_id, target_id, .. } => {
                assert_eq!(source_id, "a");
                assert_eq!(target_id, "c");
            }
            other => panic!("expected edge, got {:?}", other),
        }
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_unmatched_or_self_connection_is_no_match() {
        let mut store = store_with(&[("a", "Budget"), ("b", "Hiring")]);

        assert_eq!(
            accept_suggested_connection(&mut store, &SuggestedConnection::new("budget", "travel")),
            IngestOutcome::NoMatch
        );
        assert_eq!(
            accept_suggested_connection(&mut store, &SuggestedConnection::new("bud", "get")),
            IngestOutcome::NoMatch
        );
        assert_eq!(store.edge_count(), 0);
        assert!(!store.can_undo());
    }

    #[test]
    fn test_concept_lands_inside_bounding_box() {
        let mut store = store_with(&[("a", "one"), ("b", "two")]);
        let bbox: BoundingBox = store.snapshot().bounding_box().unwrap();

        let IngestOutcome::NodeAdded { node_id } =
            accept_suggested_concept(&mut store, &SuggestedConcept::new("Idea"))
        else {
            panic!("expected a node");
        };

        let node = store.node(&node_id).unwrap();
        assert!(bbox.contains(node.position));
        assert_eq!(node.label(), "Idea");
        assert_eq!(store.history().undo_len(), 1);
    }
}
