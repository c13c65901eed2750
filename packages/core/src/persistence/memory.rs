use crate::error::NetworkError;
use crate::persistence::records::{LoadedGraph, SaveRequest};
use crate::persistence::GraphPersistence;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct StoredGraph {
    graph: LoadedGraph,
    is_public: bool,
}

/// Process-local backend; the last save of each field wins.
///
/// `set_offline(true)` makes every call fail with a `NetworkError`, which lets
/// tests exercise the failure paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    graphs: Arc<RwLock<HashMap<String, StoredGraph>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a graph as if it had been saved earlier
    pub async fn insert(&self, graph_id: impl Into<String>, graph: LoadedGraph) {
        self.graphs.write().await.insert(
            graph_id.into(),
            StoredGraph {
                graph,
                is_public: false,
            },
        );
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn is_public(&self, graph_id: &str) -> Option<bool> {
        self.graphs.read().await.get(graph_id).map(|stored| stored.is_public)
    }

    pub async fn stored(&self, graph_id: &str) -> Option<LoadedGraph> {
        self.graphs.read().await.get(graph_id).map(|stored| stored.graph.clone())
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphPersistence for InMemoryPersistence {
    async fn load(&self, graph_id: &str) -> Result<LoadedGraph, NetworkError> {
        if self.is_offline() {
            return Err(NetworkError::load_failed(graph_id, "backend offline"));
        }
        self.graphs
            .read()
            .await
            .get(graph_id)
            .map(|stored| stored.graph.clone())
            .ok_or_else(|| NetworkError::load_failed(graph_id, "graph not found"))
    }

    async fn save(&self, graph_id: &str, request: SaveRequest) -> Result<(), NetworkError> {
        if self.is_offline() {
            return Err(NetworkError::save_failed(graph_id, "backend offline"));
        }

        let mut graphs = self.graphs.write().await;
        let stored = graphs.entry(graph_id.to_string()).or_default();
        if let Some(title) = request.title {
            stored.graph.title = title;
        }
        if let Some(style_config) = request.style_config {
            stored.graph.style_config = style_config;
        }
        if let Some(nodes) = request.nodes {
            stored.graph.nodes = nodes;
        }
        if let Some(edges) = request.edges {
            stored.graph.edges = edges;
        }
        if let Some(is_public) = request.is_public {
            stored.is_public = is_public;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_save_keeps_other_fields() {
        let backend = InMemoryPersistence::new();
        backend
            .save(
                "g",
                SaveRequest {
                    title: Some("First".to_string()),
                    nodes: Some(Vec::new()),
                    ..SaveRequest::default()
                },
            )
            .await
            .unwrap();
        backend.save("g", SaveRequest::default().with_public(true)).await.unwrap();

        let loaded = backend.load("g").await.unwrap();
        assert_eq!(loaded.title, "First");
        assert_eq!(backend.is_public("g").await, Some(true));
    }

    #[tokio::test]
    async fn test_offline_backend_fails() {
        let backend = InMemoryPersistence::new();
        backend.set_offline(true);

        assert!(matches!(
            backend.load("g").await,
            Err(NetworkError::LoadFailed { .. })
        ));
        assert!(backend.save("g", SaveRequest::default()).await.is_err());
    }
}
