//! Load/save wiring between a backend and the graph store.

use crate::error::NetworkError;
use crate::models::Snapshot;
use crate::persistence::records::SaveRequest;
use crate::persistence::GraphPersistence;
use crate::store::{GraphStore, Provenance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient, user-facing message about a background operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

pub struct SessionPersistence<P: GraphPersistence> {
    backend: Arc<P>,
    graph_id: String,
    style_config: Value,
    notifications: Vec<Notification>,
}

impl<P: GraphPersistence> SessionPersistence<P> {
    pub fn new(backend: Arc<P>, graph_id: impl Into<String>) -> Self {
        Self {
            backend,
            graph_id: graph_id.into(),
            style_config: Value::Null,
            notifications: Vec::new(),
        }
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    /// Style configuration from the last successful load
    pub fn style_config(&self) -> &Value {
        &self.style_config
    }

    pub fn set_style_config(&mut self, style_config: Value) {
        self.style_config = style_config;
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Replace the store's contents with the stored graph.
    ///
    /// Loading is remote provenance: no undo step, nothing broadcast. It also
    /// starts a fresh history, so undo can never bring back the graph that was
    /// open before the load. On failure the store is left empty and an error
    /// notification is queued.
    pub async fn load_into(&mut self, store: &mut GraphStore) -> Result<(), NetworkError> {
        match self.backend.load(&self.graph_id).await {
            Ok(loaded) => {
                self.style_config = loaded.style_config.clone();
                let (title, nodes, edges) = loaded.into_parts();
                let count = nodes.len();
                store.replace_all(nodes, edges, Provenance::Remote);
                store.set_title(title, Provenance::Remote);
                store.clear_history();
                tracing::info!("Loaded graph {} with {} nodes", self.graph_id, count);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Loading graph {} failed: {}", self.graph_id, e);
                store.replace_all(Vec::new(), Vec::new(), Provenance::Remote);
                store.set_title("", Provenance::Remote);
                store.clear_history();
                self.notifications
                    .push(Notification::error(format!("Could not load graph: {}", e)));
                Err(e)
            }
        }
    }

    /// Save `snapshot` as captured by the caller.
    ///
    /// The in-memory graph is never rolled back on failure; the error is
    /// reported as a notification so the user can retry.
    pub async fn save(&mut self, snapshot: &Snapshot) -> Result<(), NetworkError> {
        let mut request = SaveRequest::from_snapshot(snapshot);
        if !self.style_config.is_null() {
            request = request.with_style_config(self.style_config.clone());
        }

        match self.backend.save(&self.graph_id, request).await {
            Ok(()) => {
                tracing::info!("Saved graph {} ({} nodes)", self.graph_id, snapshot.nodes.len());
                self.notifications.push(Notification::info("Saved"));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Saving graph {} failed: {}", self.graph_id, e);
                self.notifications
                    .push(Notification::error(format!("Could not save: {}", e)));
                Err(e)
            }
        }
    }

    /// Toggle public visibility without touching graph content
    pub async fn set_public(&mut self, is_public: bool) -> Result<(), NetworkError> {
        self.backend
            .save(&self.graph_id, SaveRequest::default().with_public(is_public))
            .await
            .map_err(|e| {
                self.notifications
                    .push(Notification::error(format!("Could not change sharing: {}", e)));
                e
            })
    }
}
