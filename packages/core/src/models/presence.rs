//! Collaboration presence state
//!
//! Presence is advisory: it tells the local editor who else is looking at the
//! graph, where their cursor is and which nodes they claim to be editing. None
//! of it is enforced.

use crate::models::geometry::Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Viewing,
    Editing,
}

/// Identity a client announces when joining a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Position>,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_node_id: Option<String>,
    #[serde(default)]
    pub locked_node_ids: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollaborationState {
    pub local_user_id: UserId,
    pub remote_users: HashMap<UserId, RemoteUser>,
}

impl CollaborationState {
    pub fn new(local_user_id: impl Into<String>) -> Self {
        Self {
            local_user_id: local_user_id.into(),
            remote_users: HashMap::new(),
        }
    }

    /// Remote users currently claiming a lock on `node_id`
    pub fn lock_holders(&self, node_id: &str) -> Vec<&UserId> {
        let mut holders: Vec<&UserId> = self
            .remote_users
            .iter()
            .filter(|(_, user)| user.locked_node_ids.contains(node_id))
            .map(|(id, _)| id)
            .collect();
        holders.sort();
        holders
    }

    pub fn is_locked_by_other(&self, node_id: &str) -> bool {
        !self.lock_holders(node_id).is_empty()
    }
}
