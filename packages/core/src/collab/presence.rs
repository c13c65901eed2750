use crate::collab::messages::PresenceMessage;
use crate::models::CollaborationState;

/// Fold one presence update into the local view.
///
/// Per-field last-write-wins keyed by user id: whatever arrives last for a
/// field is kept. Updates about the local user are ignored. Returns `true` if
/// the view changed.
pub fn merge_presence(state: &mut CollaborationState, message: &PresenceMessage) -> bool {
    if message.user_id == state.local_user_id {
        return false;
    }

    if message.left {
        return state.remote_users.remove(&message.user_id).is_some();
    }

    let user = state
        .remote_users
        .entry(message.user_id.clone())
        .or_default();
    let before = user.clone();

    if let Some(name) = &message.name {
        user.name = name.clone();
    }
    if let Some(avatar) = &message.avatar {
        user.avatar = Some(avatar.clone());
    }
    if let Some(cursor) = message.cursor {
        user.cursor = Some(cursor);
    }
    if let Some(status) = message.status {
        user.status = status;
    }
    if let Some(focused) = &message.focused_node_id {
        user.focused_node_id = focused.clone();
    }
    if let Some(node_id) = &message.lock {
        user.locked_node_ids.insert(node_id.clone());
    }
    if let Some(node_id) = &message.unlock {
        user.locked_node_ids.remove(node_id);
    }

    *user != before
}
