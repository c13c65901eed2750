//! Per-editor collaboration session.
//!
//! The client never blocks local editing: the store is mutated synchronously
//! and the client only drains its outbox afterwards. Inbound events are
//! processed one at a time, to completion, in arrival order.

use crate::collab::channel::{RealtimeChannel, Subscription};
use crate::collab::messages::{mutation_topic, presence_topic, ChannelEvent, MutationMessage, PresenceMessage};
use crate::collab::presence::merge_presence;
use crate::collab::remote::apply_remote;
use crate::collab::throttle::CursorThrottle;
use crate::config::EditorConfig;
use crate::error::NetworkError;
use crate::models::{CollaborationState, Position, PresenceStatus, UserProfile};
use crate::store::GraphStore;
use std::sync::Arc;
use tokio::time::Instant;

/// What happened to one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The store or presence view changed
    Applied,
    /// Valid, but a no-op under the remote-apply rules
    Ignored,
    /// Sent by the local user and dropped unprocessed
    EchoSuppressed,
    /// Could not be decoded
    Malformed,
}

pub struct CollaborationClient<C: RealtimeChannel> {
    channel: Arc<C>,
    profile: UserProfile,
    graph_id: Option<String>,
    state: CollaborationState,
    status: PresenceStatus,
    throttle: CursorThrottle,
    mutations: Option<Subscription>,
    presence: Option<Subscription>,
}

impl<C: RealtimeChannel> CollaborationClient<C> {
    pub fn new(channel: Arc<C>, profile: UserProfile, config: &EditorConfig) -> Self {
        Self {
            state: CollaborationState::new(profile.user_id.clone()),
            channel,
            profile,
            graph_id: None,
            status: PresenceStatus::Viewing,
            throttle: CursorThrottle::from_millis(config.cursor_throttle_ms),
            mutations: None,
            presence: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    pub fn graph_id(&self) -> Option<&str> {
        self.graph_id.as_deref()
    }

    pub fn state(&self) -> &CollaborationState {
        &self.state
    }

    pub fn status(&self) -> PresenceStatus {
        self.status
    }

    pub fn is_joined(&self) -> bool {
        self.graph_id.is_some()
    }

    /// Subscribe to the graph's mutation and presence streams and announce presence
    pub async fn join(&mut self, graph_id: &str) -> Result<(), NetworkError> {
        if self.graph_id.as_deref() == Some(graph_id) {
            return Ok(());
        }
        if self.is_joined() {
            self.leave().await?;
        }

        let mutation_feed = self.channel.subscribe(&mutation_topic(graph_id)).await?;
        let presence_feed = self.channel.subscribe(&presence_topic(graph_id)).await?;
        self.channel
            .track_presence(&presence_topic(graph_id), &self.profile)
            .await?;

        self.mutations = Some(mutation_feed);
        self.presence = Some(presence_feed);
        self.graph_id = Some(graph_id.to_string());
        self.state.remote_users.clear();

        tracing::info!("User {} joined graph {}", self.profile.user_id, graph_id);
        Ok(())
    }

    /// Announce departure and detach both subscriptions
    pub async fn leave(&mut self) -> Result<(), NetworkError> {
        let Some(graph_id) = self.graph_id.take() else {
            return Ok(());
        };

        if let Some(feed) = self.mutations.take() {
            feed.unsubscribe();
        }
        if let Some(feed) = self.presence.take() {
            feed.unsubscribe();
        }

        self.state.remote_users.clear();
        self.status = PresenceStatus::Viewing;
        tracing::info!("User {} left graph {}", self.profile.user_id, graph_id);

        self.channel
            .send_presence(&presence_topic(&graph_id), PresenceMessage::left(&self.profile.user_id))
            .await
    }

    /// Broadcast every queued local mutation, in order.
    ///
    /// Returns how many were sent. Mutations that cannot be encoded are
    /// skipped with a warning; a transport failure stops the flush and the
    /// unsent remainder is dropped, since local state is never rolled back.
    pub async fn flush_outbox(&mut self, store: &mut GraphStore) -> Result<usize, NetworkError> {
        let pending = store.take_outbox();
        let Some(graph_id) = self.graph_id.clone() else {
            if !pending.is_empty() {
                tracing::debug!("Not joined; discarding {} local mutations", pending.len());
            }
            return Ok(0);
        };

        let topic = mutation_topic(&graph_id);
        let mut sent = 0;
        for mutation in &pending {
            let message = match MutationMessage::from_mutation(mutation, &self.profile.user_id) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Skipping unencodable {}: {}", mutation.event_type(), e);
                    continue;
                }
            };
            if let Err(e) = self.channel.broadcast(&topic, message).await {
                tracing::error!("Broadcast to {} failed after {} messages: {}", topic, sent, e);
                return Err(e);
            }
            sent += 1;
        }

        if sent > 0 {
            tracing::debug!("Broadcast {} mutations to {}", sent, topic);
        }
        Ok(sent)
    }

    /// Process one inbound event against `store`
    pub fn handle_event(&mut self, store: &mut GraphStore, event: &ChannelEvent) -> InboundOutcome {
        if event.user_id() == self.profile.user_id {
            return InboundOutcome::EchoSuppressed;
        }

        match event {
            ChannelEvent::Mutation(message) => match apply_remote(store, message) {
                Ok(true) => {
                    tracing::debug!(
                        "Applied remote {:?} {:?} {} from {}",
                        message.action,
                        message.entity,
                        message.node_id,
                        message.user_id
                    );
                    InboundOutcome::Applied
                }
                Ok(false) => InboundOutcome::Ignored,
                Err(e) => {
                    tracing::warn!("Dropping remote mutation from {}: {}", message.user_id, e);
                    InboundOutcome::Malformed
                }
            },
            ChannelEvent::Presence(message) => {
                if merge_presence(&mut self.state, message) {
                    InboundOutcome::Applied
                } else {
                    InboundOutcome::Ignored
                }
            }
        }
    }

    /// Wait for the next inbound event on either stream
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        match (self.mutations.as_mut(), self.presence.as_mut()) {
            (Some(mutations), Some(presence)) => {
                tokio::select! {
                    event = mutations.next() => event,
                    event = presence.next() => event,
                }
            }
            (Some(feed), None) | (None, Some(feed)) => feed.next().await,
            (None, None) => None,
        }
    }

    /// Receive and process the next inbound event
    pub async fn poll(&mut self, store: &mut GraphStore) -> Option<InboundOutcome> {
        let event = self.next_event().await?;
        Some(self.handle_event(store, &event))
    }

    /// Claim focus and an advisory lock on `node_id`
    pub async fn begin_interaction(&mut self, node_id: &str) -> Result<(), NetworkError> {
        self.status = PresenceStatus::Editing;
        let message = PresenceMessage::focus(&self.profile.user_id, node_id);
        self.send_presence(message).await
    }

    /// Release focus and the advisory lock on `node_id`
    pub async fn end_interaction(&mut self, node_id: &str) -> Result<(), NetworkError> {
        self.status = PresenceStatus::Viewing;
        let message = PresenceMessage::blur(&self.profile.user_id, node_id);
        self.send_presence(message).await
    }

    /// Report the local cursor.
    ///
    /// Returns `true` if it was broadcast immediately, `false` if it was
    /// coalesced for the next `flush_cursor`.
    pub async fn update_cursor(&mut self, cursor: Position) -> Result<bool, NetworkError> {
        match self.throttle.offer(cursor, Instant::now()) {
            Some(position) => {
                self.send_presence(PresenceMessage::cursor(&self.profile.user_id, position))
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Send the coalesced cursor if the throttle interval has elapsed
    pub async fn flush_cursor(&mut self) -> Result<bool, NetworkError> {
        match self.throttle.flush(Instant::now()) {
            Some(position) => {
                self.send_presence(PresenceMessage::cursor(&self.profile.user_id, position))
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// When `flush_cursor` next has something to send
    pub fn cursor_deadline(&self) -> Option<Instant> {
        self.throttle.next_deadline()
    }

    async fn send_presence(&self, message: PresenceMessage) -> Result<(), NetworkError> {
        let Some(graph_id) = &self.graph_id else {
            return Ok(());
        };
        self.channel
            .send_presence(&presence_topic(graph_id), message)
            .await
            .map_err(|e| {
                tracing::error!("Presence update failed: {}", e);
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::relay::LocalRelay;
    use crate::models::{Node, NodePayload};
    use crate::store::Provenance;

    fn client(relay: &Arc<LocalRelay>, user: &str) -> CollaborationClient<LocalRelay> {
        CollaborationClient::new(
            Arc::clone(relay),
            UserProfile::new(user, user.to_uppercase()),
            &EditorConfig::default(),
        )
    }

    #[test]
    fn test_own_events_are_suppressed() {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = client(&relay, "alice");
        let mut store = GraphStore::default();

        let node = Node::new_with_id("n1", NodePayload::text("x"), Position::ORIGIN);
        let echo = ChannelEvent::Mutation(MutationMessage::create_node(&node, "alice").unwrap());
        assert_eq!(alice.handle_event(&mut store, &echo), InboundOutcome::EchoSuppressed);
        assert_eq!(store.node_count(), 0);

        let presence_echo = ChannelEvent::Presence(PresenceMessage::focus("alice", "n1"));
        assert_eq!(
            alice.handle_event(&mut store, &presence_echo),
            InboundOutcome::EchoSuppressed
        );
        assert!(alice.state().remote_users.is_empty());
    }

    #[test]
    fn test_remote_event_applies_without_history() {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = client(&relay, "alice");
        let mut store = GraphStore::default();

        let node = Node::new_with_id("n1", NodePayload::text("x"), Position::ORIGIN);
        let event = ChannelEvent::Mutation(MutationMessage::create_node(&node, "bob").unwrap());

        assert_eq!(alice.handle_event(&mut store, &event), InboundOutcome::Applied);
        assert_eq!(alice.handle_event(&mut store, &event), InboundOutcome::Ignored);
        assert!(!store.can_undo());
    }

    #[tokio::test]
    async fn test_flush_without_join_discards_outbox() {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = client(&relay, "alice");
        let mut store = GraphStore::default();
        store.add_node(
            Node::new_with_id("n1", NodePayload::text("x"), Position::ORIGIN),
            Provenance::Local,
        );

        assert_eq!(alice.flush_outbox(&mut store).await.unwrap(), 0);
        assert!(store.pending_mutations().is_empty());
    }
}
