//! In-process realtime channel.
//!
//! Every topic is a `tokio::sync::broadcast` channel created on first use.
//! Clones share the same topics, so several clients built from clones of one
//! relay see each other's traffic.

use crate::collab::channel::{RealtimeChannel, Subscription};
use crate::collab::messages::{ChannelEvent, MutationMessage, PresenceMessage};
use crate::error::NetworkError;
use crate::models::{UserId, UserProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

const DEFAULT_TOPIC_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct RelayState {
    topics: HashMap<String, broadcast::Sender<ChannelEvent>>,
    present: HashMap<String, HashMap<UserId, UserProfile>>,
}

#[derive(Debug, Clone)]
pub struct LocalRelay {
    state: Arc<Mutex<RelayState>>,
    capacity: usize,
}

impl Default for LocalRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TOPIC_CAPACITY)
    }

    /// `capacity` bounds how far a slow subscriber may lag before events are skipped
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState::default())),
            capacity: capacity.max(1),
        }
    }

    /// Profiles currently tracked on `topic`, sorted by user id
    pub async fn present_users(&self, topic: &str) -> Vec<UserProfile> {
        let state = self.state.lock().await;
        let mut users: Vec<UserProfile> = state
            .present
            .get(topic)
            .map(|users| users.values().cloned().collect())
            .unwrap_or_default();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users
    }

    async fn publish(&self, topic: &str, event: ChannelEvent) {
        let sender = self.sender(topic).await;
        if sender.send(event).is_err() {
            tracing::debug!("No subscribers on {}", topic);
        }
    }

    async fn sender(&self, topic: &str) -> broadcast::Sender<ChannelEvent> {
        let mut state = self.state.lock().await;
        state
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[async_trait]
impl RealtimeChannel for LocalRelay {
    async fn track_presence(&self, topic: &str, profile: &UserProfile) -> Result<(), NetworkError> {
        {
            let mut state = self.state.lock().await;
            state
                .present
                .entry(topic.to_string())
                .or_default()
                .insert(profile.user_id.clone(), profile.clone());
        }
        self.publish(topic, ChannelEvent::Presence(PresenceMessage::joined(profile)))
            .await;
        Ok(())
    }

    async fn send_presence(&self, topic: &str, message: PresenceMessage) -> Result<(), NetworkError> {
        if message.left {
            let mut state = self.state.lock().await;
            if let Some(users) = state.present.get_mut(topic) {
                users.remove(&message.user_id);
            }
        }
        self.publish(topic, ChannelEvent::Presence(message)).await;
        Ok(())
    }

    async fn broadcast(&self, topic: &str, message: MutationMessage) -> Result<(), NetworkError> {
        self.publish(topic, ChannelEvent::Mutation(message)).await;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, NetworkError> {
        let receiver = self.sender(topic).await.subscribe();
        tracing::debug!("Subscribed to {}", topic);
        Ok(Subscription::from_broadcast(topic, receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        let relay = LocalRelay::new();
        let mut first = relay.subscribe("t").await.unwrap();
        let mut second = relay.clone().subscribe("t").await.unwrap();

        relay
            .broadcast("t", MutationMessage::delete_node("n1", "alice"))
            .await
            .unwrap();

        for subscription in [&mut first, &mut second] {
            let event = timeout(Duration::from_millis(100), subscription.next())
                .await
                .expect("Timeout waiting for event")
                .expect("Channel closed");
            assert_eq!(event.user_id(), "alice");
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let relay = LocalRelay::new();
        let mut other = relay.subscribe("other").await.unwrap();

        relay
            .broadcast("t", MutationMessage::delete_node("n1", "alice"))
            .await
            .unwrap();

        let result = timeout(Duration::from_millis(50), other.next()).await;
        assert!(result.is_err(), "event leaked across topics");
    }

    #[tokio::test]
    async fn test_presence_tracking_and_leave() {
        let relay = LocalRelay::new();
        let alice = UserProfile::new("alice", "Alice");
        relay.track_presence("p", &alice).await.unwrap();
        relay.track_presence("p", &UserProfile::new("bob", "Bob")).await.unwrap();

        assert_eq!(relay.present_users("p").await.len(), 2);

        relay.send_presence("p", PresenceMessage::left("bob")).await.unwrap();
        assert_eq!(relay.present_users("p").await, vec![alice]);
    }
}
