use crate::collab::messages::{ChannelEvent, MutationMessage, PresenceMessage};
use crate::error::NetworkError;
use crate::models::UserProfile;
use async_trait::async_trait;
use std::fmt;
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// Realtime transport used by the collaboration client.
///
/// Implementations deliver every published event to every subscriber of the
/// topic, including the publisher; echo suppression happens in the client.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Announce `profile` as present on `topic`
    async fn track_presence(&self, topic: &str, profile: &UserProfile) -> Result<(), NetworkError>;

    async fn send_presence(&self, topic: &str, message: PresenceMessage) -> Result<(), NetworkError>;

    async fn broadcast(&self, topic: &str, message: MutationMessage) -> Result<(), NetworkError>;

    async fn subscribe(&self, topic: &str) -> Result<Subscription, NetworkError>;
}

/// A live feed of events for one topic.
///
/// Dropping the subscription detaches it; `unsubscribe` does the same
/// explicitly.
pub struct Subscription {
    topic: String,
    stream: Pin<Box<dyn Stream<Item = ChannelEvent> + Send>>,
}

impl Subscription {
    pub fn new<S>(topic: impl Into<String>, stream: S) -> Self
    where
        S: Stream<Item = ChannelEvent> + Send + 'static,
    {
        Self {
            topic: topic.into(),
            stream: Box::pin(stream),
        }
    }

    /// Wrap a broadcast receiver, skipping over lag gaps
    pub fn from_broadcast(topic: impl Into<String>, receiver: broadcast::Receiver<ChannelEvent>) -> Self {
        let topic = topic.into();
        let label = topic.clone();
        let stream = BroadcastStream::new(receiver).filter_map(move |result| match result {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!("Subscription to {} lagged by {} events", label, n);
                None
            }
        });
        Self::new(topic, stream)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next event, or `None` once the channel is closed
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.stream.next().await
    }

    pub fn unsubscribe(self) {
        tracing::debug!("Unsubscribed from {}", self.topic);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
