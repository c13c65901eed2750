//! Collaboration Client
//!
//! Keeps several editors of one graph loosely in sync. The model is advisory and
//! last-event-wins:
//!
//! - Local mutations leave the store's outbox as `MutationMessage`s
//! - Inbound events whose `user_id` is the local user are dropped unprocessed
//! - Remote mutations are applied through `Provenance::Remote`, so they never
//!   touch undo/redo and are never re-broadcast
//! - Locks and focus are presence hints; nothing is enforced
//!
//! Transport is abstracted behind `RealtimeChannel`; `LocalRelay` implements it
//! in-process over `tokio::sync::broadcast`.

mod channel;
mod client;
mod messages;
mod presence;
mod relay;
mod remote;
mod throttle;

pub use channel::{RealtimeChannel, Subscription};
pub use client::{CollaborationClient, InboundOutcome};
pub use messages::{
    mutation_topic, presence_topic, ChannelEvent, MutationAction, MutationEntity, MutationMessage,
    PresenceMessage, GRAPH_ENTITY_ID,
};
pub use presence::merge_presence;
pub use relay::LocalRelay;
pub use remote::{apply_remote, RemoteApplyError};
pub use throttle::CursorThrottle;
