//! NodeCanvas Core
//!
//! This crate provides the editing core of the NodeCanvas collaborative graph
//! editor: the authoritative graph store, undo/redo, realtime synchronization,
//! grouping, automatic layout, note and suggestion ingestion, persistence, and
//! export.
//!
//! # Architecture
//!
//! - **Single owner**: `GraphStore` owns every node and edge; views read
//!   snapshots and mutate only through its operations
//! - **Provenance**: local mutations are recorded for undo and queued for
//!   broadcast, remote ones are applied silently
//! - **Pluggable edges**: the realtime channel, persistence service and
//!   suggestion source are traits, with in-memory implementations for tests
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Edge, Snapshot, presence)
//! - [`store`] - Graph store and mutation outbox
//! - [`history`] - Bounded undo/redo stacks
//! - [`collab`] - Realtime channel, wire messages and the collaboration client
//! - [`grouping`] - Group, ungroup and reparent
//! - [`layout`] - Grid, circular, tree, hierarchical and force layouts
//! - [`ingest`] - Meeting-note import and suggested concepts
//! - [`persistence`] - Graph load/save service and session wrapper
//! - [`export`] - JSON, SVG and PNG export
//! - [`session`] - Editor session tying selection, clipboard and commands together

pub mod collab;
pub mod config;
pub mod error;
pub mod export;
pub mod grouping;
pub mod history;
pub mod ingest;
pub mod keymap;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod session;
pub mod store;
pub mod theme;

// Re-export commonly used types
pub use config::EditorConfig;
pub use error::{CanvasError, NetworkError, RenderExportError, Result, ValidationError};
pub use models::*;
pub use session::{DispatchOutcome, EditorSession};
pub use store::{GraphMutation, GraphStore, Provenance};
