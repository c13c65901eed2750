//! Import / Suggestion Ingestor
//!
//! Turns bulk content into graph fragments:
//!
//! - **Notes**: each imported note becomes a summary node with satellites for
//!   its takeaways and action items, laid out on a deterministic grid below the
//!   existing graph
//! - **Suggestions**: accepted AI concepts become single nodes; accepted
//!   connections are resolved against node labels by fuzzy matching
//!
//! Every imported fragment and every `ingest_suggestions` batch is one undo
//! step; accepting a single concept or connection is one step of its own.

mod notes;
mod suggestions;

pub use notes::{import_notes, GraphFragment, Note, NoteItemKind};
pub use suggestions::{
    accept_suggested_concept, accept_suggested_connection, find_node_by_label, ingest_suggestions,
    IngestOutcome, SuggestedConcept, SuggestedConnection, SuggestionSource,
};

use crate::store::{GraphStore, Provenance};

/// Append `fragment` to the store as one local, undoable mutation
pub fn apply_fragment(store: &mut GraphStore, fragment: GraphFragment) -> bool {
    if fragment.is_empty() {
        return false;
    }

    let snapshot = store.snapshot();
    let mut nodes = snapshot.nodes;
    let mut edges = snapshot.edges;
    let added = fragment.nodes.len();
    nodes.extend(fragment.nodes);
    edges.extend(fragment.edges);

    let changed = store.replace_all(nodes, edges, Provenance::Local);
    tracing::info!("Imported fragment with {} nodes", added);
    changed
}
