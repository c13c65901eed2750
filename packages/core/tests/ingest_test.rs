//! Ingestion Tests
//!
//! Meeting-note import and suggestion acceptance against a live store.

#[cfg(test)]
mod ingest_tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use nodecanvas_core::config::LayoutConfig;
    use nodecanvas_core::ingest::{
        apply_fragment, find_node_by_label, import_notes, ingest_suggestions, IngestOutcome, Note,
        SuggestedConcept, SuggestedConnection, SuggestionSource,
    };
    use nodecanvas_core::models::{Node, NodeKind, NodePayload, Position, Snapshot};
    use nodecanvas_core::{GraphStore, NetworkError, Provenance};
    use std::collections::HashSet;

    struct FixedSuggestions;

    #[async_trait]
    impl SuggestionSource for FixedSuggestions {
        async fn fetch_concepts(&self, _graph: &Snapshot) -> Result<Vec<SuggestedConcept>, NetworkError> {
            Ok(vec![SuggestedConcept::new("Hiring plan")])
        }

        async fn fetch_connections(&self, _graph: &Snapshot) -> Result<Vec<SuggestedConnection>, NetworkError> {
            Ok(vec![
                SuggestedConnection::new("budget", "hiring"),
                SuggestedConnection::new("budget", "nothing like this"),
            ])
        }
    }

    fn standup() -> Note {
        Note::new("standup", "Daily standup")
            .with_summary("Release slipped a day")
            .with_takeaway("QA needs another pass")
            .with_action_item("Book the retro")
    }

    #[test]
    fn test_repeated_import_keeps_ids_unique() {
        let mut store = GraphStore::default();
        let config = LayoutConfig::default();

        for _ in 0..3 {
            let fragment = import_notes(&[standup()], &store.snapshot(), &config);
            assert!(apply_fragment(&mut store, fragment));
        }

        let ids: HashSet<String> = store.nodes().map(|node| node.id.clone()).collect();
        assert_eq!(ids.len(), 9);
        assert!(ids.contains("note-standup-summary-2"));
        assert_eq!(store.edge_count(), 6);
        assert_eq!(store.history().undo_len(), 3);
    }

    #[test]
    fn test_import_lands_below_existing_graph() {
        let mut store = GraphStore::default();
        store.add_node(
            Node::new_with_id("n1", NodePayload::text("Existing"), Position::new(50.0, 0.0)),
            Provenance::Remote,
        );

        let config = LayoutConfig::default();
        let fragment = import_notes(&[standup()], &store.snapshot(), &config);
        let summary = &fragment.nodes[0];
        assert_eq!(summary.position, Position::new(50.0, 100.0 + config.grid_spacing_y));

        let action = fragment
            .nodes
            .iter()
            .find(|node| node.id == "note-standup-action-0")
            .unwrap();
        assert_eq!(action.kind(), NodeKind::Checklist);
    }

    #[test]
    fn test_markdown_note_sections() {
        let note = Note::from_markdown(
            "retro",
            "# Sprint retro\n\n## Summary\nShipped on time\n\n## Key takeaways\n- Pairing helped\n\n## Action items\n- [ ] Automate deploys\n",
        );
        assert_eq!(note.title, "Sprint retro");
        assert_eq!(note.takeaways, vec!["Pairing helped".to_string()]);
        assert_eq!(note.action_items, vec!["Automate deploys".to_string()]);
    }

    #[test]
    fn test_label_match_prefers_graph_order() {
        let nodes = vec![
            Node::new_with_id("x", NodePayload::text("Q3 Budget review"), Position::ORIGIN),
            Node::new_with_id("y", NodePayload::text("Budget"), Position::ORIGIN),
        ];
        assert_eq!(find_node_by_label(&nodes, "BUDGET").map(|n| n.id.as_str()), Some("x"));
        assert!(find_node_by_label(&nodes, "   ").is_none());
    }

    #[tokio::test]
    async fn test_ingest_suggestions_links_new_concept() -> Result<()> {
        let mut store = GraphStore::default();
        store.add_node(
            Node::new_with_id("b", NodePayload::text("Budget"), Position::ORIGIN),
            Provenance::Remote,
        );

        let outcomes = ingest_suggestions(&FixedSuggestions, &mut store).await?;
        assert_eq!(outcomes.len(), 3);

        let IngestOutcome::NodeAdded { node_id } = &outcomes[0] else {
            panic!("expected a node");
        };
        match &outcomes[1] {
            IngestOutcome::EdgeAdded { source_id, target_id, .. } => {
                assert_eq!(source_id, "b");
                assert_eq!(target_id, node_id);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(outcomes[2], IngestOutcome::NoMatch);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);

        assert_eq!(store.history().undo_len(), 1);
        assert!(store.undo());
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
        Ok(())
    }
}
