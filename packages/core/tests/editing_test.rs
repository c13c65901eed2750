//! Editing Tests
//!
//! End-to-end behavior of the editor session: undo law, grouping round trips,
//! theme application and layout determinism.

#[cfg(test)]
mod editing_tests {
    use nodecanvas_core::layout::{layout, LayoutKind};
    use nodecanvas_core::models::{Edge, Node, NodePatch, NodePayload, Position};
    use nodecanvas_core::theme::Theme;
    use nodecanvas_core::{EditorConfig, EditorSession, GraphStore, Provenance};

    fn text(id: &str, x: f64, y: f64) -> Node {
        Node::new_with_id(id, NodePayload::text(id), Position::new(x, y))
    }

    fn seeded_session() -> EditorSession {
        let mut session = EditorSession::default();
        let store = session.store_mut();
        store.add_node(text("a", 0.0, 0.0), Provenance::Remote);
        store.add_node(text("b", 300.0, 0.0), Provenance::Remote);
        store.add_node(text("c", 600.0, 0.0), Provenance::Remote);
        store.add_edge(Edge::new_with_id("ab", "a", "b"), Provenance::Remote);
        store.add_edge(Edge::new_with_id("bc", "b", "c"), Provenance::Remote);
        session
    }

    #[test]
    fn test_undo_law_returns_to_initial_state() {
        let mut store = GraphStore::new(100);
        let initial = store.snapshot();

        store.add_node(text("a", 0.0, 0.0), Provenance::Local);
        store.add_node(text("b", 10.0, 0.0), Provenance::Local);
        store.add_edge(Edge::new_with_id("ab", "a", "b"), Provenance::Local);
        store.update_node(
            "a",
            &NodePatch::new().with_position(Position::new(5.0, 5.0)),
            Provenance::Local,
        );
        store.remove_node("b", Provenance::Local);
        store.set_title("Plan", Provenance::Local);
        let edited = store.snapshot();

        let mut steps = 0;
        while store.undo() {
            steps += 1;
        }
        assert_eq!(steps, 6);
        assert_eq!(store.snapshot(), initial);

        while store.redo() {}
        assert_eq!(store.snapshot(), edited);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut store = GraphStore::default();
        store.add_node(text("a", 0.0, 0.0), Provenance::Local);
        store.undo();
        assert!(store.can_redo());

        store.add_node(text("b", 0.0, 0.0), Provenance::Local);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_capacity_evicts_oldest() {
        let mut store = GraphStore::new(2);
        for id in ["a", "b", "c"] {
            store.add_node(text(id, 0.0, 0.0), Provenance::Local);
        }
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_group_then_ungroup_restores_positions() {
        let mut session = seeded_session();
        session.select(["a", "b"]);

        let group_id = session.group_selection().unwrap();
        let group = session.store().node(&group_id).unwrap().clone();
        assert_eq!(group.position, Position::new(-24.0, -24.0));
        assert_eq!(group.effective_size().width, 548.0);
        assert_eq!(
            session.store().absolute_position("b"),
            Some(Position::new(300.0, 0.0))
        );

        session.ungroup_selection().unwrap();
        assert!(session.store().node(&group_id).is_none());
        assert_eq!(session.store().node("b").unwrap().position, Position::new(300.0, 0.0));
        assert_eq!(session.store().node("b").unwrap().parent_id, None);
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut session = seeded_session();
        session.select(["a"]);
        let group_id = session.group_selection().unwrap();

        assert!(session.reparent(&group_id, Some("a")).is_err());
        assert!(session.reparent("c", Some(group_id.as_str())).is_ok());
        assert_eq!(
            session.store().absolute_position("c"),
            Some(Position::new(600.0, 0.0))
        );
    }

    #[test]
    fn test_theme_is_one_undo_step() {
        let mut session = seeded_session();
        let before = session.store().snapshot();
        let theme = Theme::dark();

        assert!(session.apply_theme(theme.clone()));
        assert_eq!(session.store().history().undo_len(), 1);
        assert_eq!(session.store().node_count(), 3);
        assert_eq!(session.store().edge_count(), 2);
        assert!(session.store().nodes().all(|node| node.style == theme.node_style));
        assert!(session.store().edges().all(|edge| edge.style == theme.edge_style));

        assert!(session.undo());
        assert!(session.store().nodes().all(|node| node.style.is_empty()));
        assert!(session.store().edges().all(|edge| edge.style.is_empty()));
        assert_eq!(session.store().snapshot(), before);
        assert!(!session.store().can_undo());
    }

    #[test]
    fn test_ungroup_with_group_and_members_selected() {
        let mut session = EditorSession::default();
        session.store_mut().add_node(text("a", 0.0, 0.0), Provenance::Remote);
        session.store_mut().add_node(text("b", 100.0, 0.0), Provenance::Remote);
        session.select(["a", "b"]);
        let group_id = session.group_selection().unwrap();

        session.select([group_id.as_str(), "a", "b"]);
        session.ungroup_selection().unwrap();

        assert!(session.store().node(&group_id).is_none());
        assert_eq!(session.store().node("a").unwrap().position, Position::new(0.0, 0.0));
        assert_eq!(session.store().node("b").unwrap().position, Position::new(100.0, 0.0));
    }

    #[test]
    fn test_layouts_are_deterministic() {
        let session = seeded_session();
        let snapshot = session.store().snapshot();
        let config = EditorConfig::default().layout;

        for kind in LayoutKind::ALL {
            let first = layout(kind, &snapshot.nodes, &snapshot.edges, &config);
            let second = layout(kind, &snapshot.nodes, &snapshot.edges, &config);
            assert_eq!(first, second, "{} layout changed between runs", kind);
            assert_eq!(first.len(), snapshot.nodes.len());
        }
    }

    #[test]
    fn test_apply_layout_is_single_step() {
        let mut session = seeded_session();
        assert!(session.apply_layout(LayoutKind::Grid));

        let positions: Vec<Position> = session.store().nodes().map(|node| node.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0.0, 0.0),
                Position::new(250.0, 0.0),
                Position::new(0.0, 180.0),
            ]
        );
        assert_eq!(session.store().history().undo_len(), 1);
        assert!(session.store().pending_mutations().is_empty());
    }
}
