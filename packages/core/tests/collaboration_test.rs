//! Collaboration Tests
//!
//! Two editors joined to the same graph over an in-process relay. Verifies
//! that local mutations converge on the peer, echoes are dropped, and remote
//! application is idempotent and never enters the undo history.

#[cfg(test)]
mod collaboration_tests {
    use anyhow::Result;
    use nodecanvas_core::collab::{
        apply_remote, CollaborationClient, InboundOutcome, LocalRelay, MutationMessage, RealtimeChannel,
    };
    use nodecanvas_core::models::{Node, NodePatch, NodePayload, Position, StyleRecord, UserProfile};
    use nodecanvas_core::{EditorConfig, GraphStore, Provenance};
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    const GRAPH: &str = "g1";

    async fn join(relay: &Arc<LocalRelay>, user: &str) -> Result<CollaborationClient<LocalRelay>> {
        let mut client = CollaborationClient::new(
            relay.clone(),
            UserProfile::new(user, user.to_uppercase()),
            &EditorConfig::default(),
        );
        client.join(GRAPH).await?;
        Ok(client)
    }

    /// Poll until `done` holds for the store, failing after one second
    async fn poll_until<F>(
        client: &mut CollaborationClient<LocalRelay>,
        store: &mut GraphStore,
        done: F,
    ) -> Result<Vec<InboundOutcome>>
    where
        F: Fn(&GraphStore) -> bool,
    {
        let mut outcomes = Vec::new();
        while !done(store) {
            let outcome = timeout(Duration::from_secs(1), client.poll(store))
                .await?
                .ok_or_else(|| anyhow::anyhow!("stream closed"))?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    #[tokio::test]
    async fn test_local_mutations_reach_peer() -> Result<()> {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = join(&relay, "alice").await?;
        let mut bob = join(&relay, "bob").await?;
        let mut alice_store = GraphStore::default();
        let mut bob_store = GraphStore::default();

        alice_store.add_node(
            Node::new_with_id("n1", NodePayload::text("Budget"), Position::new(0.0, 0.0)),
            Provenance::Local,
        );
        alice_store.update_node(
            "n1",
            &NodePatch::new().with_position(Position::new(40.0, 60.0)),
            Provenance::Local,
        );
        assert_eq!(alice.flush_outbox(&mut alice_store).await?, 2);

        poll_until(&mut bob, &mut bob_store, |store| {
            store.node("n1").map(|node| node.position) == Some(Position::new(40.0, 60.0))
        })
        .await?;

        assert_eq!(bob_store.node("n1").unwrap().label(), "Budget");
        assert!(!bob_store.can_undo());
        assert!(bob_store.pending_mutations().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_undone_style_converges_on_peer() -> Result<()> {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = join(&relay, "alice").await?;
        let mut bob = join(&relay, "bob").await?;
        let mut alice_store = GraphStore::default();
        let mut bob_store = GraphStore::default();

        alice_store.add_node(
            Node::new_with_id("n1", NodePayload::text("Plain"), Position::ORIGIN),
            Provenance::Local,
        );
        alice_store.update_node(
            "n1",
            &NodePatch::new().with_style(StyleRecord::default().with_color("#f00")),
            Provenance::Local,
        );
        alice.flush_outbox(&mut alice_store).await?;
        poll_until(&mut bob, &mut bob_store, |store| {
            store.node("n1").and_then(|node| node.style.color.as_deref()) == Some("#f00")
        })
        .await?;

        assert!(alice_store.undo());
        alice.flush_outbox(&mut alice_store).await?;
        poll_until(&mut bob, &mut bob_store, |store| {
            store.node("n1").is_some_and(|node| node.style.color.is_none())
        })
        .await?;

        assert_eq!(bob_store.node("n1"), alice_store.node("n1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_own_broadcasts_are_suppressed() -> Result<()> {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = join(&relay, "alice").await?;
        let mut store = GraphStore::default();

        store.add_node(
            Node::new_with_id("n1", NodePayload::text("Mine"), Position::ORIGIN),
            Provenance::Local,
        );
        alice.flush_outbox(&mut store).await?;

        // The joined announcement comes first, then the mutation echo
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let outcome = timeout(Duration::from_secs(1), alice.poll(&mut store)).await?;
            outcomes.push(outcome);
        }
        assert_eq!(
            outcomes,
            vec![Some(InboundOutcome::EchoSuppressed), Some(InboundOutcome::EchoSuppressed)]
        );
        assert_eq!(store.history().undo_len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_presence_tracks_peer_lock() -> Result<()> {
        let relay = Arc::new(LocalRelay::new());
        let mut alice = join(&relay, "alice").await?;
        let mut bob = join(&relay, "bob").await?;
        let mut store = GraphStore::default();

        bob.begin_interaction("n1").await?;

        timeout(Duration::from_secs(1), async {
            while !alice.state().is_locked_by_other("n1") {
                alice.poll(&mut store).await;
            }
        })
        .await?;
        assert_eq!(alice.state().remote_users["bob"].name, "BOB");

        bob.leave().await?;
        timeout(Duration::from_secs(1), async {
            while alice.state().remote_users.contains_key("bob") {
                alice.poll(&mut store).await;
            }
        })
        .await?;
        assert!(!alice.state().is_locked_by_other("n1"));
        assert_eq!(relay.present_users(&format!("graph:{}:presence", GRAPH)).await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_create_is_idempotent() -> Result<()> {
        let mut store = GraphStore::default();
        let node = Node::new_with_id("n1", NodePayload::text("Once"), Position::ORIGIN);
        let message = MutationMessage::create_node(&node, "bob")?;

        assert!(apply_remote(&mut store, &message)?);
        assert!(!apply_remote(&mut store, &message)?);
        assert_eq!(store.node_count(), 1);

        let delete = MutationMessage::delete_node("n1", "bob");
        assert!(apply_remote(&mut store, &delete)?);
        assert!(!apply_remote(&mut store, &delete)?);
        assert!(!store.can_undo());
        Ok(())
    }

    #[tokio::test]
    async fn test_flush_before_join_discards() -> Result<()> {
        let relay = Arc::new(LocalRelay::new());
        let mut observer = relay.subscribe(&format!("graph:{}:mutations", GRAPH)).await?;
        let mut alice = CollaborationClient::new(
            relay.clone(),
            UserProfile::new("alice", "Alice"),
            &EditorConfig::default(),
        );
        let mut store = GraphStore::default();
        store.set_title("Draft", Provenance::Local);

        assert_eq!(alice.flush_outbox(&mut store).await?, 0);
        assert!(store.pending_mutations().is_empty());
        assert!(timeout(Duration::from_millis(50), observer.next()).await.is_err());
        Ok(())
    }
}
