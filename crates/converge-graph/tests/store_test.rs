use converge_graph::{Edge, GraphStore, Node, StoreError};

#[tokio::test]
async fn test_create_conversation_links_root() {
    let store = GraphStore::new();
    let conversation = store
        .create_conversation("New Conversation", "You are a helpful AI assistant.")
        .await;

    assert_eq!(conversation.root_node_id, conversation.active_node_id);

    let root = store.get_node(conversation.root_node_id).await.unwrap();
    assert!(root.is_root());
    assert_eq!(root.conversation_id, conversation.id);
    assert_eq!(root.context, "You are a helpful AI assistant.");
    assert_eq!(root.query, None);
    assert_eq!(root.response, None);
}

#[tokio::test]
async fn test_get_conversation_not_found() {
    let store = GraphStore::new();
    let result = store.get_conversation(uuid::Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), StoreError::ConversationNotFound);
}

#[tokio::test]
async fn test_list_conversations_most_recently_updated_first() {
    let store = GraphStore::new();
    let first = store.create_conversation("first", "ctx").await;
    let second = store.create_conversation("second", "ctx").await;

    // Touching the first conversation moves it to the front.
    store
        .select_node(first.id, first.root_node_id)
        .await
        .unwrap();

    let listed = store.list_conversations().await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
}

#[tokio::test]
async fn test_delete_conversation_cascades_and_spares_others() {
    let store = GraphStore::new();
    let doomed = store.create_conversation("doomed", "ctx").await;
    let survivor = store.create_conversation("survivor", "ctx").await;

    let child = store
        .create_node(Node::child(
            doomed.id,
            doomed.root_node_id,
            "ctx",
            "Hi",
            None,
        ))
        .await;
    let edge = store
        .create_edge(Edge::new(doomed.root_node_id, child.id, "Hi"))
        .await;

    assert!(store.delete_conversation(doomed.id).await);

    assert!(store.get_conversation(doomed.id).await.is_err());
    assert!(store.get_node(doomed.root_node_id).await.is_err());
    assert!(store.get_node(child.id).await.is_err());
    assert!(store.get_edge(edge.id).await.is_err());

    // The other conversation is untouched.
    assert!(store.get_conversation(survivor.id).await.is_ok());
    assert!(store.get_node(survivor.root_node_id).await.is_ok());
}

#[tokio::test]
async fn test_delete_conversation_drops_its_turn_lock() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;

    let before = store.turn_lock(conversation.id).await;
    assert!(store.delete_conversation(conversation.id).await);

    // A fresh entry after deletion proves the old one was pruned.
    let after = store.turn_lock(conversation.id).await;
    assert!(!std::sync::Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_delete_conversation_unknown_id_is_noop() {
    let store = GraphStore::new();
    assert!(!store.delete_conversation(uuid::Uuid::new_v4()).await);
}

#[tokio::test]
async fn test_delete_node_removes_subtree_and_incident_edges() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;
    let root_id = conversation.root_node_id;

    // root -> a -> b, root -> c (c is outside the deleted subtree)
    let a = store
        .create_node(Node::child(conversation.id, root_id, "ctx", "a", None))
        .await;
    let b = store
        .create_node(Node::child(conversation.id, a.id, "ctx", "b", None))
        .await;
    let c = store
        .create_node(Node::child(conversation.id, root_id, "ctx", "c", None))
        .await;
    let edge_a = store.create_edge(Edge::new(root_id, a.id, "a")).await;
    let edge_b = store.create_edge(Edge::new(a.id, b.id, "b")).await;
    let edge_c = store.create_edge(Edge::new(root_id, c.id, "c")).await;

    store.delete_node(a.id).await.unwrap();

    assert!(store.get_node(a.id).await.is_err());
    assert!(store.get_node(b.id).await.is_err());
    assert!(store.get_edge(edge_a.id).await.is_err());
    assert!(store.get_edge(edge_b.id).await.is_err());

    // Sibling subtree untouched.
    assert!(store.get_node(c.id).await.is_ok());
    assert!(store.get_edge(edge_c.id).await.is_ok());
    assert!(store.get_node(root_id).await.is_ok());
}

#[tokio::test]
async fn test_delete_root_node_rejected() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;

    let result = store.delete_node(conversation.root_node_id).await;
    assert_eq!(result.unwrap_err(), StoreError::RootDeletion);
    assert!(store.get_node(conversation.root_node_id).await.is_ok());
}

#[tokio::test]
async fn test_delete_node_unknown_id() {
    let store = GraphStore::new();
    let result = store.delete_node(uuid::Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), StoreError::NodeNotFound);
}

#[tokio::test]
async fn test_get_ancestors_follows_parent_links_from_root() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;
    let root_id = conversation.root_node_id;

    let a = store
        .create_node(Node::child(conversation.id, root_id, "ctx", "a", None))
        .await;
    let b = store
        .create_node(Node::child(conversation.id, a.id, "ctx", "b", None))
        .await;

    let path = store.get_ancestors(b.id).await.unwrap();
    let ids: Vec<_> = path.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![root_id, a.id, b.id]);

    // No repeated nodes, strictly parent-linked.
    for pair in path.windows(2) {
        assert_eq!(pair[1].parent_id, Some(pair[0].id));
    }
}

#[tokio::test]
async fn test_get_ancestors_of_root_is_single_entry() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;

    let path = store.get_ancestors(conversation.root_node_id).await.unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].id, conversation.root_node_id);
}

#[tokio::test]
async fn test_get_ancestors_unknown_node() {
    let store = GraphStore::new();
    let result = store.get_ancestors(uuid::Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), StoreError::NodeNotFound);
}

#[tokio::test]
async fn test_get_children() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;
    let root_id = conversation.root_node_id;

    let a = store
        .create_node(Node::child(conversation.id, root_id, "ctx", "a", None))
        .await;
    let b = store
        .create_node(Node::child(conversation.id, root_id, "ctx", "b", None))
        .await;

    let mut children: Vec<_> = store
        .get_children(root_id)
        .await
        .into_iter()
        .map(|n| n.id)
        .collect();
    children.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(children, expected);
}

#[tokio::test]
async fn test_select_node_updates_active() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;
    let child = store
        .create_node(Node::child(
            conversation.id,
            conversation.root_node_id,
            "ctx",
            "q",
            None,
        ))
        .await;

    store.select_node(conversation.id, child.id).await.unwrap();

    let refreshed = store.get_conversation(conversation.id).await.unwrap();
    assert_eq!(refreshed.active_node_id, child.id);
    assert!(refreshed.updated_at >= conversation.updated_at);
}

#[tokio::test]
async fn test_select_node_from_another_conversation_rejected() {
    let store = GraphStore::new();
    let one = store.create_conversation("one", "ctx").await;
    let two = store.create_conversation("two", "ctx").await;

    let result = store.select_node(one.id, two.root_node_id).await;
    assert_eq!(result.unwrap_err(), StoreError::ForeignNode);

    let refreshed = store.get_conversation(one.id).await.unwrap();
    assert_eq!(refreshed.active_node_id, one.root_node_id);
}

#[tokio::test]
async fn test_finalize_node_writes_response_and_metadata() {
    let store = GraphStore::new();
    let conversation = store.create_conversation("t", "ctx").await;
    let child = store
        .create_node(Node::child(
            conversation.id,
            conversation.root_node_id,
            "ctx",
            "q",
            None,
        ))
        .await;

    store
        .finalize_node(child.id, "Hello".to_string(), "some/model".to_string(), 42)
        .await
        .unwrap();

    let node = store.get_node(child.id).await.unwrap();
    assert_eq!(node.response.as_deref(), Some("Hello"));
    assert_eq!(node.model.as_deref(), Some("some/model"));
    assert_eq!(node.latency_ms, Some(42));
}

#[tokio::test]
async fn test_conversation_views_are_filtered() {
    let store = GraphStore::new();
    let one = store.create_conversation("one", "ctx").await;
    let two = store.create_conversation("two", "ctx").await;

    let child = store
        .create_node(Node::child(one.id, one.root_node_id, "ctx", "q", None))
        .await;
    store
        .create_edge(Edge::new(one.root_node_id, child.id, "q"))
        .await;

    assert_eq!(store.get_conversation_nodes(one.id).await.len(), 2);
    assert_eq!(store.get_conversation_edges(one.id).await.len(), 1);
    assert_eq!(store.get_conversation_nodes(two.id).await.len(), 1);
    assert_eq!(store.get_conversation_edges(two.id).await.len(), 0);
}
