use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{Conversation, Edge, Node};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found")]
    ConversationNotFound,
    #[error("Node not found")]
    NodeNotFound,
    #[error("Edge not found")]
    EdgeNotFound,
    #[error("Cannot delete root node. Delete the conversation instead.")]
    RootDeletion,
    #[error("Node does not belong to this conversation")]
    ForeignNode,
}

#[derive(Default)]
struct StoreInner {
    conversations: HashMap<Uuid, Conversation>,
    nodes: HashMap<Uuid, Node>,
    edges: HashMap<Uuid, Edge>,
}

/// In-memory store for all conversations, nodes, and edges.
///
/// Data is lost when the process exits. Reads clone entities out; mutations
/// take the write lock for the full operation, so cascading deletes are
/// atomic from the caller's point of view.
pub struct GraphStore {
    inner: RwLock<StoreInner>,
    turn_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Per-conversation lock serializing the branch mutation sequence
    /// (resolve parent, create node/edge, reassign active node). Token relay
    /// must not run under this lock.
    pub async fn turn_lock(&self, conversation_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        Arc::clone(locks.entry(conversation_id).or_default())
    }

    // Conversation operations

    /// Atomically create a conversation together with its root node.
    pub async fn create_conversation(
        &self,
        title: impl Into<String>,
        initial_context: impl Into<String>,
    ) -> Conversation {
        let conversation_id = Uuid::new_v4();
        let root = Node::root(conversation_id, initial_context);
        let now = Utc::now();
        let conversation = Conversation {
            id: conversation_id,
            title: title.into(),
            root_node_id: root.id,
            active_node_id: root.id,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.nodes.insert(root.id, root);
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        conversation
    }

    pub async fn get_conversation(&self, id: Uuid) -> Result<Conversation, StoreError> {
        self.inner
            .read()
            .await
            .conversations
            .get(&id)
            .cloned()
            .ok_or(StoreError::ConversationNotFound)
    }

    /// All conversations, most recently updated first.
    pub async fn list_conversations(&self) -> Vec<Conversation> {
        let inner = self.inner.read().await;
        let mut conversations: Vec<_> = inner.conversations.values().cloned().collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations
    }

    /// Delete a conversation and every node/edge belonging to it. Returns
    /// `false` for an unknown id instead of raising.
    pub async fn delete_conversation(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.conversations.contains_key(&id) {
            return false;
        }

        let node_ids: Vec<Uuid> = inner
            .nodes
            .values()
            .filter(|n| n.conversation_id == id)
            .map(|n| n.id)
            .collect();
        for node_id in &node_ids {
            inner.nodes.remove(node_id);
        }
        inner.edges.retain(|_, e| {
            !node_ids.contains(&e.source_node_id) && !node_ids.contains(&e.target_node_id)
        });
        inner.conversations.remove(&id);
        drop(inner);

        // The lock entry dies with the conversation, otherwise the map grows
        // for every conversation ever created.
        self.turn_locks.lock().await.remove(&id);

        tracing::debug!(conversation_id = %id, nodes = node_ids.len(), "deleted conversation");
        true
    }

    /// Reassign the conversation's active node after validating that the
    /// node exists and belongs to the conversation.
    pub async fn select_node(
        &self,
        conversation_id: Uuid,
        node_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::ConversationNotFound);
        }
        let node = inner.nodes.get(&node_id).ok_or(StoreError::NodeNotFound)?;
        if node.conversation_id != conversation_id {
            return Err(StoreError::ForeignNode);
        }

        let conversation = inner
            .conversations
            .get_mut(&conversation_id)
            .ok_or(StoreError::ConversationNotFound)?;
        conversation.active_node_id = node_id;
        conversation.updated_at = Utc::now();
        Ok(())
    }

    // Node operations

    pub async fn create_node(&self, node: Node) -> Node {
        let mut inner = self.inner.write().await;
        inner.nodes.insert(node.id, node.clone());
        node
    }

    pub async fn get_node(&self, id: Uuid) -> Result<Node, StoreError> {
        self.inner
            .read()
            .await
            .nodes
            .get(&id)
            .cloned()
            .ok_or(StoreError::NodeNotFound)
    }

    /// Delete a node and all of its descendants, plus every edge touching a
    /// removed node. Root nodes are only deletable via conversation deletion.
    pub async fn delete_node(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let node = inner.nodes.get(&id).ok_or(StoreError::NodeNotFound)?;
        if node.parent_id.is_none() {
            return Err(StoreError::RootDeletion);
        }

        // Iterative collection over the parent->children adjacency; an
        // explicit work stack keeps deep trees off the call stack.
        let mut removed = vec![id];
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let children: Vec<Uuid> = inner
                .nodes
                .values()
                .filter(|n| n.parent_id == Some(current))
                .map(|n| n.id)
                .collect();
            removed.extend(&children);
            pending.extend(children);
        }

        for node_id in &removed {
            inner.nodes.remove(node_id);
        }
        inner.edges.retain(|_, e| {
            !removed.contains(&e.source_node_id) && !removed.contains(&e.target_node_id)
        });

        tracing::debug!(node_id = %id, removed = removed.len(), "deleted node subtree");
        Ok(())
    }

    /// Direct children of a node, in no particular order.
    pub async fn get_children(&self, id: Uuid) -> Vec<Node> {
        self.inner
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.parent_id == Some(id))
            .cloned()
            .collect()
    }

    /// Path from the conversation root to the given node, inclusive.
    /// Cost is proportional to the node's depth.
    pub async fn get_ancestors(&self, id: Uuid) -> Result<Vec<Node>, StoreError> {
        let inner = self.inner.read().await;
        let mut current = inner.nodes.get(&id).ok_or(StoreError::NodeNotFound)?;

        let mut path = Vec::new();
        loop {
            path.insert(0, current.clone());
            match current.parent_id {
                Some(parent_id) => match inner.nodes.get(&parent_id) {
                    Some(parent) => current = parent,
                    None => break,
                },
                None => break,
            }
        }
        Ok(path)
    }

    /// Write the streamed response and metadata back onto a node.
    pub async fn finalize_node(
        &self,
        id: Uuid,
        response: String,
        model: String,
        latency_ms: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let node = inner.nodes.get_mut(&id).ok_or(StoreError::NodeNotFound)?;
        node.response = Some(response);
        node.model = Some(model);
        node.latency_ms = Some(latency_ms);
        Ok(())
    }

    // Edge operations

    pub async fn create_edge(&self, edge: Edge) -> Edge {
        let mut inner = self.inner.write().await;
        inner.edges.insert(edge.id, edge.clone());
        edge
    }

    pub async fn get_edge(&self, id: Uuid) -> Result<Edge, StoreError> {
        self.inner
            .read()
            .await
            .edges
            .get(&id)
            .cloned()
            .ok_or(StoreError::EdgeNotFound)
    }

    /// All nodes belonging to a conversation.
    pub async fn get_conversation_nodes(&self, conversation_id: Uuid) -> Vec<Node> {
        self.inner
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    /// All edges whose source node belongs to the conversation. Edges never
    /// cross conversations, so filtering on the source side is sufficient.
    pub async fn get_conversation_edges(&self, conversation_id: Uuid) -> Vec<Edge> {
        let inner = self.inner.read().await;
        let node_ids: Vec<Uuid> = inner
            .nodes
            .values()
            .filter(|n| n.conversation_id == conversation_id)
            .map(|n| n.id)
            .collect();
        inner
            .edges
            .values()
            .filter(|e| node_ids.contains(&e.source_node_id))
            .cloned()
            .collect()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
