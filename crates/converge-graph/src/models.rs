use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the conversation graph.
///
/// Each node carries the full materialized prompt context that produced it,
/// the user query that created it (absent for the root), and the model
/// response once streaming has finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub parent_id: Option<Uuid>,

    pub context: String,
    pub response: Option<String>,
    pub query: Option<String>,

    pub created_at: DateTime<Utc>,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub latency_ms: Option<u64>,
}

impl Node {
    /// Root node of a conversation: no parent, no query, no response yet.
    pub fn root(conversation_id: Uuid, context: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            parent_id: None,
            context: context.into(),
            response: None,
            query: None,
            created_at: Utc::now(),
            model: None,
            tokens_used: None,
            latency_ms: None,
        }
    }

    /// Child node created by branching from `parent_id`. The response starts
    /// empty and is filled in once streaming completes.
    pub fn child(
        conversation_id: Uuid,
        parent_id: Uuid,
        context: impl Into<String>,
        query: impl Into<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            parent_id: Some(parent_id),
            context: context.into(),
            response: Some(String::new()),
            query: Some(query.into()),
            created_at: Utc::now(),
            model,
            tokens_used: None,
            latency_ms: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A directed transition between two nodes, labeled with the query that
/// caused it. Created in lockstep with its target node, never independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: Uuid,
    pub source_node_id: Uuid,
    pub target_node_id: Uuid,
    pub query_text: String,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(source_node_id: Uuid, target_node_id: Uuid, query_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_node_id,
            target_node_id,
            query_text: query_text.into(),
            created_at: Utc::now(),
        }
    }
}

/// A conversation: a tree of nodes rooted at `root_node_id`, with
/// `active_node_id` marking the current default branch point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub root_node_id: Uuid,
    pub active_node_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
