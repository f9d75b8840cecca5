use chrono::{DateTime, Utc};
use converge_graph::{Edge, Node};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_title() -> String {
    "New Conversation".to_string()
}

fn default_context() -> String {
    "You are a helpful AI assistant.".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_context")]
    pub initial_context: String,
}

impl Default for CreateConversationRequest {
    fn default() -> Self {
        Self {
            title: default_title(),
            initial_context: default_context(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: Uuid,
    pub root_node_id: Uuid,
    pub active_node_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SelectNodeRequest {
    pub node_id: Uuid,
}

/// Edge with `source`/`target` field names for the graph-rendering frontend.
#[derive(Debug, Serialize)]
pub struct EdgeResponse {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub query_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Edge> for EdgeResponse {
    fn from(edge: Edge) -> Self {
        Self {
            id: edge.id,
            source: edge.source_node_id,
            target: edge.target_node_id,
            query_text: edge.query_text,
            created_at: edge.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub conversation_id: Uuid,
    pub active_node_id: Uuid,
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeResponse>,
}
