use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One branching turn, as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRequest {
    pub query: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Defaults to the conversation's active node when absent.
    #[serde(default)]
    pub parent_node_id: Option<Uuid>,
}

/// Messages relayed to the client during a turn. Zero or more `Token`
/// events, then exactly one `Complete` or `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    Token {
        content: String,
    },
    Complete {
        node_id: Uuid,
        metadata: TurnMetadata,
    },
    Error {
        message: String,
    },
}

impl TurnEvent {
    /// Terminal events end the turn; the connection closes after one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEvent::Complete { .. } | TurnEvent::Error { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub latency_ms: u64,
    pub model: String,
}
