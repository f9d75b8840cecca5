use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use converge_graph::Conversation;

use crate::error::{ApiError, ApiResult};
use crate::schemas::{
    CreateConversationRequest, CreateConversationResponse, GraphResponse, SelectNodeRequest,
};
use crate::state::AppState;

/// Create a new conversation with its root node.
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    request: Option<Json<CreateConversationRequest>>,
) -> Json<CreateConversationResponse> {
    let Json(request) = request.unwrap_or_else(|| Json(CreateConversationRequest::default()));
    let conversation = state
        .store
        .create_conversation(request.title, request.initial_context)
        .await;

    tracing::info!(conversation_id = %conversation.id, "created conversation");

    Json(CreateConversationResponse {
        conversation_id: conversation.id,
        root_node_id: conversation.root_node_id,
        active_node_id: conversation.active_node_id,
    })
}

/// List all conversations, most recently updated first. When the store is
/// empty a default conversation is created so the client always has a
/// branch point to start from.
pub async fn list_conversations(State(state): State<Arc<AppState>>) -> Json<Vec<Conversation>> {
    let conversations = state.store.list_conversations().await;
    if !conversations.is_empty() {
        return Json(conversations);
    }

    let default = state
        .store
        .create_conversation("New Conversation", "You are a helpful AI assistant.")
        .await;
    Json(vec![default])
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Conversation>> {
    let conversation = state.store.get_conversation(conversation_id).await?;
    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.store.delete_conversation(conversation_id).await {
        return Err(ApiError::NotFound("Conversation not found".to_string()));
    }

    Ok(Json(json!({
        "status": "deleted",
        "conversation_id": conversation_id,
    })))
}

/// Full graph view of a conversation, with edges renamed to
/// `source`/`target` for the frontend.
pub async fn get_conversation_graph(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<GraphResponse>> {
    let conversation = state.store.get_conversation(conversation_id).await?;

    let nodes = state.store.get_conversation_nodes(conversation_id).await;
    let edges = state
        .store
        .get_conversation_edges(conversation_id)
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(GraphResponse {
        conversation_id,
        active_node_id: conversation.active_node_id,
        nodes,
        edges,
    }))
}

/// Select a node as the conversation's active branch point.
pub async fn select_node(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SelectNodeRequest>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .select_node(conversation_id, request.node_id)
        .await?;

    Ok(Json(json!({
        "status": "selected",
        "active_node_id": request.node_id,
    })))
}
