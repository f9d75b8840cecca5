use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use converge_graph::Node;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<Uuid>,
) -> ApiResult<Json<Node>> {
    let node = state.store.get_node(node_id).await?;
    Ok(Json(node))
}

/// Delete a node and its whole subtree. Root nodes are rejected with 400;
/// deleting the conversation is the only way to remove a root.
pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state.store.delete_node(node_id).await?;

    Ok(Json(json!({
        "status": "deleted",
        "node_id": node_id,
    })))
}

/// Ancestor path from the conversation root to this node, inclusive.
pub async fn get_ancestors(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Node>>> {
    let ancestors = state.store.get_ancestors(node_id).await?;
    Ok(Json(ancestors))
}

pub async fn get_children(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Node>>> {
    // 404 for unknown ids even though an unknown id trivially has no children.
    state.store.get_node(node_id).await?;
    let children = state.store.get_children(node_id).await;
    Ok(Json(children))
}
