use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use converge_graph::{build_context, Edge, GraphStore, Node};
use converge_llm::{CompletionClient, CompletionRequest, StreamEvent};

use crate::events::{BranchRequest, TurnEvent, TurnMetadata};

/// Model name recorded when the turn went through the fallback list instead
/// of a client-requested model.
pub const AUTO_SELECTED_MODEL: &str = "auto-selected-free-model";

/// Drives one branching turn: resolves the parent node, reconstructs context
/// from the ancestor path, eagerly records the new node/edge, streams tokens
/// from the first accepting candidate model, and finalizes the node.
pub struct Orchestrator {
    store: Arc<GraphStore>,
    client: Arc<dyn CompletionClient>,
}

impl Orchestrator {
    pub fn new(store: Arc<GraphStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self { store, client }
    }

    /// Spawn the turn in the background and return the event receiver.
    ///
    /// The caller relays events to the connection; dropping the receiver
    /// aborts the in-flight completion call.
    pub fn spawn_branch(
        &self,
        conversation_id: Uuid,
        request: BranchRequest,
    ) -> mpsc::Receiver<TurnEvent> {
        let (tx, rx) = mpsc::channel(1000);

        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);

        tokio::spawn(async move {
            if let Err(e) = Self::run_turn(store, client, conversation_id, request, tx.clone()).await
            {
                tracing::error!(conversation_id = %conversation_id, error = %e, "turn failed");
                let _ = tx
                    .send(TurnEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        rx
    }

    async fn run_turn(
        store: Arc<GraphStore>,
        client: Arc<dyn CompletionClient>,
        conversation_id: Uuid,
        request: BranchRequest,
        tx: mpsc::Sender<TurnEvent>,
    ) -> Result<()> {
        // The branch mutation sequence (resolve parent, create node/edge,
        // reassign active node) is serialized per conversation. Token relay
        // below runs outside the lock.
        let turn_lock = store.turn_lock(conversation_id).await;
        let guard = turn_lock.lock().await;

        let conversation = store.get_conversation(conversation_id).await?;
        let parent_id = request.parent_node_id.unwrap_or(conversation.active_node_id);
        store
            .get_node(parent_id)
            .await
            .map_err(|_| anyhow::anyhow!("Parent node not found"))?;

        let ancestors = store.get_ancestors(parent_id).await?;
        let built = build_context(&ancestors, &request.query);

        // The branch point is reserved eagerly: if every candidate rejects,
        // the node persists with an empty response.
        let node = store
            .create_node(Node::child(
                conversation_id,
                parent_id,
                built.transcript.clone(),
                request.query.clone(),
                request.model.clone(),
            ))
            .await;
        store
            .create_edge(Edge::new(parent_id, node.id, request.query.clone()))
            .await;
        store.select_node(conversation_id, node.id).await?;
        drop(guard);

        tracing::info!(
            conversation_id = %conversation_id,
            node_id = %node.id,
            parent_id = %parent_id,
            "branch created, starting stream"
        );

        let start = Instant::now();
        let candidates: Vec<String> = match &request.model {
            Some(model) => vec![model.clone()],
            None => client.fallback_models().to_vec(),
        };

        let mut accumulated = String::new();
        let mut accepted = false;
        let mut last_error: Option<String> = None;

        for model in &candidates {
            let completion = CompletionRequest::new(model, &built.system, &built.user_payload);
            let mut stream = match client.stream_completion(completion).await {
                Ok(stream) => stream,
                Err(e) => {
                    // Up-front rejection: advance to the next candidate
                    // without surfacing anything to the client.
                    tracing::warn!(model = %model, error = %e, "candidate rejected");
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            accepted = true;
            while let Some(event) = stream.next().await {
                match event {
                    Ok(StreamEvent::Token { content }) => {
                        accumulated.push_str(&content);
                        if tx.send(TurnEvent::Token { content }).await.is_err() {
                            // Client disconnected; dropping the stream
                            // cancels the upstream call.
                            tracing::debug!(node_id = %node.id, "client gone, aborting stream");
                            return Ok(());
                        }
                    }
                    Ok(StreamEvent::Done) => break,
                    // Mid-stream failure is a stream error, never a
                    // fallback trigger.
                    Err(e) => return Err(e),
                }
            }
            break;
        }

        if !accepted {
            let last = last_error.unwrap_or_else(|| "no candidates available".to_string());
            anyhow::bail!("All models failed. Last error: {}", last);
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        let model_used = request
            .model
            .unwrap_or_else(|| AUTO_SELECTED_MODEL.to_string());
        store
            .finalize_node(node.id, accumulated, model_used.clone(), latency_ms)
            .await?;

        tracing::info!(node_id = %node.id, latency_ms, model = %model_used, "turn complete");

        let _ = tx
            .send(TurnEvent::Complete {
                node_id: node.id,
                metadata: TurnMetadata {
                    latency_ms,
                    model: model_used,
                },
            })
            .await;
        Ok(())
    }
}
