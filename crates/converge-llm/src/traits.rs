use crate::streaming::TokenStream;
use async_trait::async_trait;
use thiserror::Error;

/// One candidate attempt against the completion backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    /// System instruction (the conversation root's context).
    pub system: String,
    /// User-turn payload reconstructed from the ancestor transcript.
    pub user: String,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Failure before any fragment was produced. `Rejected` is the per-candidate
/// up-front refusal that drives fallback; a mid-stream failure never reaches
/// this type, it surfaces on the token stream itself.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP {status}: {body}")]
    Rejected {
        model: String,
        status: u16,
        body: String,
    },
    #[error("request to {model} failed: {source}")]
    Request {
        model: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Streaming contract against the model backend.
///
/// A successful call returns a lazy, finite token stream terminated by
/// `StreamEvent::Done`; the consumer may drop the stream early to cancel the
/// underlying call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<TokenStream, CompletionError>;

    /// Ranked free-tier models tried in order when no model is requested.
    fn fallback_models(&self) -> &[String];
}
