//! Completion engine client: OpenRouter chat completions with SSE token
//! streaming and a ranked free-model fallback list.

pub mod openrouter;
pub mod streaming;
pub mod traits;

pub use openrouter::OpenRouterClient;
pub use streaming::{parse_sse_byte_stream, parse_sse_stream, StreamEvent, TokenStream};
pub use traits::{CompletionClient, CompletionError, CompletionRequest};
