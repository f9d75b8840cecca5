// OpenRouter-specific client implementation

use crate::streaming::{parse_sse_stream, TokenStream};
use crate::traits::{CompletionClient, CompletionError, CompletionRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Free-tier models tried in order when the client does not request a
/// specific one.
const FREE_MODELS: &[&str] = &[
    "meta-llama/llama-3.3-70b-instruct:free",
    "meta-llama/llama-3.2-3b-instruct:free",
    "amazon/nova-2-lite-v1:free",
    "openai/gpt-oss-20b:free",
    "google/gemma-3-27b-it:free",
    "mistralai/mistral-7b-instruct:free",
    "nvidia/nemotron-nano-9b-v2:free",
    "alibaba/tongyi-deepresearch-30b-a3b:free",
    "moonshotai/kimi-k2:free",
];

/// OpenRouter client (HTTP direct, no SDK)
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    base_url: String,
    fallback: Vec<String>,
}

impl OpenRouterClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        headers.insert("HTTP-Referer", HeaderValue::from_static("https://converge.local"));
        headers.insert("X-Title", HeaderValue::from_static("ConVerge"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENROUTER_API_BASE.to_string(),
            fallback: FREE_MODELS.iter().map(|m| m.to_string()).collect(),
        })
    }

    /// Override the API base url (useful for testing against a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the ranked fallback list.
    pub fn with_fallback_models(mut self, models: Vec<String>) -> Self {
        self.fallback = models;
        self
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<TokenStream, CompletionError> {
        let payload = serde_json::json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "stream": true,
        });

        tracing::debug!(model = %request.model, "opening completion stream");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Request {
                model: request.model.clone(),
                source: e.into(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(model = %request.model, status, "model rejected request");
            return Err(CompletionError::Rejected {
                model: request.model,
                status,
                body,
            });
        }

        Ok(parse_sse_stream(response))
    }

    fn fallback_models(&self) -> &[String] {
        &self.fallback
    }
}
