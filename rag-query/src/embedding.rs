//! Ollama-based embedding client for query vectors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::rag_query_error::RagQueryError;
use crate::providers::Embedder;
use crate::structs::query_config::EmbeddingConfig;

#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

/// Embeds text via Ollama `/api/embeddings`.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    cfg: EmbeddingConfig,
    url: String,
}

impl OllamaEmbedder {
    /// Builds the embedder with a preconfigured HTTP client.
    ///
    /// # Errors
    /// Returns `RagQueryError::Embedding` if the HTTP client cannot be built.
    pub fn new(cfg: EmbeddingConfig) -> Result<Self, RagQueryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| RagQueryError::Embedding(format!("http client build: {e}")))?;

        let url = format!("{}/api/embeddings", cfg.url.trim_end_matches('/'));

        Ok(Self { client, cfg, url })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagQueryError> {
        let req = OllamaEmbedRequest {
            model: &self.cfg.model,
            prompt: text,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| RagQueryError::Embedding(format!("POST {}: {e}", self.url)))?;

        if resp.status() != StatusCode::OK {
            let code = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".into());
            return Err(RagQueryError::Embedding(format!(
                "ollama embeddings non-200: {code}; body: {body}"
            )));
        }

        let parsed: OllamaEmbedResponse = resp
            .json()
            .await
            .map_err(|e| RagQueryError::Embedding(format!("parse embeddings json: {e}")))?;

        if parsed.embedding.len() != self.cfg.dim {
            return Err(RagQueryError::Embedding(format!(
                "embedding dim {} != expected {} (model: {})",
                parsed.embedding.len(),
                self.cfg.dim,
                self.cfg.model
            )));
        }

        Ok(parsed.embedding)
    }
}
