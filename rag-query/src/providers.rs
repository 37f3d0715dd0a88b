//! Provider seams for the external collaborators of the query pipeline.
//!
//! The pipeline composes three fallible backends: an embedding model, a
//! vector store, and a streaming completion endpoint. Each sits behind a
//! trait so the pipeline's state machine can be exercised with in-memory
//! implementations.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use ai_llm_service::completion_service::CompletionService;

use crate::errors::rag_query_error::RagQueryError;
use crate::structs::hit::Hit;

/// Maps a query string to a fixed-length numeric vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagQueryError>;
}

/// Similarity-search service over the active collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ranked top-k search, optionally restricted to the given sources via
    /// an equality-in-list filter. Must observe all writes committed before
    /// the call (strong consistency).
    async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        sources: Option<&[String]>,
    ) -> Result<Vec<Hit>, RagQueryError>;

    /// Paged full-collection scan accumulating the de-duplicated `source`
    /// field across all points.
    async fn scan_sources(&self) -> Result<BTreeSet<String>, RagQueryError>;
}

/// Streaming text-generation service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produces the model's answer tokens in arrival order. The stream is
    /// finite; transient wire problems are absorbed (logged) downstream and
    /// end the stream early rather than surfacing here.
    async fn stream_answer(
        &self,
        question: &str,
        context: &str,
    ) -> Result<BoxStream<'static, String>, RagQueryError>;
}

/// Production [`CompletionClient`] backed by the streaming chat service.
pub struct LlmCompletionClient {
    service: Arc<CompletionService>,
}

impl LlmCompletionClient {
    pub fn new(service: Arc<CompletionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CompletionClient for LlmCompletionClient {
    async fn stream_answer(
        &self,
        question: &str,
        context: &str,
    ) -> Result<BoxStream<'static, String>, RagQueryError> {
        let stream = self.service.stream_chat(question, context).await?;
        Ok(Box::pin(stream))
    }
}
