use std::sync::Arc;

use ai_llm_service::completion_service::CompletionService;
use ai_llm_service::config::completion_config::CompletionConfig;
use ai_llm_service::health_service::HealthService;
use rag_query::embedding::OllamaEmbedder;
use rag_query::pipeline::QueryPipeline;
use rag_query::providers::Embedder;
use rag_query::structs::query_config::QueryConfig;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Session-aware retrieval/pagination/streaming pipeline.
    pub pipeline: Arc<QueryPipeline>,
    /// Embedding client reused by the upload pipeline.
    pub embedder: Arc<dyn Embedder>,
    /// Streaming chat client reused by the upload pipeline.
    pub completion: Arc<CompletionService>,
    /// Completion endpoint config, kept for health probes.
    pub completion_cfg: CompletionConfig,
    /// Reachability probe for the completion endpoint.
    pub health: HealthService,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let pipeline = Arc::new(
            QueryPipeline::from_env().map_err(|e| AppError::Config(e.to_string()))?,
        );

        let query_cfg =
            QueryConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        let embedder = Arc::new(
            OllamaEmbedder::new(query_cfg.embedding)
                .map_err(|e| AppError::Config(e.to_string()))?,
        );

        let completion_cfg =
            CompletionConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        let completion = Arc::new(
            CompletionService::new(completion_cfg.clone())
                .map_err(|e| AppError::Config(e.to_string()))?,
        );

        let health =
            HealthService::new(Some(10)).map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            pipeline,
            embedder,
            completion,
            completion_cfg,
            health,
        })
    }
}
