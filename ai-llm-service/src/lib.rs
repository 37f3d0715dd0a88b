//! Streaming LLM completion service.
//!
//! Wraps an OpenAI-compatible chat endpoint (`/v1/chat/completions` with
//! `stream: true`) behind a small client that turns the line-delimited wire
//! format into a lazy sequence of answer tokens, plus a reachability probe
//! for health endpoints.

pub mod completion_service;
pub mod config;
pub mod error_handler;
pub mod health_service;

pub use completion_service::CompletionService;
pub use config::completion_config::CompletionConfig;
pub use error_handler::LlmServiceError;
pub use health_service::{HealthService, HealthStatus};
