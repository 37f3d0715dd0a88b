//! Completion endpoint configuration loaded from environment variables.

use crate::error_handler::{ConfigError, LlmServiceError, env_opt_u32, must_env};

/// Configuration for the streaming chat completion endpoint.
///
/// The endpoint is any OpenAI-compatible server (TGI, vLLM, OpenAI itself);
/// the client only relies on `/v1/chat/completions` with `stream: true`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Base URL of the inference server (e.g., "http://localhost:8080").
    pub endpoint: String,

    /// Model identifier sent with every request (e.g., "tgi").
    pub model: String,

    /// Optional API key for servers that require Bearer authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate per answer.
    pub max_tokens: u32,

    /// Optional request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl CompletionConfig {
    /// Build the config strictly from environment variables.
    ///
    /// # Environment variables
    /// - `COMPLETION_URL` (required, base URL of the chat endpoint)
    /// - `COMPLETION_MODEL` (default: "tgi")
    /// - `COMPLETION_API_KEY` (optional)
    /// - `LLM_MAX_TOKENS` (default: 1500)
    /// - `COMPLETION_TIMEOUT_SECS` (optional)
    ///
    /// # Errors
    /// - [`ConfigError::MissingVar`] if `COMPLETION_URL` is absent
    /// - [`ConfigError::InvalidFormat`] if the URL has no http/https scheme
    /// - [`ConfigError::InvalidNumber`] on malformed numeric values
    pub fn from_env() -> Result<Self, LlmServiceError> {
        let endpoint = must_env("COMPLETION_URL")?;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidFormat {
                var: "COMPLETION_URL",
                reason: "must start with http:// or https://",
            }
            .into());
        }

        let model = std::env::var("COMPLETION_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "tgi".to_string());

        let api_key = std::env::var("COMPLETION_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(1500);
        let timeout_secs = env_opt_u32("COMPLETION_TIMEOUT_SECS")?.map(u64::from);

        Ok(Self {
            endpoint,
            model,
            api_key,
            max_tokens,
            timeout_secs,
        })
    }
}
