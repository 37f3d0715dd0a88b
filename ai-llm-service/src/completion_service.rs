//! Streaming chat client for OpenAI-compatible completion endpoints.
//!
//! Issues `POST {endpoint}/v1/chat/completions` with `stream: true` and turns
//! the line-delimited response (`data: {json}` per line, terminated by a
//! `[DONE]` sentinel) into a lazy sequence of answer tokens.
//!
//! Wire tolerance:
//! - non-2xx responses are logged and produce an empty token stream
//! - malformed per-line JSON is logged and skipped
//! - the `[DONE]` sentinel ends iteration without error
//! - dropping the consumer drops the HTTP response, closing the connection

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::config::completion_config::CompletionConfig;
use crate::error_handler::{LlmServiceError, make_snippet};

/// Fixed system instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant that answers user questions simply and \
clearly. Do not repeat the same phrase or sentence. The context is retrieved from a database the \
user cannot see, so understand the question and answer it directly from the context. Keep the \
response concise unless the user asks for more detail.";

/// End-of-stream sentinel on the wire.
const DONE_SENTINEL: &str = "[DONE]";

/// Buffered tokens between the reader task and the consumer.
const TOKEN_BUFFER: usize = 32;

/// Thin streaming client for an OpenAI-compatible chat endpoint.
///
/// Constructed from a complete [`CompletionConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct CompletionService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_chat: String,
}

impl CompletionService {
    /// Creates a new [`CompletionService`] from the given config.
    ///
    /// # Errors
    /// - [`LlmServiceError::Decode`] if the API key cannot form a header
    /// - [`LlmServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, LlmServiceError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(key) = &cfg.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                    LlmServiceError::Decode(format!("invalid API key header: {e}"))
                })?,
            );
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(120));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = format!(
            "{}/v1/chat/completions",
            cfg.endpoint.trim_end_matches('/')
        );

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            max_tokens = cfg.max_tokens,
            "CompletionService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Starts a streaming completion for `(question, context)` and returns
    /// the token stream.
    ///
    /// The request embeds the fixed system instruction and a user message
    /// carrying both the retrieved context and the question. Tokens arrive
    /// in wire order; the stream ends at `[DONE]` or when the connection
    /// closes.
    ///
    /// # Errors
    /// Returns [`LlmServiceError::HttpTransport`] only when the request
    /// cannot be sent at all. A non-2xx response is logged and yields an
    /// empty stream instead of an error.
    pub async fn stream_chat(
        &self,
        question: &str,
        context: &str,
    ) -> Result<ReceiverStream<String>, LlmServiceError> {
        let body = ChatCompletionRequest {
            model: &self.cfg.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Refer to the following context retrieved from the vector database:\n\
                         {context}\n\nAnswer the user question: {question}"
                    ),
                },
            ],
            stream: true,
            max_tokens: self.cfg.max_tokens,
        };

        debug!(
            model = %self.cfg.model,
            question_len = question.len(),
            context_len = context.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        let (tx, rx) = mpsc::channel(TOKEN_BUFFER);

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(
                %status,
                url = %self.url_chat,
                snippet = %make_snippet(&text),
                model = %self.cfg.model,
                "completion endpoint returned non-success status"
            );
            // tx is dropped here: the caller sees an empty, finished stream.
            return Ok(ReceiverStream::new(rx));
        }

        tokio::spawn(async move {
            let mut wire = resp.bytes_stream();
            let mut buf = String::new();

            'read: while let Some(chunk) = wire.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(error = %e, "completion stream aborted mid-flight");
                        break;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                // Lines may be split across network chunks; only complete
                // lines are parsed, the remainder stays buffered.
                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    match parse_stream_line(line.trim()) {
                        StreamLine::Token(token) => {
                            if tx.send(token).await.is_err() {
                                break 'read;
                            }
                        }
                        StreamLine::Done => break 'read,
                        StreamLine::Skip => {}
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}

/// Outcome of parsing one wire line.
#[derive(Debug, PartialEq)]
enum StreamLine {
    /// A content fragment to forward to the consumer.
    Token(String),
    /// The `[DONE]` sentinel: stop reading.
    Done,
    /// Blank, empty-delta, or malformed line: ignore.
    Skip,
}

/// Parses one line of the streamed response.
///
/// Lines are blank, or a JSON object optionally prefixed with `data:`, or
/// the literal `[DONE]` payload.
fn parse_stream_line(line: &str) -> StreamLine {
    if line.is_empty() {
        return StreamLine::Skip;
    }

    let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);

    if payload == DONE_SENTINEL {
        return StreamLine::Done;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default();
            if content.is_empty() {
                StreamLine::Skip
            } else {
                StreamLine::Token(content)
            }
        }
        Err(e) => {
            warn!(error = %e, raw = %make_snippet(payload), "skipping malformed stream line");
            StreamLine::Skip
        }
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/chat/completions` (streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    max_tokens: u32,
}

/// Chat message for the completion API.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    /// One of: "system" | "user".
    role: &'a str,
    content: String,
}

/// Minimal streamed response chunk: `{choices:[{delta:{content}}]}`.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_delta_content_from_data_lines() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_stream_line(line), StreamLine::Token("Hel".into()));
    }

    #[test]
    fn accepts_lines_without_the_data_prefix() {
        let line = r#"{"choices":[{"delta":{"content":"lo"}}]}"#;
        assert_eq!(parse_stream_line(line), StreamLine::Token("lo".into()));
    }

    #[test]
    fn done_sentinel_terminates_the_stream() {
        assert_eq!(parse_stream_line("data: [DONE]"), StreamLine::Done);
    }

    #[test]
    fn blank_empty_delta_and_malformed_lines_are_skipped() {
        assert_eq!(parse_stream_line(""), StreamLine::Skip);
        assert_eq!(
            parse_stream_line(r#"data: {"choices":[{"delta":{}}]}"#),
            StreamLine::Skip
        );
        assert_eq!(parse_stream_line("data: {not json"), StreamLine::Skip);
        assert_eq!(parse_stream_line(r#"data: {"choices":[]}"#), StreamLine::Skip);
    }
}
