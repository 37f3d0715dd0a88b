use serde::Deserialize;

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Free-text question, or the reserved `"continue"` control token.
    pub question: String,
    /// Optional restriction to these document sources.
    pub selected_sources: Option<Vec<String>>,
    /// Opaque caller/session identifier keying the pagination state.
    pub session_id: String,
    /// Hits surfaced per call; server default when omitted.
    pub batch_size: Option<usize>,
}
