//! POST /ask — streams the RAG answer for a question or a "continue" page.

use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use tracing::debug;

use crate::{core::app_state::AppState, routes::ask::ask_request::AskRequest, routes::stream_response};

/// Handler: POST /ask
///
/// The response body is the pipeline's item stream: answer tokens in arrival
/// order, then one citation block, or a single informational/error message.
///
/// # Example
/// ```bash
/// curl -N -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What does the warranty cover?","session_id":"caller-1"}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> Response {
    debug!(
        session = %body.session_id,
        question_len = body.question.len(),
        sources = body.selected_sources.as_ref().map(|s| s.len()).unwrap_or(0),
        "ask_question: start"
    );

    let stream = state.pipeline.process_query(
        body.question,
        body.selected_sources,
        body.session_id,
        body.batch_size,
    );

    stream_response(stream)
}
