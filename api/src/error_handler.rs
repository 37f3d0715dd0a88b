use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use doc_index::DocIndexError;
use rag_query::RagQueryError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR, // startup-only
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Source listing and other vector-store backed lookups.
impl From<RagQueryError> for AppError {
    fn from(err: RagQueryError) -> Self {
        AppError::Http {
            status: StatusCode::BAD_GATEWAY,
            code: "RAG_QUERY_FAILED",
            message: err.to_string(),
        }
    }
}

/// Upload-mode failures with precise HTTP status & code.
impl From<DocIndexError> for AppError {
    fn from(err: DocIndexError) -> Self {
        match err {
            DocIndexError::Pdf(msg) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "PDF_PARSE_FAILED",
                message: msg,
            },
            DocIndexError::InvalidIndex(msg) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "INVALID_INDEX",
                message: msg,
            },
            DocIndexError::Embedding(e) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "EMBEDDING_FAILED",
                message: e.to_string(),
            },
            DocIndexError::Completion(e) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "COMPLETION_FAILED",
                message: e.to_string(),
            },
            DocIndexError::Io(e) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "IO_ERROR",
                message: e.to_string(),
            },
            DocIndexError::Json(e) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INDEX_DECODE_FAILED",
                message: e.to_string(),
            },
        }
    }
}
