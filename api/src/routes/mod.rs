pub mod ask;
pub mod documents;
pub mod health_route;
pub mod upload;

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};

/// Wraps a pipeline item stream as a chunked plain-text response body.
///
/// Items are forwarded verbatim, in order; the final item of the underlying
/// stream (citations or an informational/error message) is in-band, exactly
/// as the pipeline produced it.
pub(crate) fn stream_response(stream: impl Stream<Item = String> + Send + 'static) -> Response {
    let body = Body::from_stream(stream.map(|item| Ok::<_, Infallible>(Bytes::from(item))));
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
