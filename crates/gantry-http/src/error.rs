//! Adapter error types.

use gantry_core::BoxError;
use thiserror::Error;

/// Errors raised while translating an invocation event into an HTTP
/// request, or an HTTP response back into a reply.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to parse invocation event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event is not an HTTP invocation in a recognized encoding")]
    UnrecognizedFormat,

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid base64 request body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to build request: {0}")]
    Http(#[from] http::Error),
}

/// The single fault class visible at the adapter boundary: decoding the
/// event, dispatching to the application, or encoding the response
/// failed.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("event translation failed: {0}")]
    Event(#[from] EventError),

    #[error("application error: {0}")]
    App(#[source] BoxError),

    #[error("failed to read application response body: {0}")]
    ResponseBody(#[source] BoxError),
}
