//! Runtime trampoline error types.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised by the trampoline itself.
///
/// Handler faults are not represented here: they are reported to the
/// Runtime API per invocation and the loop keeps going. These errors
/// mean the loop cannot continue.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(#[from] gantry_core::CoreError),

    #[error("invalid runtime API endpoint: {0}")]
    Endpoint(String),

    #[error("runtime API request could not be built: {0}")]
    Http(#[from] http::Error),

    #[error("runtime API transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("runtime API response body error: {0}")]
    Body(#[from] hyper::Error),

    #[error("runtime API returned unexpected status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("failed to serialize handler output: {0}")]
    Serialize(#[from] serde_json::Error),
}
