//! Error types for gantry core parsing.

use thiserror::Error;

/// Boxed error type used at handler boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for core parsing operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while reading platform-provided configuration or
/// invocation metadata.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("missing invocation header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid invocation header: {0}")]
    InvalidHeader(&'static str),
}
