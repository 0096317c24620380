//! Diagnostic reports for failed invocations.
//!
//! When a handler faults, the runtime posts a structured report to the
//! Runtime API instead of a reply; the platform records the invocation
//! as failed.

use gantry_core::BoxError;
use serde::{Deserialize, Serialize};

/// A machine-readable report of an unhandled error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Classification of the error, surfaced by the platform.
    pub error_type: String,
    /// Display output of the error.
    pub error_message: String,
}

impl ErrorReport {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        ErrorReport {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }

    /// Build a report from a boxed handler error.
    pub fn from_boxed(err: &BoxError) -> Self {
        ErrorReport::new("HandlerError", err.to_string())
    }
}
