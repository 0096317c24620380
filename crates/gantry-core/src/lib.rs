//! gantry-core — shared types for the gantry serverless adapter.
//!
//! Holds the pieces every other gantry crate needs: the runtime
//! configuration the platform provides through environment variables,
//! the per-invocation context parsed from Runtime API response headers,
//! and the core error type.

pub mod config;
pub mod context;
pub mod error;

pub use config::RuntimeConfig;
pub use context::InvocationContext;
pub use error::{BoxError, CoreError, CoreResult};
