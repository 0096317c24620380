//! gantry-http — HTTP invocation adapter.
//!
//! Translates the platform's HTTP-shaped invocation events into
//! `http::Request`s, dispatches them to a wrapped tower service (the
//! application object), and translates the `http::Response` back into
//! the reply shape the platform expects.
//!
//! # Architecture
//!
//! ```text
//! platform invocation (event, context)
//!   │
//!   ▼
//! Adapter
//!   │
//!   ├── decode event → http::Request
//!   ├── call the wrapped tower service
//!   ├── encode http::Response → platform reply
//!   │
//!   ▼
//! platform reply (statusCode, headers, body)
//! ```
//!
//! Translation lives in [`convert`] as pure functions; [`Adapter`] is
//! the thin dispatch wrapper around them.

pub mod adapter;
pub mod convert;
pub mod error;
pub mod events;

pub use adapter::{Adapter, ErrorPolicy};
pub use error::{AdapterError, EventError};
pub use events::{AdapterResponse, EventKind, InvocationEvent};
