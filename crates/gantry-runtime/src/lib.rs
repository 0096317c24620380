//! gantry-runtime — the invocation trampoline.
//!
//! The hosting platform delivers events through its Runtime API: a
//! long-poll for the next invocation, and per-invocation endpoints for
//! posting the reply or an error report. This crate owns that loop and
//! nothing else — one event in, one handler call, one outcome out.
//!
//! ```no_run
//! use gantry_core::InvocationContext;
//! use gantry_runtime::handler_fn;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gantry_runtime::RuntimeError> {
//!     let handler = handler_fn(|event: String, _ctx: InvocationContext| async move {
//!         Ok::<_, std::convert::Infallible>(event)
//!     });
//!     gantry_runtime::run(handler).await
//! }
//! ```

use std::future::Future;

use bytes::Bytes;
use gantry_core::{BoxError, InvocationContext, RuntimeConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod client;
pub mod error;
pub mod report;

pub use client::RuntimeClient;
pub use error::{RuntimeError, RuntimeResult};
pub use report::ErrorReport;

/// An asynchronous function from an invocation `(event, context)` pair
/// to an output, the contract the trampoline drives once per event.
pub trait Handler<Event, Output>
where
    Event: DeserializeOwned,
    Output: Serialize,
{
    /// Errors returned by this handler.
    type Error: Into<BoxError>;
    /// The future response value of this handler.
    type Fut: Future<Output = Result<Output, Self::Error>> + Send;
    /// Process one invocation.
    fn call(&mut self, event: Event, context: InvocationContext) -> Self::Fut;
}

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

/// A [`Handler`] implemented by a closure.
#[derive(Copy, Clone, Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Event, Output, Error, Fut> Handler<Event, Output> for HandlerFn<F>
where
    F: FnMut(Event, InvocationContext) -> Fut,
    Event: DeserializeOwned,
    Output: Serialize,
    Error: Into<BoxError>,
    Fut: Future<Output = Result<Output, Error>> + Send,
{
    type Error = Error;
    type Fut = Fut;

    fn call(&mut self, event: Event, context: InvocationContext) -> Self::Fut {
        (self.f)(event, context)
    }
}

/// Start the trampoline with configuration from the environment and
/// run until the process is torn down.
pub async fn run<F, Event, Output>(handler: F) -> RuntimeResult<()>
where
    F: Handler<Event, Output>,
    Event: DeserializeOwned,
    Output: Serialize,
{
    let config = RuntimeConfig::from_env()?;
    info!(
        function = %config.function_name,
        version = %config.version,
        memory_mb = config.memory_mb,
        "starting runtime loop"
    );
    let client = RuntimeClient::new(&config.endpoint)?;

    // The sender stays alive for the whole loop; the receiver never
    // observes a shutdown signal.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let result = run_with_client(client, handler, shutdown_rx).await;
    drop(shutdown_tx);
    result
}

/// Like [`run`], but stoppable through a watch channel. Embedders and
/// tests use this to wind the loop down.
pub async fn run_with_shutdown<F, Event, Output>(
    handler: F,
    shutdown: watch::Receiver<bool>,
) -> RuntimeResult<()>
where
    F: Handler<Event, Output>,
    Event: DeserializeOwned,
    Output: Serialize,
{
    let config = RuntimeConfig::from_env()?;
    let client = RuntimeClient::new(&config.endpoint)?;
    run_with_client(client, handler, shutdown).await
}

/// The loop itself: fetch one event, invoke the handler, post the
/// outcome, repeat. A handler fault becomes an error report for that
/// invocation; only transport and serialization failures end the loop.
pub async fn run_with_client<F, Event, Output>(
    client: RuntimeClient,
    mut handler: F,
    mut shutdown: watch::Receiver<bool>,
) -> RuntimeResult<()>
where
    F: Handler<Event, Output>,
    Event: DeserializeOwned,
    Output: Serialize,
{
    loop {
        let (context, payload) = tokio::select! {
            next = client.next_invocation() => next?,
            _ = shutdown.changed() => {
                info!("runtime loop shutting down");
                break;
            }
        };

        let request_id = context.request_id.clone();
        debug!(request_id = %request_id, "invocation received");

        let outcome: Result<Output, BoxError> = match serde_json::from_slice(&payload) {
            Ok(event) => handler.call(event, context).await.map_err(Into::into),
            Err(err) => Err(err.into()),
        };

        match outcome {
            Ok(output) => {
                let reply = serde_json::to_vec(&output)?;
                client.post_response(&request_id, Bytes::from(reply)).await?;
                debug!(request_id = %request_id, "reply posted");
            }
            Err(err) => {
                warn!(request_id = %request_id, error = %err, "handler fault");
                let report = ErrorReport::from_boxed(&err);
                client.post_error(&request_id, &report).await?;
            }
        }
    }

    Ok(())
}
