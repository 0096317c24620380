//! The invocation adapter.
//!
//! `Adapter` wraps an application object — any tower service from
//! `http::Request` to `http::Response` — and exposes the platform's
//! `(event, context) → reply` entry point. Translation is delegated to
//! [`crate::convert`]; this module only dispatches and applies the
//! configured fault policy.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use gantry_core::{BoxError, InvocationContext};
use gantry_runtime::Handler;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use tower::{Service, ServiceExt};
use tracing::{debug, error};

use crate::convert;
use crate::error::AdapterError;
use crate::events::{AdapterResponse, InvocationEvent};

/// What the platform sees when the application faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Surface the fault; the trampoline posts an invocation error and
    /// the platform records a failed invocation.
    #[default]
    Propagate,
    /// Translate the fault into a bare 500 reply.
    InternalServerError,
}

/// Binds an application object to the platform invocation shape.
///
/// The adapter holds no per-invocation state: whatever the application
/// keeps warm across invocations is its own concern.
#[derive(Debug, Clone)]
pub struct Adapter<S> {
    service: S,
    policy: ErrorPolicy,
}

impl<S> Adapter<S> {
    /// Wrap an application object with the default fault policy.
    pub fn new(service: S) -> Self {
        Adapter {
            service,
            policy: ErrorPolicy::default(),
        }
    }

    /// Override the fault policy.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<S, B> Adapter<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>>,
    S::Error: Into<BoxError>,
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    /// One full translation cycle: decode, dispatch, encode.
    ///
    /// Faults surface as `Err` regardless of policy; [`Self::invoke`]
    /// applies the policy.
    pub async fn handle(
        &mut self,
        event: InvocationEvent,
        context: &InvocationContext,
    ) -> Result<AdapterResponse, AdapterError> {
        let kind = event.kind();
        let request = convert::decode_event(&event)?;
        debug!(
            request_id = %context.request_id,
            method = %request.method(),
            path = %request.uri().path(),
            "dispatching invocation"
        );

        let response = self
            .service
            .ready()
            .await
            .map_err(|err| AdapterError::App(err.into()))?
            .call(request)
            .await
            .map_err(|err| AdapterError::App(err.into()))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|err| AdapterError::ResponseBody(err.into()))?
            .to_bytes();

        debug!(
            request_id = %context.request_id,
            status = parts.status.as_u16(),
            "invocation complete"
        );
        Ok(convert::encode_response(&parts, &body, kind))
    }

    /// [`Self::handle`] with the fault policy applied.
    pub async fn invoke(
        &mut self,
        event: InvocationEvent,
        context: &InvocationContext,
    ) -> Result<AdapterResponse, AdapterError> {
        match self.handle(event, context).await {
            Ok(reply) => Ok(reply),
            Err(err) => match self.policy {
                ErrorPolicy::Propagate => Err(err),
                ErrorPolicy::InternalServerError => {
                    error!(request_id = %context.request_id, error = %err, "invocation fault");
                    Ok(AdapterResponse::internal_server_error())
                }
            },
        }
    }
}

impl<S, B> Handler<InvocationEvent, AdapterResponse> for Adapter<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: http_body::Body + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Error = AdapterError;
    type Fut = Pin<Box<dyn Future<Output = Result<AdapterResponse, AdapterError>> + Send>>;

    fn call(&mut self, event: InvocationEvent, context: InvocationContext) -> Self::Fut {
        let mut adapter = self.clone();
        Box::pin(async move { adapter.invoke(event, &context).await })
    }
}
