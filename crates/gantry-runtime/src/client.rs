//! Runtime API client.
//!
//! A small hyper client for the four Runtime API operations: fetch the
//! next invocation, post a reply, post an invocation error, post an
//! initialization error.

use bytes::Bytes;
use gantry_core::InvocationContext;
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::trace;

use crate::error::{RuntimeError, RuntimeResult};
use crate::report::ErrorReport;

const API_VERSION: &str = "2018-06-01";
const FUNCTION_ERROR_TYPE: &str = "lambda-runtime-function-error-type";

/// Client for the platform's Runtime API.
#[derive(Clone)]
pub struct RuntimeClient {
    base: String,
    http: Client<HttpConnector, Full<Bytes>>,
}

impl RuntimeClient {
    /// Create a client for the given endpoint.
    ///
    /// The platform provides the endpoint as `host:port`; a scheme
    /// prefix is accepted for local testing.
    pub fn new(endpoint: &str) -> RuntimeResult<Self> {
        let base = if endpoint.contains("://") {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("http://{endpoint}")
        };
        // Validate eagerly so a bad endpoint fails at startup, not on
        // the first invocation.
        format!("{base}/{API_VERSION}/runtime/invocation/next")
            .parse::<Uri>()
            .map_err(|_| RuntimeError::Endpoint(endpoint.to_string()))?;

        Ok(RuntimeClient {
            base,
            http: Client::builder(TokioExecutor::new()).build_http(),
        })
    }

    /// Block on the next invocation event.
    ///
    /// Returns the parsed invocation context and the raw event payload.
    pub async fn next_invocation(&self) -> RuntimeResult<(InvocationContext, Bytes)> {
        let uri = format!("{}/{API_VERSION}/runtime/invocation/next", self.base);
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Full::new(Bytes::new()))?;

        let response = self.http.request(request).await?;
        if !response.status().is_success() {
            return Err(RuntimeError::UnexpectedStatus(response.status()));
        }

        let (parts, body) = response.into_parts();
        let context = InvocationContext::from_headers(&parts.headers)?;
        let payload = body.collect().await?.to_bytes();
        trace!(request_id = %context.request_id, bytes = payload.len(), "received invocation");
        Ok((context, payload))
    }

    /// Post a successful reply for an invocation.
    pub async fn post_response(&self, request_id: &str, payload: Bytes) -> RuntimeResult<()> {
        let uri = format!(
            "{}/{API_VERSION}/runtime/invocation/{request_id}/response",
            self.base
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Full::new(payload))?;
        self.expect_success(request).await
    }

    /// Post an invocation error report.
    pub async fn post_error(&self, request_id: &str, report: &ErrorReport) -> RuntimeResult<()> {
        let uri = format!(
            "{}/{API_VERSION}/runtime/invocation/{request_id}/error",
            self.base
        );
        let body = serde_json::to_vec(report)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(FUNCTION_ERROR_TYPE, "Unhandled")
            .body(Full::new(Bytes::from(body)))?;
        self.expect_success(request).await
    }

    /// Report a failure that happened before the loop could start.
    pub async fn post_init_error(&self, report: &ErrorReport) -> RuntimeResult<()> {
        let uri = format!("{}/{API_VERSION}/runtime/init/error", self.base);
        let body = serde_json::to_vec(report)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(FUNCTION_ERROR_TYPE, "Unhandled")
            .body(Full::new(Bytes::from(body)))?;
        self.expect_success(request).await
    }

    async fn expect_success(&self, request: Request<Full<Bytes>>) -> RuntimeResult<()> {
        let response = self.http.request(request).await?;
        if !response.status().is_success() {
            return Err(RuntimeError::UnexpectedStatus(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_endpoint_gets_a_scheme() {
        let client = RuntimeClient::new("127.0.0.1:9001").unwrap();
        assert_eq!(client.base, "http://127.0.0.1:9001");
    }

    #[test]
    fn scheme_endpoint_is_kept() {
        let client = RuntimeClient::new("http://localhost:9001/").unwrap();
        assert_eq!(client.base, "http://localhost:9001");
    }

    #[test]
    fn unparseable_endpoint_is_an_error() {
        assert!(matches!(
            RuntimeClient::new("not a uri"),
            Err(RuntimeError::Endpoint(_))
        ));
    }
}
