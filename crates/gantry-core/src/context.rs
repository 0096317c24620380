//! Per-invocation context.
//!
//! The Runtime API attaches invocation metadata to the response that
//! delivers each event, as `Lambda-Runtime-*` headers. This module
//! parses those headers into a typed record.

use http::HeaderMap;

use crate::error::{CoreError, CoreResult};

const REQUEST_ID: &str = "lambda-runtime-aws-request-id";
const DEADLINE_MS: &str = "lambda-runtime-deadline-ms";
const FUNCTION_ARN: &str = "lambda-runtime-invoked-function-arn";
const TRACE_ID: &str = "lambda-runtime-trace-id";
const CLIENT_CONTEXT: &str = "lambda-runtime-client-context";
const COGNITO_IDENTITY: &str = "lambda-runtime-cognito-identity";

/// Metadata accompanying a single invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvocationContext {
    /// Unique id of this invocation.
    pub request_id: String,
    /// Deadline for the invocation, in epoch milliseconds.
    pub deadline_ms: u64,
    /// ARN of the function being invoked.
    pub invoked_function_arn: String,
    /// Tracing header, when tracing is active.
    pub trace_id: Option<String>,
    /// Client context passed by a mobile SDK caller, raw JSON.
    pub client_context: Option<String>,
    /// Cognito identity of the caller, raw JSON.
    pub cognito_identity: Option<String>,
}

impl InvocationContext {
    /// Parse the context out of Runtime API response headers.
    pub fn from_headers(headers: &HeaderMap) -> CoreResult<Self> {
        let required = |name: &'static str| {
            headers
                .get(name)
                .ok_or(CoreError::MissingHeader(name))?
                .to_str()
                .map(str::to_owned)
                .map_err(|_| CoreError::InvalidHeader(name))
        };
        let optional = |name: &'static str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };

        let deadline_raw = required(DEADLINE_MS)?;
        let deadline_ms = deadline_raw
            .parse::<u64>()
            .map_err(|_| CoreError::InvalidHeader(DEADLINE_MS))?;

        Ok(InvocationContext {
            request_id: required(REQUEST_ID)?,
            deadline_ms,
            invoked_function_arn: required(FUNCTION_ARN)?,
            trace_id: optional(TRACE_ID),
            client_context: optional(CLIENT_CONTEXT),
            cognito_identity: optional(COGNITO_IDENTITY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_fixture() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID, HeaderValue::from_static("req-123"));
        headers.insert(DEADLINE_MS, HeaderValue::from_static("1766500000000"));
        headers.insert(
            FUNCTION_ARN,
            HeaderValue::from_static("arn:aws:lambda:eu-west-1:123456789012:function:hello-api"),
        );
        headers
    }

    #[test]
    fn parses_required_headers() {
        let ctx = InvocationContext::from_headers(&headers_fixture()).unwrap();
        assert_eq!(ctx.request_id, "req-123");
        assert_eq!(ctx.deadline_ms, 1766500000000);
        assert!(ctx.invoked_function_arn.ends_with("function:hello-api"));
        assert_eq!(ctx.trace_id, None);
    }

    #[test]
    fn parses_optional_trace_id() {
        let mut headers = headers_fixture();
        headers.insert(TRACE_ID, HeaderValue::from_static("Root=1-5759e988-bd862e3fe1be46a994272793"));
        let ctx = InvocationContext::from_headers(&headers).unwrap();
        assert_eq!(
            ctx.trace_id.as_deref(),
            Some("Root=1-5759e988-bd862e3fe1be46a994272793")
        );
    }

    #[test]
    fn missing_request_id_is_an_error() {
        let mut headers = headers_fixture();
        headers.remove(REQUEST_ID);
        let err = InvocationContext::from_headers(&headers).unwrap_err();
        assert!(matches!(err, CoreError::MissingHeader(REQUEST_ID)));
    }

    #[test]
    fn non_numeric_deadline_is_an_error() {
        let mut headers = headers_fixture();
        headers.insert(DEADLINE_MS, HeaderValue::from_static("soon"));
        let err = InvocationContext::from_headers(&headers).unwrap_err();
        assert!(matches!(err, CoreError::InvalidHeader(DEADLINE_MS)));
    }
}
