//! Wire models of the platform's HTTP invocation events.
//!
//! Three encodings exist for HTTP-shaped events: the REST API proxy
//! format (payload 1.0), the HTTP API format (payload 2.0), and the
//! ALB target group format. The ALB shape is the 1.0 shape with an
//! `elb` key under `requestContext`. Detection is structural, never
//! configured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventError;

/// REST API (payload 1.0) and ALB proxy event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestApiEvent {
    pub http_method: String,
    pub path: String,
    pub headers: Option<HashMap<String, String>>,
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: Option<Value>,
}

/// HTTP API (payload 2.0) event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiEvent {
    pub version: String,
    pub raw_path: String,
    pub raw_query_string: String,
    pub cookies: Option<Vec<String>>,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: HttpApiRequestContext,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiRequestContext {
    pub http: HttpDescription,
    pub request_id: Option<String>,
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpDescription {
    pub method: String,
    pub path: String,
    pub protocol: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Which event encoding an invocation arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RestApi,
    HttpApi,
    Alb,
}

/// A decoded invocation event, one variant per encoding.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InvocationEvent {
    HttpApi(HttpApiEvent),
    RestApi(RestApiEvent),
    Alb(RestApiEvent),
}

impl InvocationEvent {
    /// Detect the encoding and deserialize from a raw JSON payload.
    pub fn from_slice(payload: &[u8]) -> Result<Self, EventError> {
        let value: Value = serde_json::from_slice(payload)?;
        Self::from_value(value)
    }

    /// Detect the encoding and deserialize from a JSON value.
    ///
    /// Detection mirrors how the shapes differ on the wire: payload 2.0
    /// carries `version: "2.0"`, ALB events carry `requestContext.elb`,
    /// and payload 1.0 carries a top-level `httpMethod`. Anything else
    /// is not an HTTP invocation event.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        if value.get("version").and_then(Value::as_str) == Some("2.0") {
            return Ok(InvocationEvent::HttpApi(serde_json::from_value(value)?));
        }
        if value.pointer("/requestContext/elb").is_some() {
            return Ok(InvocationEvent::Alb(serde_json::from_value(value)?));
        }
        if value.get("httpMethod").is_some() {
            return Ok(InvocationEvent::RestApi(serde_json::from_value(value)?));
        }
        Err(EventError::UnrecognizedFormat)
    }

    /// The encoding this event arrived in.
    pub fn kind(&self) -> EventKind {
        match self {
            InvocationEvent::HttpApi(_) => EventKind::HttpApi,
            InvocationEvent::RestApi(_) => EventKind::RestApi,
            InvocationEvent::Alb(_) => EventKind::Alb,
        }
    }
}

impl<'de> Deserialize<'de> for InvocationEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        InvocationEvent::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// The reply shape returned to the platform.
///
/// Both the single-value and multi-value header maps are populated;
/// REST API consumers read either. `cookies` is only set for payload
/// 2.0 replies, where `Set-Cookie` headers would otherwise collapse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl AdapterResponse {
    /// A bare 500 reply, used when a fault is translated instead of
    /// propagated.
    pub fn internal_server_error() -> Self {
        AdapterResponse {
            status_code: 500,
            headers: HashMap::new(),
            multi_value_headers: HashMap::new(),
            cookies: None,
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}
