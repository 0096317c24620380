//! Pure translation between invocation events and HTTP types.
//!
//! `decode_event` turns a platform event into an `http::Request`;
//! `encode_response` turns `http::Response` parts back into the reply
//! shape. Neither function performs I/O or holds state, so a faithful
//! translation can be checked in isolation.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, response};
use http_body_util::Full;

use crate::error::EventError;
use crate::events::{AdapterResponse, EventKind, HttpApiEvent, InvocationEvent, RestApiEvent};

/// Decode an invocation event into an HTTP request.
pub fn decode_event(event: &InvocationEvent) -> Result<Request<Full<Bytes>>, EventError> {
    match event {
        InvocationEvent::RestApi(event) | InvocationEvent::Alb(event) => decode_rest(event),
        InvocationEvent::HttpApi(event) => decode_http_api(event),
    }
}

fn decode_rest(event: &RestApiEvent) -> Result<Request<Full<Bytes>>, EventError> {
    let method = parse_method(&event.http_method)?;
    let query = rest_query_string(event);
    let uri = join_uri(&event.path, &query);
    let body = decode_body(event.body.as_deref(), event.is_base64_encoded)?;

    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(body))?;

    let headers = request.headers_mut();
    if let Some(multi) = &event.multi_value_headers {
        for (name, values) in multi {
            for value in values {
                append_header(headers, name, value);
            }
        }
    } else if let Some(single) = &event.headers {
        for (name, value) in single {
            append_header(headers, name, value);
        }
    }

    Ok(request)
}

fn decode_http_api(event: &HttpApiEvent) -> Result<Request<Full<Bytes>>, EventError> {
    let method = parse_method(&event.request_context.http.method)?;
    let uri = join_uri(&event.raw_path, &event.raw_query_string);
    let body = decode_body(event.body.as_deref(), event.is_base64_encoded)?;

    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(body))?;

    let headers = request.headers_mut();
    for (name, value) in &event.headers {
        append_header(headers, name, value);
    }
    // Payload 2.0 strips cookies out of the header map; rejoin them so
    // the application sees an ordinary cookie header.
    if let Some(cookies) = &event.cookies
        && !cookies.is_empty()
        && let Ok(value) = HeaderValue::from_str(&cookies.join("; "))
    {
        headers.insert(COOKIE, value);
    }

    Ok(request)
}

/// Encode HTTP response parts into the platform reply shape.
pub fn encode_response(parts: &response::Parts, body: &Bytes, kind: EventKind) -> AdapterResponse {
    let mut multi: HashMap<String, Vec<String>> = HashMap::new();
    let mut cookies = Vec::new();

    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else { continue };
        if kind == EventKind::HttpApi && *name == SET_COOKIE {
            cookies.push(value.to_string());
            continue;
        }
        multi
            .entry(name.as_str().to_string())
            .or_default()
            .push(value.to_string());
    }

    let headers = multi
        .iter()
        .map(|(name, values)| (name.clone(), values.join(",")))
        .collect();

    let (body, is_base64_encoded) = encode_body(&parts.headers, body);

    AdapterResponse {
        status_code: parts.status.as_u16(),
        headers,
        multi_value_headers: multi,
        cookies: (kind == EventKind::HttpApi).then_some(cookies),
        body,
        is_base64_encoded,
    }
}

fn parse_method(method: &str) -> Result<Method, EventError> {
    Method::from_bytes(method.as_bytes()).map_err(|_| EventError::InvalidMethod(method.to_string()))
}

fn join_uri(path: &str, query: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Reassemble a query string from the decoded parameter maps of a
/// payload 1.0 event. The multi-value map wins when present; it is a
/// superset of the single-value map.
fn rest_query_string(event: &RestApiEvent) -> String {
    if let Some(multi) = &event.multi_value_query_string_parameters {
        let mut pairs: Vec<_> = multi.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        return pairs
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&");
    }
    if let Some(single) = &event.query_string_parameters {
        let mut pairs: Vec<_> = single.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        return pairs
            .iter()
            .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
    }
    String::new()
}

fn decode_body(body: Option<&str>, is_base64: bool) -> Result<Bytes, EventError> {
    match body {
        None => Ok(Bytes::new()),
        Some(body) if is_base64 => Ok(Bytes::from(BASE64.decode(body)?)),
        Some(body) => Ok(Bytes::copy_from_slice(body.as_bytes())),
    }
}

/// Classify a response body as text or binary and encode accordingly.
///
/// Text passes through verbatim; binary is base64-encoded and flagged,
/// since the platform reply is a JSON document and cannot carry raw
/// bytes.
fn encode_body(headers: &HeaderMap, body: &Bytes) -> (String, bool) {
    if is_text_response(headers)
        && let Ok(text) = std::str::from_utf8(body)
    {
        return (text.to_string(), false);
    }
    (BASE64.encode(body), true)
}

fn is_text_response(headers: &HeaderMap) -> bool {
    if headers.contains_key(CONTENT_ENCODING) {
        return false;
    }
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.starts_with("text/")
        || essence == "application/json"
        || essence == "application/javascript"
        || essence == "application/xml"
        || essence.ends_with("+json")
        || essence.ends_with("+xml")
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.append(name, value);
    }
}
