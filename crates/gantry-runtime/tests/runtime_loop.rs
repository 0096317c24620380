//! Runtime loop tests against a mock Runtime API server.
//!
//! The mock serves a fixed list of invocation events on the next-event
//! endpoint, then holds further polls open; posted replies and error
//! reports are recorded for assertion.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use gantry_core::InvocationContext;
use gantry_runtime::{RuntimeClient, handler_fn, run_with_client};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::watch;

#[derive(Debug)]
struct Posted {
    path: String,
    body: Vec<u8>,
    error_type: Option<String>,
}

struct MockRuntimeApi {
    events: Vec<Value>,
    served: AtomicUsize,
    posted: Mutex<Vec<Posted>>,
}

async fn spawn_mock(events: Vec<Value>) -> (SocketAddr, Arc<MockRuntimeApi>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(MockRuntimeApi {
        events,
        served: AtomicUsize::new(0),
        posted: Mutex::new(Vec::new()),
    });

    let accept_state = state.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let conn_state = accept_state.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let svc = service_fn(move |req| handle(conn_state.clone(), req));
                let _ = http1::Builder::new().serve_connection(io, svc).await;
            });
        }
    });

    (addr, state)
}

async fn handle(
    state: Arc<MockRuntimeApi>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();

    if path.ends_with("/runtime/invocation/next") {
        let index = state.served.fetch_add(1, Ordering::SeqCst);
        if let Some(event) = state.events.get(index) {
            let body = serde_json::to_vec(event).unwrap();
            return Ok(Response::builder()
                .header("lambda-runtime-aws-request-id", format!("req-{index}"))
                .header("lambda-runtime-deadline-ms", "1766500000000")
                .header(
                    "lambda-runtime-invoked-function-arn",
                    "arn:aws:lambda:local:000000000000:function:mock",
                )
                .body(Full::new(Bytes::from(body)))
                .unwrap());
        }
        // Out of events: hold the long poll open like the platform does.
        tokio::time::sleep(Duration::from_secs(60)).await;
        return Ok(Response::builder()
            .status(204)
            .body(Full::new(Bytes::new()))
            .unwrap());
    }

    let error_type = req
        .headers()
        .get("lambda-runtime-function-error-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = req.into_body().collect().await.unwrap().to_bytes().to_vec();
    state.posted.lock().unwrap().push(Posted {
        path,
        body,
        error_type,
    });

    Ok(Response::builder()
        .status(202)
        .body(Full::new(Bytes::from_static(b"{}")))
        .unwrap())
}

async fn wait_for_posts(state: &MockRuntimeApi, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if state.posted.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for runtime API posts");
}

#[tokio::test]
async fn loop_posts_the_handler_reply() {
    let (addr, state) = spawn_mock(vec![json!("hello")]).await;
    let client = RuntimeClient::new(&format!("http://{addr}")).unwrap();
    let handler = handler_fn(|event: String, _ctx: InvocationContext| async move {
        Ok::<_, Infallible>(event.to_uppercase())
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_with_client(client, handler, shutdown_rx));

    wait_for_posts(&state, 1).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    let posted = state.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].path, "/2018-06-01/runtime/invocation/req-0/response");
    assert_eq!(posted[0].body, b"\"HELLO\"");
    assert_eq!(posted[0].error_type, None);
}

#[tokio::test]
async fn loop_survives_a_handler_fault() {
    let (addr, state) = spawn_mock(vec![json!("first"), json!("second")]).await;
    let client = RuntimeClient::new(&format!("http://{addr}")).unwrap();

    let mut calls = 0u32;
    let handler = handler_fn(move |event: String, _ctx: InvocationContext| {
        calls += 1;
        let fail = calls == 1;
        async move {
            if fail {
                Err(std::io::Error::other("transient dependency failure"))
            } else {
                Ok(event)
            }
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_with_client(client, handler, shutdown_rx));

    wait_for_posts(&state, 2).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    let posted = state.posted.lock().unwrap();
    assert_eq!(posted[0].path, "/2018-06-01/runtime/invocation/req-0/error");
    assert_eq!(posted[0].error_type.as_deref(), Some("Unhandled"));
    let report: Value = serde_json::from_slice(&posted[0].body).unwrap();
    assert_eq!(report["errorType"], "HandlerError");
    assert_eq!(report["errorMessage"], "transient dependency failure");

    assert_eq!(posted[1].path, "/2018-06-01/runtime/invocation/req-1/response");
    assert_eq!(posted[1].body, b"\"second\"");
}

#[tokio::test]
async fn loop_reports_undecodable_events() {
    // The handler wants a number; the platform delivers a string.
    let (addr, state) = spawn_mock(vec![json!("not a number")]).await;
    let client = RuntimeClient::new(&format!("http://{addr}")).unwrap();
    let handler = handler_fn(|event: u64, _ctx: InvocationContext| async move {
        Ok::<_, Infallible>(event)
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_with_client(client, handler, shutdown_rx));

    wait_for_posts(&state, 1).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    let posted = state.posted.lock().unwrap();
    assert_eq!(posted[0].path, "/2018-06-01/runtime/invocation/req-0/error");
}

#[tokio::test]
async fn init_error_reaches_the_runtime_api() {
    let (addr, state) = spawn_mock(vec![]).await;
    let client = RuntimeClient::new(&format!("http://{addr}")).unwrap();

    let report = gantry_runtime::ErrorReport::new("InitError", "configuration rejected");
    client.post_init_error(&report).await.unwrap();

    let posted = state.posted.lock().unwrap();
    assert_eq!(posted[0].path, "/2018-06-01/runtime/init/error");
    assert_eq!(posted[0].error_type.as_deref(), Some("Unhandled"));
    let body: Value = serde_json::from_slice(&posted[0].body).unwrap();
    assert_eq!(body["errorType"], "InitError");
}

#[tokio::test]
async fn client_parses_the_invocation_context() {
    let (addr, _state) = spawn_mock(vec![json!({"ping": true})]).await;
    let client = RuntimeClient::new(&format!("http://{addr}")).unwrap();

    let (context, payload) = client.next_invocation().await.unwrap();
    assert_eq!(context.request_id, "req-0");
    assert_eq!(context.deadline_ms, 1766500000000);
    assert!(context.invoked_function_arn.ends_with("function:mock"));
    let event: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(event, json!({"ping": true}));
}
