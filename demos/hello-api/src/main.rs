//! The whole binding: build the application object, wrap it in the
//! adapter, hand it to the runtime trampoline.

use axum::Router;
use axum::routing::get;
use bytes::Bytes;
use gantry_http::Adapter;
use http::Request;
use http_body_util::Full;
use serde_json::json;
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from gantry!" }))
        .route("/healthz", get(|| async { axum::Json(json!({"status": "ok"})) }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,gantry_http=debug,gantry_runtime=debug".parse().unwrap()
                }),
        )
        .init();

    let app = app().map_request(|req: Request<Full<Bytes>>| req.map(axum::body::Body::new));
    gantry_runtime::run(Adapter::new(app)).await?;
    Ok(())
}
