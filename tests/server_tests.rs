//! # HTTP Server Tests
//!
//! Health, readiness and metrics endpoints.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use cloud_secrets::controller::server::{router, serve, ServerState};
use cloud_secrets::observability::Metrics;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn get(state: &Arc<ServerState>, path: &str) -> (StatusCode, String) {
    let response = router(Arc::clone(state))
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn state() -> Arc<ServerState> {
    Arc::new(ServerState::new(Metrics::new().unwrap()))
}

#[tokio::test]
async fn test_healthz_always_ok() {
    let state = state();
    assert_eq!(get(&state, "/healthz").await, (StatusCode::OK, "OK".to_string()));
}

#[tokio::test]
async fn test_readyz_follows_state() {
    let state = state();
    assert_eq!(get(&state, "/readyz").await.0, StatusCode::SERVICE_UNAVAILABLE);

    state.set_ready(true);
    assert_eq!(get(&state, "/readyz").await.0, StatusCode::OK);

    state.set_ready(false);
    assert_eq!(get(&state, "/readyz").await.0, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_exposes_sync_metrics() {
    let state = state();
    state.metrics.set_last_sync_timestamp(1_700_000_000.5);
    state.metrics.record_sync("success", 0.25);

    let (status, body) = get(&state, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("cloud_secret_controller_last_sync_timestamp_seconds 1700000000.5"));
    assert!(body.contains(r#"cloud_secret_controller_sync_total{result="success"} 1"#));
    assert!(body.contains("cloud_secret_controller_sync_duration_seconds_bucket"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    assert_eq!(get(&state(), "/secret").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_serve_stops_on_cancel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(serve(listener, state(), cancel.clone()));

    cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}
