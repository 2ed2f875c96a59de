//! # One-Shot Mode Tests
//!
//! End-to-end runs of the runtime with `--once`, against a local Google endpoint.

mod common;

use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use cloud_secrets::config::Config;
use cloud_secrets::runtime;
use serde_json::json;
use std::net::SocketAddr;

fn once_config(endpoint: SocketAddr, secret: &str) -> Config {
    Config::try_parse_from([
        "cloud-secrets",
        "--once",
        "--provider",
        "google",
        "--secret-name",
        secret,
        "--google-project-id",
        "my-project",
        "--google-endpoint",
        &format!("http://{endpoint}"),
        "--google-access-token",
        "ya29.test-token",
        "--metrics-address",
        "127.0.0.1:0",
    ])
    .unwrap()
}

#[tokio::test]
async fn test_one_shot_success() {
    common::init_rustls();
    let router = Router::new().route(
        "/v1/projects/my-project/secrets/db-password/versions/latest:access",
        get(|| async {
            Json(json!({
                "name": "projects/my-project/secrets/db-password/versions/1",
                "payload": { "data": "aHVudGVyMg==" }
            }))
        }),
    );
    let addr = common::spawn_mock(router).await;

    let config = once_config(addr, "db-password");
    config.validate().unwrap();
    runtime::execute(&config).await.unwrap();
}

#[tokio::test]
async fn test_one_shot_unreachable_provider_fails() {
    common::init_rustls();
    let config = once_config(common::closed_port().await, "db-password");

    let error = runtime::execute(&config).await.unwrap_err();
    let chain = format!("{error:#}");
    assert!(chain.contains("Failed to synchronize secret 'db-password'"), "{chain}");
    assert!(chain.contains("transport error"), "{chain}");
}

#[tokio::test]
async fn test_one_shot_missing_secret_fails() {
    common::init_rustls();
    let addr = common::spawn_mock(Router::new()).await;
    let config = once_config(addr, "missing");

    let error = runtime::execute(&config).await.unwrap_err();
    assert!(format!("{error:#}").contains("not found"));
}

#[test]
fn test_unknown_provider_fails_before_scheduling() {
    assert!(Config::try_parse_from([
        "cloud-secrets",
        "--once",
        "--provider",
        "oracle",
        "--secret-name",
        "db-password",
    ])
    .is_err());
}
