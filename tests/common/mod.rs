//! Common test utilities
//!
//! Provides shared initialization code for integration tests, including
//! rustls crypto provider setup and local mock endpoints.

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers")]

use async_trait::async_trait;
use axum::Router;
use cloud_secrets::provider::{SecretError, SecretProvider, SecretValue};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tokio::net::TcpListener;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        cloud_secrets::runtime::initialization::install_crypto_provider();
    });
}

/// Serve `router` on an ephemeral localhost port
pub async fn spawn_mock(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Mock server failed");
    });
    addr
}

/// An address nothing listens on
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("Probe listener has no address");
    drop(listener);
    addr
}

/// Provider returning a fixed value (or `NotFound`) and counting calls
#[derive(Debug)]
pub struct CountingProvider {
    value: Option<String>,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn ok(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            value: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for CountingProvider {
    fn provider_name(&self) -> &'static str {
        "counting"
    }

    async fn get_secret(&self, secret_name: &str) -> Result<SecretValue, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.value {
            Some(value) => Ok(SecretValue::text(value.clone())),
            None => Err(SecretError::InternalService {
                provider: "counting",
                message: format!("backend unavailable for '{secret_name}'"),
            }),
        }
    }
}
