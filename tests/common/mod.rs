// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use meal_tracker::config::Config;
use meal_tracker::routes::create_router;
use meal_tracker::services::BackendClient;
use meal_tracker::AppState;
use std::sync::Arc;

/// Spawn a stub backend on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Create a gateway app wired to the given backend base URL.
#[allow(dead_code)]
pub fn create_test_app(backend_url: &str) -> axum::Router {
    let mut config = Config::test_default();
    config.backend_url = backend_url.to_string();

    let backend = BackendClient::new(config.backend_url.clone(), config.api_key.clone());
    let state = Arc::new(AppState { config, backend });
    create_router(state)
}

/// Gateway app whose backend is unreachable. Good enough for tests that
/// must be rejected before any backend call.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    create_test_app("http://127.0.0.1:9")
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
