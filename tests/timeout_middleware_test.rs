// ABOUTME: Integration tests for the request deadline middleware
// ABOUTME: Slow handlers get a REQUEST_TIMEOUT envelope, fast ones pass through untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use axum::{
    body::{to_bytes, Body},
    http::{Request as HttpRequest, StatusCode},
    middleware,
    routing::get,
    Router,
};
use daily_cost_server::middleware::request_timeout_middleware;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tower::ServiceExt;

async fn slow_handler() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

async fn fast_handler() -> &'static str {
    "done"
}

fn app(limit: Duration) -> Router {
    Router::new()
        .route("/slow", get(slow_handler))
        .route("/fast", get(fast_handler))
        .layer(middleware::from_fn_with_state(limit, request_timeout_middleware))
}

#[tokio::test]
async fn test_slow_request_gets_timeout_envelope() -> Result<(), Box<dyn Error>> {
    let request = HttpRequest::builder().uri("/slow").body(Body::empty())?;
    let response = app(Duration::from_millis(50)).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 408);
    assert_eq!(body["error_code"], "REQUEST_TIMEOUT");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("50ms")));
    Ok(())
}

#[tokio::test]
async fn test_fast_request_is_untouched() -> Result<(), Box<dyn Error>> {
    let request = HttpRequest::builder().uri("/fast").body(Body::empty())?;
    let response = app(Duration::from_secs(1)).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"done");
    Ok(())
}
