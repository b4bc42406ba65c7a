// ABOUTME: Integration tests for the request ID middleware
// ABOUTME: Verifies id generation, reuse of inbound ids, and availability in handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request as HttpRequest, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};
use daily_cost_server::middleware::request_id::{
    request_id_middleware, RequestId, REQUEST_ID_HEADER,
};
use std::error::Error;
use tower::ServiceExt;
use uuid::Uuid;

async fn echo_handler(Extension(request_id): Extension<RequestId>) -> String {
    format!("Request ID: {}", request_id.as_str())
}

fn echo_app() -> Router {
    Router::new()
        .route("/", get(echo_handler))
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn test_request_id_middleware_generates_id() -> Result<(), Box<dyn Error>> {
    let request = HttpRequest::builder().uri("/").body(Body::empty())?;
    let response = echo_app().oneshot(request).await?;

    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("Request ID header not present");
    assert!(
        Uuid::parse_str(header.to_str()?).is_ok(),
        "Request ID is not a valid UUID"
    );
    Ok(())
}

#[tokio::test]
async fn test_request_id_matches_handler_extension() -> Result<(), Box<dyn Error>> {
    let request = HttpRequest::builder().uri("/").body(Body::empty())?;
    let response = echo_app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .unwrap()
        .to_str()?
        .to_owned();

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let body = String::from_utf8(body.to_vec())?;
    assert_eq!(body, format!("Request ID: {header}"));
    Ok(())
}

#[tokio::test]
async fn test_inbound_uuid_is_reused() -> Result<(), Box<dyn Error>> {
    let inbound = Uuid::new_v4().to_string();
    let request = HttpRequest::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, &inbound)
        .body(Body::empty())?;
    let response = echo_app().oneshot(request).await?;

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), inbound.as_str());
    Ok(())
}

#[tokio::test]
async fn test_malformed_inbound_id_is_replaced() -> Result<(), Box<dyn Error>> {
    let request = HttpRequest::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, "not-a-uuid")
        .body(Body::empty())?;
    let response = echo_app().oneshot(request).await?;

    let header = response.headers().get(REQUEST_ID_HEADER).unwrap().to_str()?;
    assert!(Uuid::parse_str(header).is_ok());
    Ok(())
}

#[tokio::test]
async fn test_each_request_gets_distinct_id() -> Result<(), Box<dyn Error>> {
    let app = echo_app();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let request = HttpRequest::builder().uri("/").body(Body::empty())?;
        let response = app.clone().oneshot(request).await?;
        ids.push(
            response
                .headers()
                .get(REQUEST_ID_HEADER)
                .unwrap()
                .to_str()?
                .to_owned(),
        );
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_full_router_sets_request_id_on_errors() -> Result<(), Box<dyn Error>> {
    let (app, _resources) = common::create_test_app().await?;
    let request = HttpRequest::builder()
        .uri("/no/such/route")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    Ok(())
}
