// ABOUTME: Request deadline middleware that answers slow requests with the error envelope
// ABOUTME: Wraps the downstream service in a tokio timeout and renders REQUEST_TIMEOUT on expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tokio::time::timeout;

/// Abort the request once `limit` elapses
///
/// Install with `axum::middleware::from_fn_with_state(limit, request_timeout_middleware)`.
/// The handler future is dropped on expiry.
pub async fn request_timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    match timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %path, limit_ms = limit.as_millis(), "Request timed out");
            AppError::request_timeout(format!(
                "Request timed out after {}ms",
                limit.as_millis()
            ))
            .into_response()
        }
    }
}
