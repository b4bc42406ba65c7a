// ABOUTME: Success envelope shared by every JSON endpoint
// ABOUTME: Serializes `{success, message, data, code}` with the HTTP status matching `code`
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

pub use crate::models::PaginatedData;

/// Successful response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true`
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Payload, `null` when there is nothing to return
    pub data: Option<T>,
    /// HTTP status code
    pub code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// 201 with the created resource
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            code: status.as_u16(),
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok("done", serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "done", "data": {"id": 1}, "code": 200})
        );

        let empty = serde_json::to_value(ApiResponse::message("bye")).unwrap();
        assert_eq!(empty["data"], serde_json::Value::Null);
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("made", 5).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
