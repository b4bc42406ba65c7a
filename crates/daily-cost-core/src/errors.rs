// ABOUTME: Unified error types, error codes, and the JSON error envelope
// ABOUTME: Maps every failure to a string code and HTTP status for consistent API responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the service returns [`AppResult`]. An [`AppError`]
//! carries a machine readable [`ErrorCode`] that serializes as a
//! `SCREAMING_SNAKE_CASE` string, a human readable message, and optional
//! structured details. Over HTTP the error renders as the envelope
//!
//! ```json
//! {"success": false, "message": "...", "error_code": "ITEM_NOT_FOUND", "data": null, "code": 404}
//! ```
//!
//! where `code` always equals the HTTP status of the response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Whether 5xx envelopes include the underlying error message (debug mode)
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Toggle inclusion of internal error details in 5xx responses
pub fn set_expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

/// Whether internal error details are currently exposed
#[must_use]
pub fn expose_internal_errors() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed)
}

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication
    /// No bearer token was presented
    AuthRequired,
    /// Token failed signature or format checks, or was revoked
    AuthInvalid,
    /// Token is past its expiry
    AuthExpired,
    /// An access token was presented where a refresh token is required, or vice versa
    WrongTokenType,
    /// Refresh token could not be validated
    InvalidRefreshToken,
    /// Token claims lack a usable subject
    MissingUserInfo,
    /// Token subject does not match a live user
    UserNotFound,

    // Validation
    /// Request body or query failed validation
    ValidationError,
    /// `start_date` filter is not a valid `YYYY-MM-DD` date
    InvalidStartDate,
    /// `end_date` filter is not a valid `YYYY-MM-DD` date
    InvalidEndDate,

    // Resources
    /// Item does not exist, is deleted, or belongs to another user
    ItemNotFound,
    /// Batch delete matched nothing
    NoItemsFound,
    /// Login session does not exist or has expired
    SessionNotFound,
    /// Login session cannot move to the requested status
    InvalidSessionTransition,
    /// No route matches the request path
    RouteNotFound,

    // External services
    /// WeChat returned an error payload
    WechatAuthError,
    /// WeChat could not be reached or returned an unreadable response
    WechatRequestError,

    // Internal
    /// Configuration is missing or invalid
    ConfigError,
    /// Database operation failed
    DatabaseError,
    /// Cache backend operation failed
    CacheError,
    /// JSON encoding or decoding failed
    SerializationError,
    /// The request did not finish within the server timeout
    RequestTimeout,
    /// A dependency is not ready to serve traffic
    ServiceUnavailable,
    /// Catch-all for unexpected failures
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ValidationError
            | Self::InvalidStartDate
            | Self::InvalidEndDate
            | Self::WechatAuthError => 400,

            Self::AuthRequired
            | Self::AuthInvalid
            | Self::AuthExpired
            | Self::WrongTokenType
            | Self::InvalidRefreshToken
            | Self::MissingUserInfo
            | Self::UserNotFound => 401,

            Self::ItemNotFound
            | Self::NoItemsFound
            | Self::SessionNotFound
            | Self::RouteNotFound => 404,

            Self::RequestTimeout => 408,

            Self::InvalidSessionTransition => 409,

            Self::WechatRequestError => 502,

            Self::ServiceUnavailable => 503,

            Self::ConfigError
            | Self::DatabaseError
            | Self::CacheError
            | Self::SerializationError
            | Self::InternalError => 500,
        }
    }

    /// Wire representation of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthInvalid => "AUTH_INVALID",
            Self::AuthExpired => "AUTH_EXPIRED",
            Self::WrongTokenType => "WRONG_TOKEN_TYPE",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::MissingUserInfo => "MISSING_USER_INFO",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidStartDate => "INVALID_START_DATE",
            Self::InvalidEndDate => "INVALID_END_DATE",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::NoItemsFound => "NO_ITEMS_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::InvalidSessionTransition => "INVALID_SESSION_TRANSITION",
            Self::RouteNotFound => "ROUTE_NOT_FOUND",
            Self::WechatAuthError => "WECHAT_AUTH_ERROR",
            Self::WechatRequestError => "WECHAT_REQUEST_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CacheError => "CACHE_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::WrongTokenType => "The token type is not valid for this operation",
            Self::InvalidRefreshToken => "The refresh token is invalid",
            Self::MissingUserInfo => "The token does not identify a user",
            Self::UserNotFound => "The user no longer exists",
            Self::ValidationError => "The request failed validation",
            Self::InvalidStartDate => "The start date is invalid",
            Self::InvalidEndDate => "The end date is invalid",
            Self::ItemNotFound => "The requested item was not found",
            Self::NoItemsFound => "No matching items were found",
            Self::SessionNotFound => "The login session was not found or has expired",
            Self::InvalidSessionTransition => "The login session cannot change to that status",
            Self::RouteNotFound => "No endpoint matches the request path",
            Self::WechatAuthError => "WeChat rejected the authorization request",
            Self::WechatRequestError => "The WeChat API request failed",
            Self::ConfigError => "Configuration error encountered",
            Self::DatabaseError => "Database operation failed",
            Self::CacheError => "Cache operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::RequestTimeout => "The request took too long to process",
            Self::ServiceUnavailable => "The service is temporarily unavailable",
            Self::InternalError => "An internal server error occurred",
        }
    }

    /// Whether the message of this error must be hidden from clients
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::ConfigError
                | Self::DatabaseError
                | Self::CacheError
                | Self::SerializationError
                | Self::InternalError
        )
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {message}", code.as_str())]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details rendered as the envelope `data`
    pub details: Option<Value>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authentication expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Authentication token has expired")
    }

    /// Token of the wrong kind was presented
    #[must_use]
    pub fn wrong_token_type(expected: &str) -> Self {
        Self::new(
            ErrorCode::WrongTokenType,
            format!("Invalid token type, expected {expected} token"),
        )
    }

    /// Refresh token failed validation
    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRefreshToken, message)
    }

    /// Token subject missing or unparsable
    #[must_use]
    pub fn missing_user_info() -> Self {
        Self::new(ErrorCode::MissingUserInfo, "Token does not contain user information")
    }

    /// Token subject does not resolve to a live user
    #[must_use]
    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found")
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Unparsable `start_date` filter
    #[must_use]
    pub fn invalid_start_date(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidStartDate,
            format!("Invalid start date '{value}', expected YYYY-MM-DD"),
        )
    }

    /// Unparsable `end_date` filter
    #[must_use]
    pub fn invalid_end_date(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidEndDate,
            format!("Invalid end date '{value}', expected YYYY-MM-DD"),
        )
    }

    /// Item lookup failed
    #[must_use]
    pub fn item_not_found(item_id: i64) -> Self {
        Self::new(ErrorCode::ItemNotFound, format!("Item {item_id} not found"))
    }

    /// Batch operation matched nothing
    #[must_use]
    pub fn no_items_found() -> Self {
        Self::new(ErrorCode::NoItemsFound, "No matching items found")
    }

    /// Login session missing or expired
    #[must_use]
    pub fn session_not_found(session_id: &str) -> Self {
        Self::new(
            ErrorCode::SessionNotFound,
            format!("Login session {session_id} not found or expired"),
        )
    }

    /// Illegal login session transition
    #[must_use]
    pub fn invalid_session_transition(from: &str, to: &str) -> Self {
        Self::new(
            ErrorCode::InvalidSessionTransition,
            format!("Login session cannot change from {from} to {to}"),
        )
    }

    /// WeChat returned an error payload
    pub fn wechat_auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::WechatAuthError, message)
    }

    /// WeChat transport failure
    pub fn wechat_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::WechatRequestError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Cache backend error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CacheError, message)
    }

    /// Dependency not ready
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Request exceeded the server timeout
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RequestTimeout, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// HTTP error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Machine-readable error code
    pub error_code: ErrorCode,
    /// Optional structured details
    pub data: Option<Value>,
    /// HTTP status code
    pub code: u16,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = error.http_status();
        if error.code.is_internal() {
            let data = if expose_internal_errors() {
                let mut detail = serde_json::json!({ "error": error.message });
                if let Some(source) = &error.source {
                    detail["source"] = Value::String(source.to_string());
                }
                Some(detail)
            } else {
                None
            };
            return Self {
                success: false,
                message: error.code.description().to_owned(),
                error_code: error.code,
                data,
                code,
            };
        }

        Self {
            success: false,
            message: error.message,
            error_code: error.code,
            data: error.details,
            code,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON processing failed: {error}"),
        )
        .with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(format!("Database query failed: {error}")).with_source(error)
    }
}

#[cfg(feature = "cache-errors")]
impl From<redis::RedisError> for AppError {
    fn from(error: redis::RedisError) -> Self {
        Self::cache(format!("Redis operation failed: {error}")).with_source(error)
    }
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "WeChat API request timed out".to_owned()
        } else if error.is_decode() {
            format!("WeChat API returned an unreadable response: {error}")
        } else {
            format!("WeChat API request failed: {error}")
        };
        Self::wechat_request(message).with_source(error)
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use super::{AppError, ErrorResponse};
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if status.is_server_error() {
                tracing::error!(
                    error_code = self.code.as_str(),
                    status = status.as_u16(),
                    "Request failed: {}",
                    self.message
                );
            } else {
                tracing::debug!(
                    error_code = self.code.as_str(),
                    status = status.as_u16(),
                    "Request rejected: {}",
                    self.message
                );
            }

            (status, Json(ErrorResponse::from(self))).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::WrongTokenType.http_status(), 401);
        assert_eq!(ErrorCode::ValidationError.http_status(), 400);
        assert_eq!(ErrorCode::ItemNotFound.http_status(), 404);
        assert_eq!(ErrorCode::RequestTimeout.http_status(), 408);
        assert_eq!(ErrorCode::InvalidSessionTransition.http_status(), 409);
        assert_eq!(ErrorCode::WechatRequestError.http_status(), 502);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_error_code_serializes_as_string() {
        let json = serde_json::to_string(&ErrorCode::InvalidStartDate).unwrap();
        assert_eq!(json, "\"INVALID_START_DATE\"");
        let json = serde_json::to_string(&ErrorCode::WechatAuthError).unwrap();
        assert_eq!(json, "\"WECHAT_AUTH_ERROR\"");
    }

    #[test]
    fn test_as_str_matches_serde() {
        for code in [
            ErrorCode::AuthExpired,
            ErrorCode::NoItemsFound,
            ErrorCode::SessionNotFound,
            ErrorCode::ServiceUnavailable,
            ErrorCode::RequestTimeout,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, Value::String(code.as_str().to_owned()));
        }
    }

    #[test]
    fn test_envelope_for_client_error_keeps_message() {
        let response = ErrorResponse::from(
            AppError::item_not_found(7).with_details(serde_json::json!({"id": 7})),
        );
        assert!(!response.success);
        assert_eq!(response.code, 404);
        assert_eq!(response.error_code, ErrorCode::ItemNotFound);
        assert_eq!(response.message, "Item 7 not found");
        assert_eq!(response.data, Some(serde_json::json!({"id": 7})));
    }

    #[test]
    fn test_envelope_for_internal_error_hides_message() {
        set_expose_internal_errors(false);
        let response = ErrorResponse::from(AppError::database("connection refused on db.sock"));
        assert_eq!(response.code, 500);
        assert_eq!(response.message, ErrorCode::DatabaseError.description());
        assert!(response.data.is_none());
    }
}
