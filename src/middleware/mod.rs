// ABOUTME: HTTP middleware for authentication, CORS, request correlation, and deadlines
// ABOUTME: Provides bearer token authentication, CORS layer setup, and request ID propagation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Bearer token authentication and token revocation
pub mod auth;
/// Cross-origin resource sharing layer
pub mod cors;
/// Request ID generation and propagation
pub mod request_id;
/// Whole-request deadline with an enveloped timeout response
pub mod timeout;

pub use auth::{AuthMiddleware, AuthenticatedUser};
pub use cors::setup_cors;
pub use request_id::{request_id_middleware, RequestId};
pub use timeout::request_timeout_middleware;
