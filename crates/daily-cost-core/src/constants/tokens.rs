// ABOUTME: JWT token lifetime defaults and claim type markers
// ABOUTME: Shared by the token issuer and the authentication middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Default refresh token lifetime in minutes (7 days)
pub const DEFAULT_REFRESH_TOKEN_EXPIRE_MINUTES: i64 = 10_080;

/// `type` claim of access tokens
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// `type` claim of refresh tokens
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// `token_type` returned to clients
pub const BEARER: &str = "bearer";

/// Minimum JWT secret length accepted in production
pub const MIN_JWT_SECRET_BYTES: usize = 32;
