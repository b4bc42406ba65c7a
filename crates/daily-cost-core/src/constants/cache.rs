// ABOUTME: Cache-related constants for TTL, capacity, cleanup intervals, and key prefixes
// ABOUTME: Supports both in-memory and Redis cache backends with sensible defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Default maximum cache entries for in-memory cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default cleanup interval in seconds for expired entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Namespace prefix applied to every Redis key
pub const CACHE_KEY_PREFIX: &str = "daily_cost:";

/// Key prefix for login session records
pub const LOGIN_SESSION_KEY_PREFIX: &str = "wechat_session:";

/// Key prefix mapping an OAuth `state` to its login session
pub const LOGIN_STATE_KEY_PREFIX: &str = "wechat_state:";

/// Key of the cached WeChat app-level access token
pub const APP_ACCESS_TOKEN_KEY: &str = "wechat_access_token";

/// Key prefix for revoked JWT ids
pub const REVOKED_TOKEN_KEY_PREFIX: &str = "revoked_token:";

/// Redis connection timeout in seconds
pub const REDIS_CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Redis response timeout in seconds
pub const REDIS_RESPONSE_TIMEOUT_SECS: u64 = 3;

/// Reconnection attempts after a dropped Redis connection
pub const REDIS_RECONNECTION_RETRIES: usize = 6;

/// Exponential backoff base for Redis reconnects
pub const REDIS_RETRY_EXPONENT_BASE: u64 = 2;

/// Upper bound for any Redis retry delay in milliseconds
pub const REDIS_MAX_RETRY_DELAY_MS: u64 = 5_000;

/// Attempts for the initial Redis connection at startup
pub const REDIS_INITIAL_CONNECTION_RETRIES: u32 = 3;

/// First retry delay for the initial Redis connection in milliseconds
pub const REDIS_INITIAL_RETRY_DELAY_MS: u64 = 500;
