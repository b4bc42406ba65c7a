// ABOUTME: Cache backend settings and Redis connection tuning from the environment
// ABOUTME: Redis is used when a URL is configured, otherwise the in-memory backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::constants::cache;
use serde::{Deserialize, Serialize};
use std::env;

/// Cache backend selection and sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Redis URL for the shared cache (optional)
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Maximum number of entries in the in-memory cache
    pub max_entries: usize,
    /// In-memory cleanup interval in seconds
    pub cleanup_interval_secs: u64,
    /// Redis connection configuration
    #[serde(default)]
    pub redis_connection: RedisConnectionConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            max_entries: cache::DEFAULT_CACHE_MAX_ENTRIES,
            cleanup_interval_secs: cache::DEFAULT_CLEANUP_INTERVAL_SECS,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

impl CacheSettings {
    /// Load cache settings from environment
    ///
    /// `REDIS_URL` wins over the legacy `REDIS_CONNECTION` name.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .or_else(|_| env::var("REDIS_CONNECTION"))
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_entries: parse_or("CACHE_MAX_ENTRIES", cache::DEFAULT_CACHE_MAX_ENTRIES),
            cleanup_interval_secs: parse_or(
                "CACHE_CLEANUP_INTERVAL_SECS",
                cache::DEFAULT_CLEANUP_INTERVAL_SECS,
            ),
            redis_connection: RedisConnectionConfig::from_env(),
        }
    }
}

/// Redis connection and retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConnectionConfig {
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
    /// Response/command timeout in seconds
    pub response_timeout_secs: u64,
    /// Number of reconnection retries after connection drop
    pub reconnection_retries: usize,
    /// Exponential backoff base for retry delays
    pub retry_exponent_base: u64,
    /// Maximum retry delay in milliseconds
    pub max_retry_delay_ms: u64,
    /// Number of retries for initial connection at startup
    pub initial_connection_retries: u32,
    /// Initial retry delay in milliseconds (doubles with exponential backoff)
    pub initial_retry_delay_ms: u64,
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: cache::REDIS_CONNECTION_TIMEOUT_SECS,
            response_timeout_secs: cache::REDIS_RESPONSE_TIMEOUT_SECS,
            reconnection_retries: cache::REDIS_RECONNECTION_RETRIES,
            retry_exponent_base: cache::REDIS_RETRY_EXPONENT_BASE,
            max_retry_delay_ms: cache::REDIS_MAX_RETRY_DELAY_MS,
            initial_connection_retries: cache::REDIS_INITIAL_CONNECTION_RETRIES,
            initial_retry_delay_ms: cache::REDIS_INITIAL_RETRY_DELAY_MS,
        }
    }
}

impl RedisConnectionConfig {
    /// Load Redis connection configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connection_timeout_secs: parse_or(
                "REDIS_CONNECTION_TIMEOUT_SECS",
                cache::REDIS_CONNECTION_TIMEOUT_SECS,
            ),
            response_timeout_secs: parse_or(
                "REDIS_RESPONSE_TIMEOUT_SECS",
                cache::REDIS_RESPONSE_TIMEOUT_SECS,
            ),
            reconnection_retries: parse_or(
                "REDIS_RECONNECTION_RETRIES",
                cache::REDIS_RECONNECTION_RETRIES,
            ),
            retry_exponent_base: parse_or(
                "REDIS_RETRY_EXPONENT_BASE",
                cache::REDIS_RETRY_EXPONENT_BASE,
            ),
            max_retry_delay_ms: parse_or("REDIS_MAX_RETRY_DELAY_MS", cache::REDIS_MAX_RETRY_DELAY_MS),
            initial_connection_retries: parse_or(
                "REDIS_INITIAL_CONNECTION_RETRIES",
                cache::REDIS_INITIAL_CONNECTION_RETRIES,
            ),
            initial_retry_delay_ms: parse_or(
                "REDIS_INITIAL_RETRY_DELAY_MS",
                cache::REDIS_INITIAL_RETRY_DELAY_MS,
            ),
        }
    }
}

/// Read and parse an environment variable, falling back on absence or parse failure
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
