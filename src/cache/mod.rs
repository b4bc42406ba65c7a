// ABOUTME: Cache abstraction layer for login sessions, provider tokens, and token revocation
// ABOUTME: Pluggable backend support (in-memory, Redis) selected from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Cache factory for creating cache providers
pub mod factory;
/// In-memory cache implementation
pub mod memory;
/// Redis cache implementation
pub mod redis;

pub use factory::Cache;

use crate::config::{CacheSettings, RedisConnectionConfig};
use crate::constants::cache::{
    APP_ACCESS_TOKEN_KEY, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS,
    LOGIN_SESSION_KEY_PREFIX, LOGIN_STATE_KEY_PREFIX, REVOKED_TOKEN_KEY_PREFIX,
};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Cache provider trait for pluggable backend implementations
///
/// Values are stored as JSON with a mandatory TTL. A key whose TTL elapsed
/// reads as absent on every backend.
///
/// # Examples
///
/// ```rust,no_run
/// use daily_cost_server::cache::{CacheConfig, CacheKey, CacheProvider};
/// use daily_cost_server::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), daily_cost_server::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// };
/// let cache = InMemoryCache::new(config).await?;
///
/// let key = CacheKey::RevokedToken { jti: "3f1c".to_owned() };
/// cache.set(&key, &true, Duration::from_secs(60)).await?;
///
/// let revoked: Option<bool> = cache.get(&key).await?;
/// assert_eq!(revoked, Some(true));
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Store value only when the key is absent or expired, as one atomic step
    ///
    /// Returns `true` when this call stored the value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set_if_absent<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<bool>;

    /// Retrieve value from cache
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Check if key exists in cache
    ///
    /// # Errors
    ///
    /// Returns an error if existence check fails
    async fn exists(&self, key: &CacheKey) -> AppResult<bool>;

    /// Get remaining TTL for key
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>>;

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    async fn health_check(&self) -> AppResult<()>;

    /// Clear all cache entries (for testing/admin)
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (for in-memory cache)
    pub max_entries: usize,
    /// Redis connection URL (for Redis cache)
    pub redis_url: Option<String>,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Enable background cleanup task (should be false in tests to avoid runtime conflicts)
    pub enable_background_cleanup: bool,
    /// Redis connection and retry configuration
    pub redis_connection: RedisConnectionConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: None,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            max_entries: settings.max_entries,
            redis_url: settings.redis_url.clone(),
            cleanup_interval: Duration::from_secs(settings.cleanup_interval_secs),
            enable_background_cleanup: true,
            redis_connection: settings.redis_connection.clone(),
        }
    }
}

/// Structured cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// QR login session record
    LoginSession {
        /// Session identifier handed to the client
        session_id: String,
    },
    /// OAuth `state` to session id mapping
    LoginState {
        /// Opaque state echoed by the provider callback
        state: String,
    },
    /// Application-level provider credential
    AppAccessToken,
    /// Revoked JWT marker, kept until the token would have expired
    RevokedToken {
        /// Token id claim
        jti: String,
    },
}

impl CacheKey {
    /// Key for a login session
    #[must_use]
    pub fn login_session(session_id: impl Into<String>) -> Self {
        Self::LoginSession {
            session_id: session_id.into(),
        }
    }

    /// Key for a state mapping
    #[must_use]
    pub fn login_state(state: impl Into<String>) -> Self {
        Self::LoginState {
            state: state.into(),
        }
    }

    /// Key for a revoked token id
    #[must_use]
    pub fn revoked_token(jti: impl Into<String>) -> Self {
        Self::RevokedToken { jti: jti.into() }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginSession { session_id } => {
                write!(f, "{LOGIN_SESSION_KEY_PREFIX}{session_id}")
            }
            Self::LoginState { state } => write!(f, "{LOGIN_STATE_KEY_PREFIX}{state}"),
            Self::AppAccessToken => f.write_str(APP_ACCESS_TOKEN_KEY),
            Self::RevokedToken { jti } => write!(f, "{REVOKED_TOKEN_KEY_PREFIX}{jti}"),
        }
    }
}
