// ABOUTME: Cache factory for configuration-based backend selection
// ABOUTME: Redis when a URL is configured, the in-memory LRU cache otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::{memory::InMemoryCache, redis::RedisCache, CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
enum Backend {
    Memory(InMemoryCache),
    Redis(RedisCache),
}

/// Unified cache interface used by services
#[derive(Clone)]
pub struct Cache {
    inner: Backend,
}

impl Cache {
    /// Create new cache instance based on configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the Redis connection cannot be established
    pub async fn new(config: CacheConfig) -> AppResult<Self> {
        let inner = if config.redis_url.is_some() {
            tracing::info!("Initializing Redis cache");
            Backend::Redis(RedisCache::new(config).await?)
        } else {
            tracing::info!(
                "Initializing in-memory cache (max entries: {})",
                config.max_entries
            );
            Backend::Memory(InMemoryCache::new(config).await?)
        };
        Ok(Self { inner })
    }

    /// Wrap an existing in-memory cache
    #[must_use]
    pub const fn from_memory(cache: InMemoryCache) -> Self {
        Self {
            inner: Backend::Memory(cache),
        }
    }

    /// Backend name for health output
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self.inner {
            Backend::Memory(_) => "memory",
            Backend::Redis(_) => "redis",
        }
    }

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        match &self.inner {
            Backend::Memory(c) => c.set(key, value, ttl).await,
            Backend::Redis(c) => c.set(key, value, ttl).await,
        }
    }

    /// Store value only if the key is not already live
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set_if_absent<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<bool> {
        match &self.inner {
            Backend::Memory(c) => c.set_if_absent(key, value, ttl).await,
            Backend::Redis(c) => c.set_if_absent(key, value, ttl).await,
        }
    }

    /// Retrieve value from cache
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match &self.inner {
            Backend::Memory(c) => c.get(key).await,
            Backend::Redis(c) => c.get(key).await,
        }
    }

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        match &self.inner {
            Backend::Memory(c) => c.invalidate(key).await,
            Backend::Redis(c) => c.invalidate(key).await,
        }
    }

    /// Check if key exists in cache
    ///
    /// # Errors
    ///
    /// Returns an error if existence check fails
    pub async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        match &self.inner {
            Backend::Memory(c) => c.exists(key).await,
            Backend::Redis(c) => c.exists(key).await,
        }
    }

    /// Get remaining TTL for key
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    pub async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        match &self.inner {
            Backend::Memory(c) => c.ttl(key).await,
            Backend::Redis(c) => c.ttl(key).await,
        }
    }

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.inner {
            Backend::Memory(c) => c.health_check().await,
            Backend::Redis(c) => c.health_check().await,
        }
    }

    /// Clear all cache entries
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    pub async fn clear_all(&self) -> AppResult<()> {
        match &self.inner {
            Backend::Memory(c) => c.clear_all().await,
            Backend::Redis(c) => c.clear_all().await,
        }
    }
}
