// ABOUTME: In-memory cache implementation with LRU eviction and TTL support
// ABOUTME: Includes background cleanup task for expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

type Store = Arc<RwLock<LruCache<String, CacheEntry>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// In-memory cache with LRU eviction and background cleanup
///
/// The store is shared with the sweeper task spawned at construction, which
/// drops expired entries every `cleanup_interval`. Reads also evict lazily, so
/// correctness never depends on the sweeper running.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Store,
    shutdown_tx: Option<Arc<mpsc::Sender<()>>>,
}

impl InMemoryCache {
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    fn new_with_config(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        let store = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
            let sweeper_store = store.clone();
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&sweeper_store).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(Arc::new(shutdown_tx))
        } else {
            None
        };

        Self { store, shutdown_tx }
    }

    async fn cleanup_expired(store: &Store) {
        let mut guard = store.write().await;

        let expired_keys: Vec<String> = guard
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired_keys {
            guard.pop(key);
        }
        drop(guard);

        if !expired_keys.is_empty() {
            tracing::debug!("Cleaned up {} expired cache entries", expired_keys.len());
        }
    }

    /// Number of live and not yet swept entries
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl CacheProvider for InMemoryCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        Ok(Self::new_with_config(&config))
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        let entry = CacheEntry::new(serialized, ttl);

        // LruCache evicts the least recently used entry on push when full
        self.store.write().await.push(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<bool> {
        let serialized = serde_json::to_vec(value)?;
        let key = key.to_string();

        // Check and insert under the same write guard
        let mut store = self.store.write().await;
        if store.peek(&key).is_some_and(|entry| !entry.is_expired()) {
            return Ok(false);
        }
        store.push(key, CacheEntry::new(serialized, ttl));
        Ok(true)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let key = key.to_string();
        let mut store = self.store.write().await;

        let Some(entry) = store.get(&key) else {
            return Ok(None);
        };
        if entry.is_expired() {
            store.pop(&key);
            return Ok(None);
        }

        let value: T = serde_json::from_slice(&entry.data)?;
        drop(store);
        Ok(Some(value))
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.store.write().await.pop(&key.to_string());
        Ok(())
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        let key = key.to_string();
        let mut store = self.store.write().await;

        match store.peek(&key) {
            Some(entry) if entry.is_expired() => {
                store.pop(&key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        let store = self.store.read().await;

        // peek keeps LRU order untouched
        Ok(store
            .peek(&key.to_string())
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::remaining_ttl))
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        // Only the last clone closes the sweeper
        if let Some(tx) = &self.shutdown_tx {
            if Arc::strong_count(tx) == 1 {
                if let Err(e) = tx.try_send(()) {
                    tracing::debug!(error = ?e, "Cache shutdown signal send failed (channel likely closed)");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    async fn test_cache(max_entries: usize) -> InMemoryCache {
        InMemoryCache::new(CacheConfig {
            max_entries,
            enable_background_cleanup: false,
            ..CacheConfig::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = test_cache(10).await;
        let key = CacheKey::login_state("s1");
        cache
            .set(&key, &"session-1".to_owned(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<String> = cache.get(&key).await.unwrap();
        assert_eq!(value.as_deref(), Some("session-1"));
        assert!(cache.exists(&key).await.unwrap());
        assert!(cache.ttl(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_read_as_absent() {
        let cache = test_cache(10).await;
        let key = CacheKey::AppAccessToken;
        cache.set(&key, &1_u8, Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        let value: Option<u8> = cache.get(&key).await.unwrap();
        assert!(value.is_none());
        assert!(!cache.exists(&key).await.unwrap());
        assert!(cache.ttl(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_if_absent_claims_once() {
        let cache = test_cache(10).await;
        let key = CacheKey::revoked_token("jti-1");

        assert!(cache.set_if_absent(&key, &true, Duration::from_secs(60)).await.unwrap());
        assert!(!cache.set_if_absent(&key, &true, Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_if_absent_replaces_expired_entry() {
        let cache = test_cache(10).await;
        let key = CacheKey::revoked_token("jti-2");
        cache.set(&key, &false, Duration::from_millis(5)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(cache.set_if_absent(&key, &true, Duration::from_secs(60)).await.unwrap());
        let value: Option<bool> = cache.get(&key).await.unwrap();
        assert_eq!(value, Some(true));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_set_if_absent_concurrent_callers_single_winner() {
        let cache = test_cache(10).await;
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .set_if_absent(&CacheKey::revoked_token("shared"), &true, Duration::from_secs(60))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let cache = test_cache(2).await;
        for id in ["a", "b", "c"] {
            cache
                .set(&CacheKey::revoked_token(id), &true, Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert_eq!(cache.len().await, 2);
        assert!(!cache.exists(&CacheKey::revoked_token("a")).await.unwrap());
        assert!(cache.exists(&CacheKey::revoked_token("c")).await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired() {
        let cache = test_cache(10).await;
        cache
            .set(&CacheKey::revoked_token("old"), &true, Duration::from_millis(5))
            .await
            .unwrap();
        cache
            .set(&CacheKey::revoked_token("new"), &true, Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        InMemoryCache::cleanup_expired(&cache.store).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = test_cache(10).await;
        let key = CacheKey::login_session("x");
        cache.set(&key, &"v", Duration::from_secs(60)).await.unwrap();
        cache.invalidate(&key).await.unwrap();
        assert!(!cache.exists(&key).await.unwrap());

        cache.set(&key, &"v", Duration::from_secs(60)).await.unwrap();
        cache.clear_all().await.unwrap();
        assert!(cache.is_empty().await);
    }
}
