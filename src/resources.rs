// ABOUTME: Centralized resource container shared by every route handler
// ABOUTME: Holds configuration, database, cache, JWT manager, auth middleware, and login sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! # Server Resources
//!
//! Built once at startup and shared through `State<Arc<ServerResources>>`.
//! Each member is cheap to clone, so handlers borrow from the `Arc` rather
//! than rebuilding anything per request.

use crate::auth::JwtManager;
use crate::cache::{Cache, CacheConfig};
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use crate::wechat::{IdentityProvider, LoginSessionService, WechatClient};
use std::sync::Arc;
use std::time::Duration;

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// `SQLite` access
    pub database: Database,
    /// Session, token, and revocation cache
    pub cache: Cache,
    /// Token issuer and validator
    pub jwt: JwtManager,
    /// Bearer token authentication
    pub auth: AuthMiddleware,
    /// QR login sessions and the app token
    pub login: LoginSessionService,
}

impl ServerResources {
    /// Assemble resources from already constructed services
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        cache: Cache,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let jwt = JwtManager::new(&config.auth);
        let auth = AuthMiddleware::new(jwt.clone(), database.clone(), cache.clone());
        let login = LoginSessionService::new(
            provider,
            cache.clone(),
            Duration::from_secs(config.wechat.session_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            database,
            cache,
            jwt,
            auth,
            login,
        }
    }

    /// Connect to the database and cache and wire the WeChat client
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or the
    /// cache backend cannot be reached
    pub async fn initialize(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url, config.database.max_connections).await?;

        let cache = Cache::new(CacheConfig::from(&config.cache)).await?;
        tracing::info!("Cache backend: {}", cache.backend_name());

        let provider: Arc<dyn IdentityProvider> = Arc::new(WechatClient::new(config.wechat.clone()));
        Ok(Self::new(config, database, cache, provider))
    }
}
