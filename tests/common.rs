// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database and cache, a fake WeChat provider, and HTTP request helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `daily_cost_server`
//!
//! Every integration test runs against an in-memory `SQLite` database and an
//! in-memory cache without the background sweeper, so tests are isolated and
//! need no external services.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use daily_cost_server::{
    cache::{memory::InMemoryCache, Cache, CacheConfig, CacheProvider},
    config::environment::{DatabaseUrl, ServerConfig},
    database::Database,
    errors::{AppError, AppResult},
    models::{NewUser, TokenPair, User},
    resources::ServerResources,
    server::build_router,
    wechat::{IdentityProvider, ProviderToken, ProviderUser},
};
use serde_json::Value;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database with the schema applied
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseUrl::Memory, 1).await?)
}

/// In-memory cache without the background sweeper
pub async fn create_test_cache() -> Result<Cache> {
    let cache = InMemoryCache::new(CacheConfig {
        enable_background_cleanup: false,
        ..CacheConfig::default()
    })
    .await?;
    Ok(Cache::from_memory(cache))
}

/// Code that the fake provider rejects with a WeChat errcode
pub const REJECTED_CODE: &str = "rejected-code";

/// Code that the fake provider fails to reach WeChat for
pub const UNREACHABLE_CODE: &str = "unreachable-code";

/// Identity provider that derives a profile from the authorization code
///
/// Code `abc` logs in as openid `openid-abc`.
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorize_url(&self, state: &str) -> AppResult<String> {
        Ok(format!(
            "https://open.weixin.qq.com/connect/qrconnect?appid=wx_test_app&state={state}#wechat_redirect"
        ))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ProviderUser> {
        match code {
            REJECTED_CODE => Err(AppError::wechat_auth("WeChat error 40029: invalid code")),
            UNREACHABLE_CODE => Err(AppError::wechat_request("WeChat API request timed out")),
            _ => Ok(ProviderUser {
                openid: format!("openid-{code}"),
                unionid: None,
                nickname: Some(format!("user-{code}")),
                avatar_url: Some(format!("https://img.example.com/{code}.png")),
                sex: None,
                province: None,
                city: None,
                country: None,
            }),
        }
    }

    async fn fetch_app_token(&self) -> AppResult<ProviderToken> {
        Ok(ProviderToken {
            access_token: "fake-app-token".to_owned(),
            expires_in: 7200,
        })
    }

    async fn validate_user_token(&self, _access_token: &str, _openid: &str) -> AppResult<bool> {
        Ok(true)
    }
}

/// Server resources over in-memory storage and the fake provider
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with(ServerConfig::for_testing()).await
}

/// Server resources with a custom configuration
pub async fn create_test_resources_with(config: ServerConfig) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let cache = create_test_cache().await?;
    Ok(Arc::new(ServerResources::new(
        config,
        database,
        cache,
        Arc::new(FakeIdentityProvider),
    )))
}

/// Full application router plus its resources
pub async fn create_test_app() -> Result<(Router, Arc<ServerResources>)> {
    let resources = create_test_resources().await?;
    Ok((build_router(resources.clone()), resources))
}

/// Create a user directly and issue a token pair for it
pub async fn create_logged_in_user(
    resources: &ServerResources,
    name: &str,
) -> Result<(User, TokenPair)> {
    let user = resources
        .database
        .upsert_user_from_login(&NewUser {
            openid: format!("openid-{name}"),
            unionid: None,
            nickname: Some(name.to_owned()),
            avatar_url: None,
        })
        .await?;
    let tokens = resources.jwt.issue_pair(&user)?;
    Ok((user, tokens))
}

/// Send a request through the router and decode the JSON envelope
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

/// `GET` shorthand
pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, token, None).await
}
