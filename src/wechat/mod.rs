// ABOUTME: WeChat open platform integration for QR code login
// ABOUTME: Defines the identity provider seam, the HTTP client, and the login session service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! # WeChat Login
//!
//! The QR login handshake has three moving parts:
//!
//! - [`IdentityProvider`]: the outbound OAuth surface. [`WechatClient`] talks
//!   to the real API; tests substitute their own implementation.
//! - [`LoginSessionService`]: cache-resident login sessions and their status
//!   machine, plus the cached app-level credential.
//! - [`crate::auth::JwtManager`]: issues the token pair once a login succeeds.

/// HTTP client for the WeChat API
pub mod client;
/// Login session lifecycle and app token caching
pub mod session;

pub use client::WechatClient;
pub use session::{AppTokenInfo, LoginResult, LoginSessionService, QrLoginSession, SessionView};

use crate::constants::wechat::DEFAULT_APP_TOKEN_EXPIRES_IN_SECS;
use crate::errors::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Profile of a user who authorized the QR login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    /// Per-app user identifier
    pub openid: String,
    /// Cross-app identifier, only present for bound open platform accounts
    #[serde(default)]
    pub unionid: Option<String>,
    /// Display name
    #[serde(default)]
    pub nickname: Option<String>,
    /// Avatar URL
    #[serde(default, alias = "headimgurl")]
    pub avatar_url: Option<String>,
    /// 1 male, 2 female, 0 unknown
    #[serde(default)]
    pub sex: Option<i64>,
    /// Profile province
    #[serde(default)]
    pub province: Option<String>,
    /// Profile city
    #[serde(default)]
    pub city: Option<String>,
    /// Profile country
    #[serde(default)]
    pub country: Option<String>,
}

/// App-level access token issued by `/cgi-bin/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderToken {
    /// Token value
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

const fn default_expires_in() -> i64 {
    DEFAULT_APP_TOKEN_EXPIRES_IN_SECS
}

/// Outbound identity provider operations used by the login flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the QR connect page carrying `state`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is not a valid URL
    fn authorize_url(&self, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for the user's profile
    ///
    /// # Errors
    ///
    /// Returns `WECHAT_AUTH_ERROR` when the provider rejects the code and
    /// `WECHAT_REQUEST_ERROR` on transport or decode failures
    async fn exchange_code(&self, code: &str) -> AppResult<ProviderUser>;

    /// Fetch a fresh app-level access token
    ///
    /// # Errors
    ///
    /// Same classification as [`IdentityProvider::exchange_code`]
    async fn fetch_app_token(&self) -> AppResult<ProviderToken>;

    /// Whether a user access token is still valid for `openid`
    ///
    /// # Errors
    ///
    /// Returns `WECHAT_REQUEST_ERROR` on transport or decode failures
    async fn validate_user_token(&self, access_token: &str, openid: &str) -> AppResult<bool>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_user_accepts_headimgurl() {
        let user: ProviderUser = serde_json::from_str(
            r#"{"openid":"o1","nickname":"Ann","headimgurl":"https://img/1","sex":2,"privilege":[]}"#,
        )
        .unwrap();
        assert_eq!(user.avatar_url.as_deref(), Some("https://img/1"));
        assert_eq!(user.sex, Some(2));
        assert!(user.unionid.is_none());
    }

    #[test]
    fn test_provider_token_defaults_expiry() {
        let token: ProviderToken = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(token.expires_in, DEFAULT_APP_TOKEN_EXPIRES_IN_SECS);
    }
}
