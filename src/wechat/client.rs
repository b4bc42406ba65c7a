// ABOUTME: reqwest client for the WeChat open platform OAuth and credential endpoints
// ABOUTME: Classifies errcode bodies as auth errors and transport or decode failures as request errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::{IdentityProvider, ProviderToken, ProviderUser};
use crate::config::environment::WechatConfig;
use crate::constants::wechat::{
    APP_TOKEN_PATH, AUTH_CHECK_PATH, OAUTH_ACCESS_TOKEN_PATH, QR_CONNECT_PATH, QR_LOGIN_SCOPE,
    QR_REDIRECT_FRAGMENT, USER_INFO_PATH,
};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::utils::http_client::oauth_client;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use url::Url;

/// Response of the code exchange endpoint
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    openid: String,
    #[serde(default)]
    unionid: Option<String>,
}

/// WeChat API client
#[derive(Clone)]
pub struct WechatClient {
    config: WechatConfig,
    http: Client,
}

impl WechatClient {
    /// Create a client using the OAuth timeouts
    #[must_use]
    pub fn new(config: WechatConfig) -> Self {
        Self::with_http_client(config, oauth_client())
    }

    /// Create a client over an existing reqwest client
    #[must_use]
    pub const fn with_http_client(config: WechatConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn endpoint(base: &str, path: &str) -> AppResult<Url> {
        Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
            .map_err(|e| AppError::config(format!("Invalid WeChat base URL {base}: {e}")))
    }

    /// GET an API path and decode the JSON body without interpreting `errcode`
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> AppResult<Value> {
        let mut url = Self::endpoint(&self.config.api_base_url, path)?;
        url.query_pairs_mut().extend_pairs(query);

        let started = Instant::now();
        let result = self.send(url).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(body) => {
                let errcode = errcode(body);
                AppLogger::log_provider_call(path, errcode.is_none(), elapsed, errcode);
            }
            Err(_) => AppLogger::log_provider_call(path, false, elapsed, None),
        }
        result
    }

    async fn send(&self, url: Url) -> AppResult<Value> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::wechat_request(format!(
                "WeChat API returned HTTP {status}"
            )));
        }
        response.json::<Value>().await.map_err(|e| {
            AppError::wechat_request(format!("Failed to decode WeChat response: {e}"))
        })
    }

    /// GET an API path, fail on a non-zero `errcode`, then decode into `T`
    async fn call<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let body = self.fetch(path, query).await?;
        if let Some(code) = errcode(&body) {
            let message = body
                .get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(AppError::wechat_auth(format!(
                "WeChat error {code}: {message}"
            )));
        }
        serde_json::from_value(body).map_err(|e| {
            AppError::wechat_request(format!("Unexpected WeChat response shape: {e}"))
        })
    }
}

/// Non-zero `errcode` carried by a response body
fn errcode(body: &Value) -> Option<i64> {
    body.get("errcode")
        .and_then(Value::as_i64)
        .filter(|code| *code != 0)
}

#[async_trait]
impl IdentityProvider for WechatClient {
    fn authorize_url(&self, state: &str) -> AppResult<String> {
        let mut url = Self::endpoint(&self.config.open_base_url, QR_CONNECT_PATH)?;
        url.query_pairs_mut()
            .append_pair("appid", &self.config.app_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", QR_LOGIN_SCOPE)
            .append_pair("state", state);
        url.set_fragment(Some(QR_REDIRECT_FRAGMENT.trim_start_matches('#')));
        Ok(url.into())
    }

    #[tracing::instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> AppResult<ProviderUser> {
        let token: OAuthTokenResponse = self
            .call(
                OAUTH_ACCESS_TOKEN_PATH,
                &[
                    ("appid", self.config.app_id.as_str()),
                    ("secret", self.config.app_secret.as_str()),
                    ("code", code),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;

        let mut user: ProviderUser = self
            .call(
                USER_INFO_PATH,
                &[
                    ("access_token", token.access_token.as_str()),
                    ("openid", token.openid.as_str()),
                ],
            )
            .await?;

        if user.unionid.is_none() {
            user.unionid = token.unionid;
        }
        tracing::debug!("WeChat code exchanged for openid {}", user.openid);
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_app_token(&self) -> AppResult<ProviderToken> {
        self.call(
            APP_TOKEN_PATH,
            &[
                ("grant_type", "client_credential"),
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.app_secret.as_str()),
            ],
        )
        .await
    }

    async fn validate_user_token(&self, access_token: &str, openid: &str) -> AppResult<bool> {
        let body = self
            .fetch(
                AUTH_CHECK_PATH,
                &[("access_token", access_token), ("openid", openid)],
            )
            .await?;
        Ok(body.get("errcode").and_then(Value::as_i64) == Some(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::environment::ServerConfig;

    fn client() -> WechatClient {
        let mut config = ServerConfig::for_testing().wechat;
        config.redirect_uri = "https://app.example.com/login/callback?from=qr".to_owned();
        WechatClient::new(config)
    }

    #[test]
    fn test_authorize_url_layout() {
        let url = client().authorize_url("abc123").unwrap();

        assert!(url.starts_with("https://open.weixin.qq.com/connect/qrconnect?appid=wx_test_app"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fapp.example.com%2Flogin%2Fcallback%3Ffrom%3Dqr"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=snsapi_login"));
        assert!(url.ends_with("state=abc123#wechat_redirect"));
    }

    #[test]
    fn test_errcode_ignores_zero() {
        assert_eq!(errcode(&serde_json::json!({"errcode": 0, "errmsg": "ok"})), None);
        assert_eq!(errcode(&serde_json::json!({"errcode": 40029})), Some(40029));
        assert_eq!(errcode(&serde_json::json!({"access_token": "t"})), None);
    }
}
