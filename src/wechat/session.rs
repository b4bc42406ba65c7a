// ABOUTME: QR login session lifecycle backed by the cache, plus the cached app access token
// ABOUTME: Enforces the session status table and completes logins by issuing JWT pairs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::IdentityProvider;
use crate::auth::JwtManager;
use crate::cache::{Cache, CacheKey};
use crate::constants::wechat::{APP_TOKEN_EXPIRY_MARGIN_SECS, MAX_APP_TOKEN_CACHE_SECS};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{LoginSession, NewUser, SessionStatus, TokenPair, UserInfo};
use crate::utils::qr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Newly created QR login session handed to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrLoginSession {
    /// Identifier to poll
    pub session_id: String,
    /// QR connect page URL encoded in `qr_code`
    pub qr_url: String,
    /// `qr_url` rendered as a `data:image/png;base64,` QR image
    pub qr_code: String,
    /// OAuth state embedded in `qr_url`
    pub state: String,
    /// Session deadline
    pub expires_at: DateTime<Utc>,
    /// Seconds until the deadline
    pub expires_in: u64,
}

/// Poll result for a login session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Observed status
    pub status: SessionStatus,
    /// Human readable status
    pub message: String,
    /// Logged in user, once successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// Issued tokens, once successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenPair>,
}

impl SessionView {
    fn expired() -> Self {
        Self {
            status: SessionStatus::Expired,
            message: SessionStatus::Expired.message().to_owned(),
            user_info: None,
            token: None,
        }
    }
}

/// Tokens and profile returned by a completed login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Logged in user
    pub user_info: UserInfo,
}

/// Cached app-level credential
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedAppToken {
    access_token: String,
    expires_in: i64,
    obtained_at: DateTime<Utc>,
}

/// Diagnostics for the cached app token; never carries the token itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTokenInfo {
    /// Whether a token is currently cached
    pub cached: bool,
    /// Provider-issued lifetime of the cached token
    pub expires_in: Option<i64>,
    /// When the cached token was fetched
    pub obtained_at: Option<DateTime<Utc>>,
}

/// Manages login sessions and the app token on top of the cache
#[derive(Clone)]
pub struct LoginSessionService {
    provider: Arc<dyn IdentityProvider>,
    cache: Cache,
    ttl: Duration,
}

impl LoginSessionService {
    /// Create the service; `ttl` bounds every login session
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, cache: Cache, ttl: Duration) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    /// The identity provider behind this service
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Start a login: store a pending session and its state mapping
    ///
    /// # Errors
    ///
    /// Returns an error if the QR URL cannot be built or the cache write fails
    pub async fn create_session(&self) -> AppResult<QrLoginSession> {
        let session_id = Uuid::new_v4().to_string();
        let state = Uuid::new_v4().simple().to_string();
        let qr_url = self.provider.authorize_url(&state)?;
        let qr_code = qr::png_data_url(&qr_url)?;

        let lifetime = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AppError::config(format!("Invalid login session TTL: {e}")))?;
        let now = Utc::now();
        let session = LoginSession {
            session_id: session_id.clone(),
            state: state.clone(),
            status: SessionStatus::Pending,
            created_at: now,
            expires_at: now + lifetime,
            user_info: None,
            token: None,
            error: None,
        };

        self.cache
            .set(&CacheKey::login_session(session_id.as_str()), &session, self.ttl)
            .await?;
        self.cache
            .set(&CacheKey::login_state(state.as_str()), &session_id, self.ttl)
            .await?;

        tracing::info!("Created login session {}", session_id);
        Ok(QrLoginSession {
            session_id,
            qr_url,
            qr_code,
            state,
            expires_at: session.expires_at,
            expires_in: self.ttl.as_secs(),
        })
    }

    /// Session record plus remaining lifetime, or `None` once expired
    async fn load_live(&self, session_id: &str) -> AppResult<Option<(LoginSession, Duration)>> {
        let Some(session) = self
            .cache
            .get::<LoginSession>(&CacheKey::login_session(session_id))
            .await?
        else {
            return Ok(None);
        };

        let remaining = (session.expires_at - Utc::now())
            .to_std()
            .ok()
            .filter(|d| !d.is_zero());
        Ok(remaining.map(|ttl| (session, ttl)))
    }

    /// Current status as seen by a polling client
    ///
    /// Missing or stale sessions report `expired`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache read fails
    pub async fn session_status(&self, session_id: &str) -> AppResult<SessionView> {
        let Some((session, _)) = self.load_live(session_id).await? else {
            return Ok(SessionView::expired());
        };
        Ok(SessionView {
            status: session.status,
            message: session.status.message().to_owned(),
            user_info: session.user_info,
            token: session.token,
        })
    }

    /// Move a live session to `next`, applying `apply` before rewriting it
    ///
    /// The record keeps its original deadline.
    ///
    /// # Errors
    ///
    /// Returns `SESSION_NOT_FOUND` for missing or expired sessions and
    /// `INVALID_SESSION_TRANSITION` when the table forbids the move
    pub async fn update_status<F>(
        &self,
        session_id: &str,
        next: SessionStatus,
        apply: F,
    ) -> AppResult<LoginSession>
    where
        F: FnOnce(&mut LoginSession) + Send,
    {
        let (mut session, remaining) = self
            .load_live(session_id)
            .await?
            .ok_or_else(|| AppError::session_not_found(session_id))?;

        let previous = session.status;
        if !previous.can_transition_to(next) {
            return Err(AppError::invalid_session_transition(
                previous.as_str(),
                next.as_str(),
            ));
        }

        session.status = next;
        apply(&mut session);

        self.cache
            .set(&CacheKey::login_session(session_id), &session, remaining)
            .await?;
        AppLogger::log_login_session(session_id, previous.as_str(), next.as_str());
        Ok(session)
    }

    /// Record that the QR code was scanned
    ///
    /// # Errors
    ///
    /// See [`LoginSessionService::update_status`]
    pub async fn mark_scanned(&self, session_id: &str) -> AppResult<LoginSession> {
        self.update_status(session_id, SessionStatus::Scanned, |_| {})
            .await
    }

    /// Abandon a login
    ///
    /// # Errors
    ///
    /// See [`LoginSessionService::update_status`]
    pub async fn cancel(&self, session_id: &str) -> AppResult<LoginSession> {
        self.update_status(session_id, SessionStatus::Cancelled, |_| {})
            .await
    }

    /// Find the live session behind an OAuth `state`
    ///
    /// Uses the state mapping first, then treats `state` as a session id.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache read fails
    pub async fn resolve_session_by_state(&self, state: &str) -> AppResult<Option<LoginSession>> {
        let mapped = self
            .cache
            .get::<String>(&CacheKey::login_state(state))
            .await?;
        let session_id = mapped.as_deref().unwrap_or(state);
        Ok(self.load_live(session_id).await?.map(|(session, _)| session))
    }

    /// Finish the handshake for the session owning `state`
    ///
    /// # Errors
    ///
    /// Returns `SESSION_NOT_FOUND` if no live session matches, the provider
    /// error if the code exchange fails (the session is marked failed), or a
    /// database or signing error
    #[tracing::instrument(skip(self, code, database, jwt))]
    pub async fn complete_login(
        &self,
        code: &str,
        state: &str,
        database: &Database,
        jwt: &JwtManager,
    ) -> AppResult<LoginResult> {
        let session = self
            .resolve_session_by_state(state)
            .await?
            .ok_or_else(|| AppError::session_not_found(state))?;
        let session_id = session.session_id;

        self.update_status(&session_id, SessionStatus::Confirmed, |_| {})
            .await?;

        match self.login_user(code, database, jwt).await {
            Ok((user_info, token)) => {
                let (info, pair) = (user_info.clone(), token.clone());
                self.update_status(&session_id, SessionStatus::Success, move |s| {
                    s.user_info = Some(info);
                    s.token = Some(pair);
                })
                .await?;

                AppLogger::log_auth_event(&user_info.id.to_string(), "wechat_login", true, None);
                Ok(LoginResult {
                    access_token: token.access_token,
                    refresh_token: token.refresh_token,
                    token_type: token.token_type,
                    expires_in: token.expires_in,
                    user_info,
                })
            }
            Err(error) => {
                let reason = error.message.clone();
                if let Err(mark_error) = self
                    .update_status(&session_id, SessionStatus::Failed, move |s| {
                        s.error = Some(reason);
                    })
                    .await
                {
                    tracing::warn!(
                        "Could not mark login session {} as failed: {}",
                        session_id,
                        mark_error
                    );
                }
                AppLogger::log_auth_event("unknown", "wechat_login", false, Some(&error.message));
                Err(error)
            }
        }
    }

    async fn login_user(
        &self,
        code: &str,
        database: &Database,
        jwt: &JwtManager,
    ) -> AppResult<(UserInfo, TokenPair)> {
        let profile = self.provider.exchange_code(code).await?;
        let user = database
            .upsert_user_from_login(&NewUser {
                openid: profile.openid,
                unionid: profile.unionid,
                nickname: profile.nickname,
                avatar_url: profile.avatar_url,
            })
            .await?;
        let token = jwt.issue_pair(&user)?;
        Ok((UserInfo::from(&user), token))
    }

    /// App-level access token, fetched from the provider on a cache miss
    ///
    /// # Errors
    ///
    /// Returns the provider error if the fetch fails, or a cache error
    pub async fn app_access_token(&self) -> AppResult<String> {
        if let Some(cached) = self
            .cache
            .get::<CachedAppToken>(&CacheKey::AppAccessToken)
            .await?
        {
            return Ok(cached.access_token);
        }

        let fresh = self.provider.fetch_app_token().await?;
        let cache_secs = MAX_APP_TOKEN_CACHE_SECS
            .min(fresh.expires_in.saturating_sub(APP_TOKEN_EXPIRY_MARGIN_SECS));
        if cache_secs > 0 {
            let record = CachedAppToken {
                access_token: fresh.access_token.clone(),
                expires_in: fresh.expires_in,
                obtained_at: Utc::now(),
            };
            self.cache
                .set(
                    &CacheKey::AppAccessToken,
                    &record,
                    Duration::from_secs(cache_secs.unsigned_abs()),
                )
                .await?;
        } else {
            tracing::warn!(
                "Provider token lifetime {}s too short to cache",
                fresh.expires_in
            );
        }
        Ok(fresh.access_token)
    }

    /// Describe the cached app token without exposing it
    ///
    /// # Errors
    ///
    /// Returns an error if the cache read fails
    pub async fn cached_token_info(&self) -> AppResult<AppTokenInfo> {
        let cached = self
            .cache
            .get::<CachedAppToken>(&CacheKey::AppAccessToken)
            .await?;
        Ok(AppTokenInfo {
            cached: cached.is_some(),
            expires_in: cached.as_ref().map(|c| c.expires_in),
            obtained_at: cached.map(|c| c.obtained_at),
        })
    }

    /// Drop the cached app token so the next request refetches it
    ///
    /// # Errors
    ///
    /// Returns an error if the cache delete fails
    pub async fn clear_app_token(&self) -> AppResult<()> {
        self.cache.invalidate(&CacheKey::AppAccessToken).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryCache;
    use crate::cache::{CacheConfig, CacheProvider};
    use crate::errors::ErrorCode;
    use crate::wechat::{ProviderToken, ProviderUser};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        token_calls: AtomicUsize,
        expires_in: i64,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        fn authorize_url(&self, state: &str) -> AppResult<String> {
            Ok(format!("https://qr.test/?state={state}"))
        }

        async fn exchange_code(&self, _code: &str) -> AppResult<ProviderUser> {
            Err(AppError::wechat_auth("invalid code"))
        }

        async fn fetch_app_token(&self) -> AppResult<ProviderToken> {
            let n = self.token_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderToken {
                access_token: format!("app-token-{n}"),
                expires_in: self.expires_in,
            })
        }

        async fn validate_user_token(&self, _access_token: &str, _openid: &str) -> AppResult<bool> {
            Ok(true)
        }
    }

    async fn service(expires_in: i64) -> (LoginSessionService, Arc<CountingProvider>) {
        let cache = InMemoryCache::new(CacheConfig {
            enable_background_cleanup: false,
            ..Default::default()
        })
        .await
        .unwrap();
        let provider = Arc::new(CountingProvider {
            token_calls: AtomicUsize::new(0),
            expires_in,
        });
        let service = LoginSessionService::new(
            provider.clone(),
            Cache::from_memory(cache),
            Duration::from_secs(300),
        );
        (service, provider)
    }

    #[tokio::test]
    async fn test_create_session_is_pending_and_resolvable_by_state() {
        let (service, _) = service(7200).await;
        let created = service.create_session().await.unwrap();

        assert_eq!(created.expires_in, 300);
        assert!(created.qr_url.ends_with(&created.state));
        assert_eq!(created.state.len(), 32);

        let view = service.session_status(&created.session_id).await.unwrap();
        assert_eq!(view.status, SessionStatus::Pending);
        assert_eq!(view.message, "Waiting for scan");

        let resolved = service
            .resolve_session_by_state(&created.state)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.session_id, created.session_id);

        // A session id doubles as a state
        let by_id = service
            .resolve_session_by_state(&created.session_id)
            .await
            .unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_unknown_session_reports_expired() {
        let (service, _) = service(7200).await;
        let view = service.session_status("missing").await.unwrap();
        assert_eq!(view.status, SessionStatus::Expired);
        assert_eq!(view.message, "QR code expired");

        let err = service.mark_scanned("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn test_transitions_follow_the_table() {
        let (service, _) = service(7200).await;
        let created = service.create_session().await.unwrap();

        service.mark_scanned(&created.session_id).await.unwrap();
        let err = service.mark_scanned(&created.session_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSessionTransition);

        service.cancel(&created.session_id).await.unwrap();
        let err = service.cancel(&created.session_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSessionTransition);

        let view = service.session_status(&created.session_id).await.unwrap();
        assert_eq!(view.status, SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_app_token_is_cached_until_cleared() {
        let (service, provider) = service(7200).await;

        assert!(!service.cached_token_info().await.unwrap().cached);
        assert_eq!(service.app_access_token().await.unwrap(), "app-token-0");
        assert_eq!(service.app_access_token().await.unwrap(), "app-token-0");
        assert_eq!(provider.token_calls.load(Ordering::SeqCst), 1);

        let info = service.cached_token_info().await.unwrap();
        assert!(info.cached);
        assert_eq!(info.expires_in, Some(7200));

        service.clear_app_token().await.unwrap();
        assert_eq!(service.app_access_token().await.unwrap(), "app-token-1");
    }

    #[tokio::test]
    async fn test_short_lived_app_token_is_not_cached() {
        let (service, provider) = service(600).await;

        service.app_access_token().await.unwrap();
        service.app_access_token().await.unwrap();
        assert_eq!(provider.token_calls.load(Ordering::SeqCst), 2);
        assert!(!service.cached_token_info().await.unwrap().cached);
    }
}
