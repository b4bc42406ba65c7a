// ABOUTME: Authentication route handlers for WeChat QR login and JWT session management
// ABOUTME: QR creation, polling, callback, scan and cancel, token refresh, logout, and the current user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Authentication routes
//!
//! The browser asks for a QR code, polls the session, and the WeChat redirect
//! lands on the callback, which exchanges the code and issues a token pair.
//! Everything under `/api/auth/me` and `/api/auth/logout` needs a bearer
//! access token.

use super::{json_body, path_param};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::response::ApiResponse;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Body of the WeChat redirect callback
#[derive(Debug, Clone, Deserialize)]
pub struct WechatCallbackRequest {
    /// Authorization code
    pub code: String,
    /// OAuth state from the QR URL
    pub state: String,
}

/// Body of `POST /api/auth/refresh`
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from the last pair
    pub refresh_token: String,
}

/// Optional body of `POST /api/auth/logout`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the access token
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let mut router = Router::new()
            .route("/api/auth/wechat/qr", get(Self::handle_qr))
            .route(
                "/api/auth/wechat/status/:session_id",
                get(Self::handle_status),
            )
            .route("/api/auth/wechat/callback", post(Self::handle_callback))
            .route("/api/auth/wechat/scan/:session_id", post(Self::handle_scan))
            .route(
                "/api/auth/wechat/cancel/:session_id",
                post(Self::handle_cancel),
            )
            .route("/api/auth/refresh", post(Self::handle_refresh))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route(
                "/api/auth/me",
                get(Self::handle_me).delete(Self::handle_delete_me),
            );

        if resources.config.debug_mode {
            router = router.route(
                "/api/auth/wechat/access-token",
                get(Self::handle_token_info).delete(Self::handle_clear_token),
            );
        }

        router.with_state(resources)
    }

    /// Handle GET /api/auth/wechat/qr - start a QR login
    async fn handle_qr(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        if !resources.config.wechat.is_configured() {
            return Err(AppError::service_unavailable(
                "WeChat login is not configured",
            ));
        }
        let session = resources.login.create_session().await?;
        Ok(ApiResponse::ok("QR code generated", session).into_response())
    }

    /// Handle GET /api/auth/wechat/status/:session_id - poll a login
    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        session_id: Result<Path<String>, PathRejection>,
    ) -> Result<Response, AppError> {
        let session_id = path_param(session_id)?;
        let view = resources.login.session_status(&session_id).await?;
        let message = view.message.clone();
        Ok(ApiResponse::ok(message, view).into_response())
    }

    /// Handle POST /api/auth/wechat/callback - finish a login
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<WechatCallbackRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        if request.code.trim().is_empty() || request.state.trim().is_empty() {
            return Err(AppError::invalid_input("code and state are required"));
        }

        let result = resources
            .login
            .complete_login(
                request.code.trim(),
                request.state.trim(),
                &resources.database,
                &resources.jwt,
            )
            .await?;
        Ok(ApiResponse::ok("Login successful", result).into_response())
    }

    /// Handle POST /api/auth/wechat/scan/:session_id
    async fn handle_scan(
        State(resources): State<Arc<ServerResources>>,
        session_id: Result<Path<String>, PathRejection>,
    ) -> Result<Response, AppError> {
        let session_id = path_param(session_id)?;
        let session = resources.login.mark_scanned(&session_id).await?;
        Ok(ApiResponse::ok(
            session.status.message(),
            json!({ "session_id": session.session_id, "status": session.status }),
        )
        .into_response())
    }

    /// Handle POST /api/auth/wechat/cancel/:session_id
    async fn handle_cancel(
        State(resources): State<Arc<ServerResources>>,
        session_id: Result<Path<String>, PathRejection>,
    ) -> Result<Response, AppError> {
        let session_id = path_param(session_id)?;
        let session = resources.login.cancel(&session_id).await?;
        Ok(ApiResponse::ok(
            session.status.message(),
            json!({ "session_id": session.session_id, "status": session.status }),
        )
        .into_response())
    }

    /// Handle POST /api/auth/refresh - exchange a refresh token for a new pair
    ///
    /// The presented refresh token is revoked before the new pair is issued,
    /// so concurrent replays of one token yield at most one pair.
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<RefreshRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        let claims = resources.jwt.validate_refresh(request.refresh_token.trim())?;
        let user_id = claims.user_id()?;

        let user = resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        if !resources.auth.claim_revocation(&claims).await? {
            AppLogger::log_auth_event(
                &user_id.to_string(),
                "token_refresh",
                false,
                Some("refresh token already used or revoked"),
            );
            return Err(AppError::invalid_refresh_token(
                "Refresh token has been revoked",
            ));
        }

        let pair = resources.jwt.issue_pair(&user)?;

        AppLogger::log_auth_event(&user_id.to_string(), "token_refresh", true, None);
        Ok(ApiResponse::ok("Token refreshed", pair).into_response())
    }

    /// Handle POST /api/auth/logout - revoke the presented tokens
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let request = parse_optional_body::<LogoutRequest>(&body)?;

        if let Some(refresh_token) = request.refresh_token.as_deref().map(str::trim) {
            let claims = resources.jwt.validate_refresh(refresh_token)?;
            if claims.sub != auth.claims.sub {
                return Err(AppError::invalid_refresh_token(
                    "Refresh token belongs to another user",
                ));
            }
            resources.auth.revoke(&claims).await?;
        }
        resources.auth.revoke(&auth.claims).await?;

        AppLogger::log_auth_event(&auth.user.id.to_string(), "logout", true, None);
        Ok(ApiResponse::message("Logged out").into_response())
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        Ok(ApiResponse::ok("Current user", auth.user).into_response())
    }

    /// Handle DELETE /api/auth/me - soft-delete the account and its items
    async fn handle_delete_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        if !resources.database.soft_delete_user(auth.user.id).await? {
            return Err(AppError::user_not_found());
        }
        resources.auth.revoke(&auth.claims).await?;

        AppLogger::log_auth_event(&auth.user.id.to_string(), "account_deleted", true, None);
        Ok(ApiResponse::ok("Account deleted", json!({ "id": auth.user.id })).into_response())
    }

    /// Handle GET /api/auth/wechat/access-token (debug only)
    async fn handle_token_info(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let info = resources.login.cached_token_info().await?;
        Ok(ApiResponse::ok("Access token cache status", info).into_response())
    }

    /// Handle DELETE /api/auth/wechat/access-token (debug only)
    async fn handle_clear_token(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        resources.login.clear_app_token().await?;
        Ok(ApiResponse::message("Access token cache cleared").into_response())
    }
}

/// Parse a JSON body that may be empty
fn parse_optional_body<T>(body: &Bytes) -> AppResult<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))
}
