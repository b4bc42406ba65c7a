// ABOUTME: Bearer token authentication for protected API routes
// ABOUTME: Validates access tokens, checks revocation, and loads the live user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::auth::{Claims, JwtManager};
use crate::cache::{Cache, CacheKey};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use axum::http::HeaderMap;
use std::time::Duration;

/// Caller identity resolved from an access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The live user row
    pub user: User,
    /// Claims of the presented token
    pub claims: Claims,
}

/// Authenticates requests and tracks revoked tokens
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt: JwtManager,
    database: Database,
    cache: Cache,
}

impl AuthMiddleware {
    /// Create the middleware over shared services
    #[must_use]
    pub const fn new(jwt: JwtManager, database: Database, cache: Cache) -> Self {
        Self {
            jwt,
            database,
            cache,
        }
    }

    /// Authenticate a request from its `Authorization` header
    ///
    /// # Errors
    ///
    /// Returns a 401 error if the header is missing or not a bearer token,
    /// the token is invalid, expired, revoked or of the wrong type, or the user
    /// no longer exists
    #[tracing::instrument(skip(self, headers), fields(user_id = tracing::field::Empty))]
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let token = bearer_token(headers).ok_or_else(AppError::auth_required)?;

        let claims = self.jwt.validate_access(token)?;
        let user_id = claims.user_id()?;

        if self.is_revoked(&claims).await? {
            tracing::debug!("Rejected revoked token for user {}", user_id);
            return Err(AppError::auth_invalid("Token has been revoked"));
        }

        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        tracing::Span::current().record("user_id", user_id);
        Ok(AuthenticatedUser { user, claims })
    }

    /// Whether the token's id has been revoked
    ///
    /// # Errors
    ///
    /// Returns an error if the cache lookup fails
    pub async fn is_revoked(&self, claims: &Claims) -> AppResult<bool> {
        self.cache
            .exists(&CacheKey::revoked_token(claims.jti.as_str()))
            .await
    }

    /// Revoke a token until it would have expired anyway
    ///
    /// # Errors
    ///
    /// Returns an error if the cache write fails
    pub async fn revoke(&self, claims: &Claims) -> AppResult<()> {
        let ttl = JwtManager::remaining_lifetime(claims);
        if ttl.is_zero() {
            return Ok(());
        }
        self.cache
            .set(&CacheKey::revoked_token(claims.jti.as_str()), &true, ttl)
            .await
    }

    /// Atomically revoke a token, reporting whether this call was the first
    ///
    /// Concurrent callers presenting the same token race on one cache key, so
    /// exactly one of them gets `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache write fails
    pub async fn claim_revocation(&self, claims: &Claims) -> AppResult<bool> {
        let ttl = JwtManager::remaining_lifetime(claims).max(Duration::from_secs(1));
        self.cache
            .set_if_absent(&CacheKey::revoked_token(claims.jti.as_str()), &true, ttl)
            .await
    }
}

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;
    use axum::http::{HeaderMap, HeaderValue};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
