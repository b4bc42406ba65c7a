// ABOUTME: JWT access and refresh token issuance and validation
// ABOUTME: Signs HMAC tokens carrying user identity, token type, and a revocable token id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! # Token Management
//!
//! Every successful login yields a pair: a short-lived access token carrying
//! the user's public profile and a long-lived refresh token carrying only the
//! subject. Both carry a `jti` so logout can revoke them individually.

use crate::config::environment::{AuthConfig, JwtAlgorithm};
use crate::constants::tokens::{ACCESS_TOKEN_TYPE, BEARER, REFRESH_TOKEN_TYPE};
use crate::errors::{AppError, AppResult};
use crate::models::{TokenPair, User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let ago = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    ago.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// Which half of a token pair a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Presented on API calls
    Access,
    /// Exchanged for a new pair
    Refresh,
}

impl TokenType {
    /// Claim value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => ACCESS_TOKEN_TYPE,
            Self::Refresh => REFRESH_TOKEN_TYPE,
        }
    }
}

/// `JWT` claims for both token types
///
/// Profile fields are only present on access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string
    pub sub: String,
    /// Token type
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Unique token id used for revocation
    pub jti: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// WeChat openid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    /// Display name at issue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Avatar at issue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Claims {
    /// Numeric user id from `sub`
    ///
    /// # Errors
    ///
    /// Returns `MISSING_USER_INFO` if `sub` is not an integer
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub.parse().map_err(|_| AppError::missing_user_info())
    }
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(value: JwtAlgorithm) -> Self {
        match value {
            JwtAlgorithm::HS256 => Self::HS256,
            JwtAlgorithm::HS384 => Self::HS384,
            JwtAlgorithm::HS512 => Self::HS512,
        }
    }
}

/// Issues and validates token pairs
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    /// Build a manager from auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: config.jwt_algorithm.into(),
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::minutes(config.refresh_token_expire_minutes),
        }
    }

    /// Access token lifetime in seconds
    #[must_use]
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Issue an access/refresh pair for `user`
    ///
    /// # Errors
    ///
    /// Returns an internal error if signing fails
    pub fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        let now = Utc::now();

        let access = Claims {
            sub: user.id.to_string(),
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            openid: Some(user.openid.clone()),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
        };
        let refresh = Claims {
            sub: user.id.to_string(),
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            openid: None,
            nickname: None,
            avatar_url: None,
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            token_type: BEARER.to_owned(),
            expires_in: self.access_ttl_secs(),
        })
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Decode and verify a token of either type
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is malformed, the
    /// signature does not verify, or it has expired
    pub fn validate(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below so the error can say when
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        let current_time = Utc::now();
        if current_time.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(current_time);
            tracing::debug!(
                "JWT token expired for user {} at {}",
                claims.sub,
                expired_at.to_rfc3339()
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }

        Ok(claims)
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Validate an access token
    ///
    /// # Errors
    ///
    /// `AUTH_EXPIRED` for expired tokens, `AUTH_INVALID` for bad ones, and
    /// `WRONG_TOKEN_TYPE` for refresh tokens
    pub fn validate_access(&self, token: &str) -> AppResult<Claims> {
        let claims = self.validate(token).map_err(|e| match e {
            JwtValidationError::TokenExpired { .. } => AppError::auth_expired(),
            other => AppError::auth_invalid(other.to_string()),
        })?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::wrong_token_type(ACCESS_TOKEN_TYPE));
        }
        Ok(claims)
    }

    /// Validate a refresh token
    ///
    /// # Errors
    ///
    /// `INVALID_REFRESH_TOKEN` for expired or bad tokens and `WRONG_TOKEN_TYPE`
    /// for access tokens
    pub fn validate_refresh(&self, token: &str) -> AppResult<Claims> {
        let claims = self
            .validate(token)
            .map_err(|e| AppError::invalid_refresh_token(e.to_string()))?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::wrong_token_type(REFRESH_TOKEN_TYPE));
        }
        Ok(claims)
    }

    /// Time until the token expires, zero if already expired
    #[must_use]
    pub fn remaining_lifetime(claims: &Claims) -> std::time::Duration {
        let remaining = claims.exp - Utc::now().timestamp();
        std::time::Duration::from_secs(u64::try_from(remaining).unwrap_or(0))
    }
}
