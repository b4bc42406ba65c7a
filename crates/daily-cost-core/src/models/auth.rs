// ABOUTME: Token pair and public user summary returned by login and refresh
// ABOUTME: Also embedded in the login session record once a login succeeds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::User;
use serde::{Deserialize, Serialize};

/// Access and refresh tokens issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token for API calls
    pub access_token: String,
    /// Long-lived token exchanged for a new pair
    pub refresh_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Public subset of a user exposed to login clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id
    pub id: i64,
    /// WeChat openid
    pub openid: String,
    /// Display name
    pub nickname: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            openid: user.openid.clone(),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}
