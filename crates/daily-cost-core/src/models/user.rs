// ABOUTME: User model bound to a WeChat openid
// ABOUTME: Users are soft-deleted, so a loaded User is always live
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live (non-deleted) user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: i64,
    /// WeChat openid, unique per app
    pub openid: String,
    /// WeChat unionid, shared across apps of one developer account
    pub unionid: Option<String>,
    /// Display name from the WeChat profile
    pub nickname: Option<String>,
    /// Avatar URL from the WeChat profile
    pub avatar_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last profile update
    pub updated_at: DateTime<Utc>,
}

/// Profile fields used to create or refresh a user after login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// WeChat openid
    pub openid: String,
    /// WeChat unionid
    pub unionid: Option<String>,
    /// Display name
    pub nickname: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
}
