// ABOUTME: WeChat open platform endpoints, OAuth parameters, and login session timing
// ABOUTME: Base URLs are defaults and can be overridden through configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// WeChat API host
pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com";

/// WeChat open platform host serving the QR connect page
pub const DEFAULT_OPEN_BASE_URL: &str = "https://open.weixin.qq.com";

/// QR connect page path
pub const QR_CONNECT_PATH: &str = "/connect/qrconnect";

/// OAuth code exchange path
pub const OAUTH_ACCESS_TOKEN_PATH: &str = "/sns/oauth2/access_token";

/// User profile path
pub const USER_INFO_PATH: &str = "/sns/userinfo";

/// User access token validation path
pub const AUTH_CHECK_PATH: &str = "/sns/auth";

/// App-level credential path
pub const APP_TOKEN_PATH: &str = "/cgi-bin/token";

/// Scope for website QR login
pub const QR_LOGIN_SCOPE: &str = "snsapi_login";

/// Fragment required by the QR connect page
pub const QR_REDIRECT_FRAGMENT: &str = "#wechat_redirect";

/// Login session lifetime in seconds
pub const LOGIN_SESSION_TTL_SECS: u64 = 300;

/// Default `expires_in` when the provider omits it
pub const DEFAULT_APP_TOKEN_EXPIRES_IN_SECS: i64 = 7_200;

/// Upper bound on how long the app token is cached (110 minutes)
pub const MAX_APP_TOKEN_CACHE_SECS: i64 = 6_600;

/// Safety margin subtracted from the provider expiry before caching
pub const APP_TOKEN_EXPIRY_MARGIN_SECS: i64 = 600;
