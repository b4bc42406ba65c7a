// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for cache keys, WeChat endpoints, tokens, and validation limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Cache-related constants (TTL, sizes, key prefixes)
pub mod cache;
/// Validation and pagination limits
pub mod limits;
/// JWT token constants
pub mod tokens;
/// WeChat open platform endpoints and login session timing
pub mod wechat;

/// Service names used in logs and info endpoints
pub mod service_names {
    /// Default application name
    pub const DAILY_COST_SERVER: &str = "daily-cost-server";
    /// Default application description
    pub const DEFAULT_DESCRIPTION: &str = "Personal expense tracking with per-day cost statistics";
}
