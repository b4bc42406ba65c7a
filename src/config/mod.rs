// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Loads server, database, cache, JWT, WeChat, and CORS settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Configuration module for the Daily Cost server
//!
//! - **Environment**: server configuration from environment variables and `.env`
//! - **Cache**: cache backend selection and Redis connection tuning

/// Cache backend and Redis connection settings
pub mod cache;
/// Environment and server configuration
pub mod environment;

pub use cache::{CacheSettings, RedisConnectionConfig};
pub use environment::ServerConfig;
