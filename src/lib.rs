// ABOUTME: Main library entry point for the Daily Cost expense tracking server
// ABOUTME: Wires WeChat QR login, JWT auth, item CRUD, and cost statistics over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

#![deny(unsafe_code)]

//! # Daily Cost Server
//!
//! A JSON HTTP backend for tracking personal purchases and what they cost per
//! day of ownership. Users sign in by scanning a WeChat QR code, record items
//! with a purchase date and amount, and query aggregated statistics.
//!
//! ## Architecture
//!
//! - **Config**: environment driven configuration (`.env` supported)
//! - **Database**: `SQLite` through sqlx, soft deletes everywhere
//! - **Cache**: pluggable in-memory or Redis backend for login sessions and provider tokens
//! - **WeChat**: OAuth client plus the QR login session state machine
//! - **Auth**: HS256 access/refresh token pairs with revocation
//! - **Routes**: axum routers for auth, items, statistics, and health
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use daily_cost_server::config::environment::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Daily Cost server configured on port {}", config.http_port);
//! # Ok(())
//! # }
//! ```

/// JWT token issuance and validation
pub mod auth;

/// Cache abstraction with in-memory and Redis backends
pub mod cache;

/// Environment-based configuration
pub mod config;

/// `SQLite` persistence for users and items
pub mod database;

/// Structured logging setup and event helpers
pub mod logging;

/// HTTP middleware: authentication, CORS, request ids
pub mod middleware;

/// Shared server state
pub mod resources;

/// Success response envelope
pub mod response;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Item and statistics business logic
pub mod services;

/// HTTP client builders and date helpers
pub mod utils;

/// WeChat OAuth client and QR login sessions
pub mod wechat;

/// Re-export of the core error types
pub mod errors {
    pub use daily_cost_core::errors::*;
}

/// Re-export of the core constants
pub mod constants {
    pub use daily_cost_core::constants::*;
}

/// Re-export of the core models
pub mod models {
    pub use daily_cost_core::models::*;
    pub use daily_cost_core::pagination::{PageRequest, PaginatedData};
}
