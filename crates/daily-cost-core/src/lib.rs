// ABOUTME: Core types and constants for the Daily Cost expense tracking service
// ABOUTME: Foundation crate with error handling, domain models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

#![deny(unsafe_code)]

//! # Daily Cost Core
//!
//! Foundation crate providing shared types and constants for the Daily Cost
//! server. This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and the error envelope
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Users, items, and the WeChat login session record
//! - **pagination**: Offset pagination for item listings

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Core data models (User, Item, `LoginSession`)
pub mod models;

/// Offset pagination for list endpoints
pub mod pagination;
