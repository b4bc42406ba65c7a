// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Request validation and view shaping for items, aggregation for statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Domain service layer
//!
//! Pure functions over models and dates. Route handlers parse the request,
//! call into the database, and hand the rows to these functions, so every
//! rule here is testable without HTTP or `SQLite`.

/// Item request validation and response views
pub mod items;

/// Overview, trend, monthly, category, and dashboard statistics
pub mod stats;
