// ABOUTME: Route module organization for the Daily Cost HTTP endpoints
// ABOUTME: Groups routers by domain and maps extractor rejections onto the error envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Route module for the Daily Cost server
//!
//! Each domain module contains route definitions and thin handlers that
//! authenticate, parse, call the database and service layers, and wrap the
//! result in [`crate::response::ApiResponse`].

/// WeChat QR login, token refresh, logout, and current user routes
pub mod auth;
/// Service info, liveness, and readiness routes
pub mod health;
/// Item CRUD routes
pub mod items;
/// Statistics routes
pub mod stats;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use items::ItemRoutes;
pub use stats::StatsRoutes;

use crate::errors::{AppError, AppResult};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Unwrap query parameters, reporting malformed input as a validation error
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Unwrap a path parameter, reporting malformed input as a validation error
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}
