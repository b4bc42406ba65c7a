// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides service info, ping, liveness, and a readiness probe over database and cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! Health check routes for service monitoring
//!
//! `/ready` touches the database and the cache; the other endpoints never
//! leave the process.

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::response::ApiResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all service info and health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_root))
            .route("/ping", get(Self::handle_ping))
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_root(State(resources): State<Arc<ServerResources>>) -> Response {
        let app = &resources.config.app;
        ApiResponse::ok(
            format!("Welcome to {}", app.name),
            json!({
                "app_name": app.name,
                "version": app.version,
                "description": app.description,
                "status": "running",
            }),
        )
        .into_response()
    }

    async fn handle_ping(State(resources): State<Arc<ServerResources>>) -> Response {
        let config = &resources.config;
        ApiResponse::ok(
            "pong",
            json!({
                "message": "pong",
                "app_name": config.app.name,
                "version": config.app.version,
                "debug": config.debug_mode,
            }),
        )
        .into_response()
    }

    async fn handle_health() -> Response {
        ApiResponse::ok(
            "Service is healthy",
            json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .into_response()
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        if let Err(e) = resources.database.ping().await {
            tracing::warn!("Readiness check failed on database: {}", e);
            return Err(AppError::service_unavailable("Database is not reachable"));
        }
        if let Err(e) = resources.cache.health_check().await {
            tracing::warn!("Readiness check failed on cache: {}", e);
            return Err(AppError::service_unavailable("Cache is not reachable"));
        }

        Ok(ApiResponse::ok(
            "Service is ready",
            json!({
                "status": "ready",
                "database": "ok",
                "cache": resources.cache.backend_name(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .into_response())
    }
}
