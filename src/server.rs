// ABOUTME: HTTP server assembly: merges domain routers and applies the tower middleware stack
// ABOUTME: Binds the listener and serves with graceful shutdown on Ctrl+C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::constants::limits::{MAX_REQUEST_BODY_BYTES, REQUEST_TIMEOUT_SECS};
use crate::errors::{set_expose_internal_errors, AppError, ErrorCode};
use crate::middleware::{request_id_middleware, request_timeout_middleware, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{AuthRoutes, HealthRoutes, ItemRoutes, StatsRoutes};
use anyhow::Result;
use axum::response::{IntoResponse, Response};
use axum::{middleware, Router};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the complete application router
///
/// Layer order, outermost first: request id, tracing, CORS, panic
/// recovery, timeout, body limit.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(ItemRoutes::routes(resources.clone()))
        .merge(StatsRoutes::routes(resources))
        .fallback(handle_not_found)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            request_timeout_middleware,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn handle_not_found() -> Response {
    AppError::new(ErrorCode::RouteNotFound, "Resource not found").into_response()
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    AppError::internal("Request handler panicked").into_response()
}

/// Run the server until Ctrl+C
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let config = resources.config.clone();
    set_expose_internal_errors(config.debug_mode);

    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port).parse()?;
    let app = build_router(resources);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} listening on {}", config.app.name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
