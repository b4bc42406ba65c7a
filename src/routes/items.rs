// ABOUTME: Route handlers for the purchased items REST API
// ABOUTME: List, get, create, update, delete, and batch delete, all scoped to the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::{json_body, path_param, query_params};
use crate::errors::AppError;
use crate::models::PaginatedData;
use crate::resources::ServerResources;
use crate::response::ApiResponse;
use crate::services::items::{
    BatchDeleteRequest, BatchDeleteResult, CreateItemRequest, ItemDetail, ItemSummary,
    ListItemsQuery, UpdateItemRequest,
};
use crate::utils::dates;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Item routes implementation
pub struct ItemRoutes;

impl ItemRoutes {
    /// Create all item routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/items",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/items/batch", delete(Self::handle_batch_delete))
            .route(
                "/api/items/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/items - one page of the caller's items
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<ListItemsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let (filter, page) = query_params(query)?.into_filter()?;

        let (items, total) = resources
            .database
            .list_items(auth.user.id, &filter, page)
            .await?;

        let today = dates::today();
        let data = PaginatedData::new(items, total, page)
            .map(|item| ItemSummary::from_item(item, today));
        Ok(ApiResponse::ok("Items retrieved", data).into_response())
    }

    /// Handle GET /api/items/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let item_id = path_param(id)?;

        let item = resources
            .database
            .get_item(auth.user.id, item_id)
            .await?
            .ok_or_else(|| AppError::item_not_found(item_id))?;

        Ok(ApiResponse::ok("Item retrieved", ItemDetail::from_item(item, dates::today()))
            .into_response())
    }

    /// Handle POST /api/items
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        payload: Result<Json<CreateItemRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let today = dates::today();
        let new_item = json_body(payload)?.validate(today)?;

        let item = resources
            .database
            .create_item(auth.user.id, &new_item, today)
            .await?;
        tracing::info!("User {} created item {}", auth.user.id, item.id);

        Ok(ApiResponse::created("Item created", ItemDetail::from_item(item, today)).into_response())
    }

    /// Handle PUT /api/items/:id - partial update, recomputing the daily cost
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        id: Result<Path<i64>, PathRejection>,
        payload: Result<Json<UpdateItemRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let item_id = path_param(id)?;
        let today = dates::today();
        let changes = json_body(payload)?.validate(today)?;

        let item = resources
            .database
            .update_item(auth.user.id, item_id, &changes, today)
            .await?
            .ok_or_else(|| AppError::item_not_found(item_id))?;

        Ok(ApiResponse::ok("Item updated", ItemDetail::from_item(item, today)).into_response())
    }

    /// Handle DELETE /api/items/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let item_id = path_param(id)?;

        if !resources
            .database
            .soft_delete_item(auth.user.id, item_id)
            .await?
        {
            return Err(AppError::item_not_found(item_id));
        }
        Ok(ApiResponse::ok("Item deleted", json!({ "id": item_id })).into_response())
    }

    /// Handle DELETE /api/items/batch
    async fn handle_batch_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        payload: Result<Json<BatchDeleteRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let ids = json_body(payload)?.validated_ids()?;

        let deleted = resources
            .database
            .soft_delete_items(auth.user.id, &ids)
            .await?;
        if deleted.is_empty() {
            return Err(AppError::no_items_found());
        }

        let result = BatchDeleteResult::from(deleted);
        Ok(ApiResponse::ok(
            format!("Deleted {} items", result.deleted_count),
            result,
        )
        .into_response())
    }
}
