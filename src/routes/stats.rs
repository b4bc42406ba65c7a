// ABOUTME: Route handlers for spend statistics
// ABOUTME: Overview, trends, monthly breakdown, category placeholder, and the combined dashboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::query_params;
use crate::constants::limits::DASHBOARD_TREND_MONTHS;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::response::ApiResponse;
use crate::services::stats::{self, MonthlyQuery, MonthlyStats, Trends, TrendsQuery};
use crate::utils::dates;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

/// Statistics routes implementation
pub struct StatsRoutes;

impl StatsRoutes {
    /// Create all statistics routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/stats/overview", get(Self::handle_overview))
            .route("/api/stats/trends", get(Self::handle_trends))
            .route("/api/stats/monthly", get(Self::handle_monthly))
            .route("/api/stats/category", get(Self::handle_category))
            .route("/api/stats/dashboard", get(Self::handle_dashboard))
            .with_state(resources)
    }

    async fn load_trends(
        resources: &ServerResources,
        user_id: i64,
        today: NaiveDate,
        months: u32,
    ) -> AppResult<Trends> {
        let (start, end) = stats::trend_range(today, months)?;
        let totals = resources.database.monthly_totals(user_id, start, end).await?;
        Ok(stats::trends(&totals, today, months))
    }

    async fn load_month(
        resources: &ServerResources,
        user_id: i64,
        today: NaiveDate,
        year: i32,
        month: u32,
    ) -> AppResult<MonthlyStats> {
        let (start, end) = dates::month_bounds(year, month)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid month {year}-{month}")))?;
        let items = resources
            .database
            .items_purchased_between(user_id, start, end)
            .await?;
        Ok(stats::monthly(year, month, items, today))
    }

    /// Handle GET /api/stats/overview
    async fn handle_overview(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let items = resources.database.items_for_user(auth.user.id).await?;
        let overview = stats::overview(&items, dates::today());
        Ok(ApiResponse::ok("Overview statistics", overview).into_response())
    }

    /// Handle GET /api/stats/trends?months=N
    async fn handle_trends(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<TrendsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let months = query_params(query)?.months()?;
        let trends = Self::load_trends(&resources, auth.user.id, dates::today(), months).await?;
        Ok(ApiResponse::ok("Trend statistics", trends).into_response())
    }

    /// Handle GET /api/stats/monthly?year=&month=
    async fn handle_monthly(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<MonthlyQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let today = dates::today();
        let (year, month) = query_params(query)?.resolve(today)?;
        let monthly = Self::load_month(&resources, auth.user.id, today, year, month).await?;
        Ok(ApiResponse::ok("Monthly statistics", monthly).into_response())
    }

    /// Handle GET /api/stats/category
    async fn handle_category(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        resources.auth.authenticate(&headers).await?;
        Ok(ApiResponse::ok("Category statistics", stats::category_placeholder()).into_response())
    }

    /// Handle GET /api/stats/dashboard
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers).await?;
        let user_id = auth.user.id;
        let today = dates::today();

        let items = resources.database.items_for_user(user_id).await?;
        let overview = stats::overview(&items, today);
        let trends = Self::load_trends(&resources, user_id, today, DASHBOARD_TREND_MONTHS).await?;
        let current_month =
            Self::load_month(&resources, user_id, today, today.year(), today.month()).await?;

        let dashboard = stats::dashboard(overview, trends, current_month);
        Ok(ApiResponse::ok("Dashboard statistics", dashboard).into_response())
    }
}
