// ABOUTME: Aggregate item queries backing the statistics endpoints
// ABOUTME: Groups spend by purchase month and fetches items purchased within a date range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::items::row_to_item;
use super::Database;
use crate::errors::AppResult;
use crate::models::Item;
use chrono::NaiveDate;
use sqlx::Row;

/// Items added and amount spent in one purchase month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    /// Number of items purchased that month
    pub items_added: i64,
    /// Sum of purchase amounts
    pub total_spent: f64,
}

impl Database {
    /// Per-month totals for purchases in `[start, end)`, only months with data
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn monthly_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = sqlx::query(
            r"
            SELECT substr(purchase_date, 1, 7) AS month,
                   COUNT(*) AS items_added,
                   COALESCE(SUM(purchase_amount), 0.0) AS total_spent
            FROM items
            WHERE user_id = ?1 AND is_delete = 0
              AND purchase_date >= ?2 AND purchase_date < ?3
            GROUP BY month
            ORDER BY month
            ",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MonthlyTotal {
                    month: row.try_get("month")?,
                    items_added: row.try_get("items_added")?,
                    total_spent: row.try_get("total_spent")?,
                })
            })
            .collect()
    }

    /// Items purchased in `[start, end)`, newest purchase first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn items_purchased_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Item>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, purchase_date, purchase_amount, daily_cost, created_at, updated_at
            FROM items
            WHERE user_id = ?1 AND is_delete = 0
              AND purchase_date >= ?2 AND purchase_date < ?3
            ORDER BY purchase_date DESC, id DESC
            ",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_item).collect()
    }
}
