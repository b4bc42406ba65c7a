// ABOUTME: Purchased item database operations scoped to the owning user
// ABOUTME: Handles create, filtered listing, partial updates, and single and batch soft deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::Database;
use crate::errors::AppResult;
use crate::models::{Item, ItemChanges, ItemFilter, NewItem, PageRequest};
use crate::utils::dates;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const ITEM_COLUMNS: &str =
    "id, user_id, name, purchase_date, purchase_amount, daily_cost, created_at, updated_at";

impl Database {
    pub(super) async fn migrate_items(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                name TEXT NOT NULL,
                purchase_date TEXT NOT NULL,
                purchase_amount REAL NOT NULL,
                daily_cost REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                is_delete INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_items_user_live_date ON items(user_id, is_delete, purchase_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert an item, storing its daily cost as of `today`
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_item(
        &self,
        user_id: i64,
        item: &NewItem,
        today: NaiveDate,
    ) -> AppResult<Item> {
        let now = Utc::now();
        let daily_cost = dates::daily_cost(item.purchase_amount, item.purchase_date, today);

        let row = sqlx::query(&format!(
            r"
            INSERT INTO items (user_id, name, purchase_date, purchase_amount, daily_cost, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&item.name)
        .bind(item.purchase_date)
        .bind(item.purchase_amount)
        .bind(daily_cost)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_item(&row)
    }

    /// Get a live item owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_item(&self, user_id: i64, item_id: i64) -> AppResult<Option<Item>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND user_id = ?2 AND is_delete = 0"
        ))
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    /// One page of a user's items plus the total number of matches
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails
    pub async fn list_items(
        &self,
        user_id: i64,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Item>, i64)> {
        // Parameterized conditions; only whitelisted column names are interpolated
        let mut conditions = vec!["user_id = ?".to_owned(), "is_delete = 0".to_owned()];
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push(r"name LIKE ? ESCAPE '\'".to_owned());
            bind_values.push(format!("%{}%", escape_like(search)));
        }
        if let Some(start) = filter.start_date {
            conditions.push("purchase_date >= ?".to_owned());
            bind_values.push(start.to_string());
        }
        if let Some(end) = filter.end_date {
            conditions.push("purchase_date <= ?".to_owned());
            bind_values.push(end.to_string());
        }

        let where_clause = conditions.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM items WHERE {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let direction = filter.sort_order.as_sql();
        let list_sql = format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE {where_clause}
            ORDER BY {column} {direction}, id {direction}
            LIMIT ? OFFSET ?
            ",
            column = filter.sort_by.column(),
        );
        let mut list_query = sqlx::query(&list_sql).bind(user_id);
        for value in &bind_values {
            list_query = list_query.bind(value);
        }
        let rows = list_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.iter().map(row_to_item).collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Apply changes to a live item, recomputing its daily cost
    ///
    /// Returns `None` if the item does not exist for this user.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        changes: &ItemChanges,
        today: NaiveDate,
    ) -> AppResult<Option<Item>> {
        let Some(current) = self.get_item(user_id, item_id).await? else {
            return Ok(None);
        };

        let name = changes.name.as_ref().unwrap_or(&current.name);
        let purchase_date = changes.purchase_date.unwrap_or(current.purchase_date);
        let purchase_amount = changes.purchase_amount.unwrap_or(current.purchase_amount);
        let daily_cost = dates::daily_cost(purchase_amount, purchase_date, today);

        let row = sqlx::query(&format!(
            r"
            UPDATE items
            SET name = ?3, purchase_date = ?4, purchase_amount = ?5, daily_cost = ?6, updated_at = ?7
            WHERE id = ?1 AND user_id = ?2 AND is_delete = 0
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(item_id)
        .bind(user_id)
        .bind(name)
        .bind(purchase_date)
        .bind(purchase_amount)
        .bind(daily_cost)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    /// Soft-delete one item; `false` if nothing matched
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_item(&self, user_id: i64, item_id: i64) -> AppResult<bool> {
        let affected = sqlx::query(
            "UPDATE items SET is_delete = 1, updated_at = ?3 WHERE id = ?1 AND user_id = ?2 AND is_delete = 0",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// Soft-delete the live items among `item_ids` owned by `user_id`
    ///
    /// Returns the ids that were actually deleted, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn soft_delete_items(&self, user_id: i64, item_ids: &[i64]) -> AppResult<Vec<i64>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let mut tx = self.pool.begin().await?;

        let select_sql = format!(
            "SELECT id FROM items WHERE user_id = ? AND is_delete = 0 AND id IN ({placeholders}) ORDER BY id"
        );
        let mut select = sqlx::query_scalar::<_, i64>(&select_sql).bind(user_id);
        for id in item_ids {
            select = select.bind(id);
        }
        let matched = select.fetch_all(&mut *tx).await?;

        if matched.is_empty() {
            tx.rollback().await?;
            return Ok(matched);
        }

        let update_sql = format!(
            "UPDATE items SET is_delete = 1, updated_at = ? WHERE user_id = ? AND is_delete = 0 AND id IN ({})",
            vec!["?"; matched.len()].join(", ")
        );
        let mut update = sqlx::query(&update_sql).bind(Utc::now()).bind(user_id);
        for id in &matched {
            update = update.bind(id);
        }
        update.execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(matched)
    }

    /// Every live item of a user, newest purchase first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn items_for_user(&self, user_id: i64) -> AppResult<Vec<Item>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ?1 AND is_delete = 0 ORDER BY purchase_date DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_item).collect()
    }
}

/// Escape `LIKE` wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(super) fn row_to_item(row: &SqliteRow) -> AppResult<Item> {
    Ok(Item {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        purchase_date: row.try_get("purchase_date")?,
        purchase_amount: row.try_get("purchase_amount")?,
        daily_cost: row.try_get("daily_cost")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
