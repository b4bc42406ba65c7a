// ABOUTME: User database operations keyed by WeChat openid
// ABOUTME: Handles login upserts, lookups, and cascading soft deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use super::Database;
use crate::errors::AppResult;
use crate::models::{NewUser, User};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const USER_COLUMNS: &str = "id, openid, unionid, nickname, avatar_url, created_at, updated_at";

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                openid TEXT NOT NULL UNIQUE,
                unionid TEXT,
                nickname TEXT,
                avatar_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                is_delete INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_openid ON users(openid)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a live user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND is_delete = 0"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a live user by openid
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_openid(&self, openid: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE openid = ?1 AND is_delete = 0"
        ))
        .bind(openid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Create the user on first login, or refresh profile fields on later ones
    ///
    /// A previously soft-deleted account with the same openid is revived, since
    /// openid is unique across the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    pub async fn upsert_user_from_login(&self, user: &NewUser) -> AppResult<User> {
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r"
            INSERT INTO users (openid, unionid, nickname, avatar_url, created_at, updated_at, is_delete)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, 0)
            ON CONFLICT(openid) DO UPDATE SET
                unionid = COALESCE(excluded.unionid, users.unionid),
                nickname = COALESCE(excluded.nickname, users.nickname),
                avatar_url = COALESCE(excluded.avatar_url, users.avatar_url),
                created_at = CASE WHEN users.is_delete = 1 THEN excluded.created_at ELSE users.created_at END,
                updated_at = excluded.updated_at,
                is_delete = 0
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.openid)
        .bind(&user.unionid)
        .bind(&user.nickname)
        .bind(&user.avatar_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_user(&row)
    }

    /// Soft-delete a user and all of their items in one transaction
    ///
    /// Returns `false` if the user was missing or already deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn soft_delete_user(&self, user_id: i64) -> AppResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET is_delete = 1, updated_at = ?2 WHERE id = ?1 AND is_delete = 0",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE items SET is_delete = 1, updated_at = ?2 WHERE user_id = ?1 AND is_delete = 0",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        openid: row.try_get("openid")?,
        unionid: row.try_get("unionid")?,
        nickname: row.try_get("nickname")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
