// ABOUTME: Item request validation and response views
// ABOUTME: Turns raw JSON and query input into validated models and computes per-day figures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::constants::limits::{
    AMOUNT_DECIMALS, MAX_BATCH_DELETE_IDS, MAX_ITEM_NAME_CHARS, MAX_PURCHASE_AMOUNT,
};
use crate::errors::{AppError, AppResult};
use crate::models::{Item, ItemChanges, ItemFilter, NewItem, PageRequest, SortField, SortOrder};
use crate::utils::dates;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/items`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    /// Item name
    pub name: String,
    /// `YYYY-MM-DD`
    pub purchase_date: String,
    /// Amount paid
    pub purchase_amount: f64,
}

/// Body of `PUT /api/items/:id`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    /// New name
    pub name: Option<String>,
    /// New purchase date
    pub purchase_date: Option<String>,
    /// New amount
    pub purchase_amount: Option<f64>,
}

/// Body of `DELETE /api/items/batch`
#[derive(Debug, Clone, Deserialize)]
pub struct BatchDeleteRequest {
    /// Ids to delete
    pub item_ids: Vec<i64>,
}

/// Query string of `GET /api/items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsQuery {
    /// Page number, from 1
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
    /// Name substring
    pub search: Option<String>,
    /// Inclusive lower purchase date bound
    pub start_date: Option<String>,
    /// Inclusive upper purchase date bound
    pub end_date: Option<String>,
    /// Sort column
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("name must not be empty"));
    }
    if name.chars().count() > MAX_ITEM_NAME_CHARS {
        return Err(AppError::invalid_input(format!(
            "name must be at most {MAX_ITEM_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_owned())
}

fn validate_purchase_date(value: &str, today: NaiveDate) -> AppResult<NaiveDate> {
    let date = dates::parse_date(value).ok_or_else(|| {
        AppError::invalid_input(format!(
            "purchase_date must be a YYYY-MM-DD date, got '{value}'"
        ))
    })?;
    if date > today {
        return Err(AppError::invalid_input(
            "purchase_date cannot be in the future",
        ));
    }
    Ok(date)
}

fn validate_amount(amount: f64) -> AppResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::invalid_input(
            "purchase_amount must be greater than 0",
        ));
    }
    let rounded = dates::round_to(amount, AMOUNT_DECIMALS);
    if rounded <= 0.0 {
        return Err(AppError::invalid_input(
            "purchase_amount must be at least 0.01",
        ));
    }
    if rounded > MAX_PURCHASE_AMOUNT {
        return Err(AppError::invalid_input(format!(
            "purchase_amount must not exceed {MAX_PURCHASE_AMOUNT:.2}"
        )));
    }
    Ok(rounded)
}

impl CreateItemRequest {
    /// Validate into an insertable item
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` naming the first offending field
    pub fn validate(&self, today: NaiveDate) -> AppResult<NewItem> {
        Ok(NewItem {
            name: validate_name(&self.name)?,
            purchase_date: validate_purchase_date(&self.purchase_date, today)?,
            purchase_amount: validate_amount(self.purchase_amount)?,
        })
    }
}

impl UpdateItemRequest {
    /// Validate the present fields
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` naming the first offending field
    pub fn validate(&self, today: NaiveDate) -> AppResult<ItemChanges> {
        Ok(ItemChanges {
            name: self.name.as_deref().map(validate_name).transpose()?,
            purchase_date: self
                .purchase_date
                .as_deref()
                .map(|d| validate_purchase_date(d, today))
                .transpose()?,
            purchase_amount: self.purchase_amount.map(validate_amount).transpose()?,
        })
    }
}

impl BatchDeleteRequest {
    /// Distinct ids, ascending
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` for an empty or oversized list
    pub fn validated_ids(&self) -> AppResult<Vec<i64>> {
        let mut ids = self.item_ids.clone();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Err(AppError::invalid_input("item_ids must not be empty"));
        }
        if ids.len() > MAX_BATCH_DELETE_IDS {
            return Err(AppError::invalid_input(format!(
                "at most {MAX_BATCH_DELETE_IDS} items can be deleted at once"
            )));
        }
        Ok(ids)
    }
}

/// Treat blank query values as absent
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ListItemsQuery {
    /// Split into a validated filter and page request
    ///
    /// # Errors
    ///
    /// Returns `INVALID_START_DATE` or `INVALID_END_DATE` for unparsable
    /// dates and `VALIDATION_ERROR` for bad paging or sort order
    pub fn into_filter(self) -> AppResult<(ItemFilter, PageRequest)> {
        let page = PageRequest::new(self.page, self.size)?;

        let start_date = non_blank(self.start_date.as_deref())
            .map(|v| dates::parse_date(v).ok_or_else(|| AppError::invalid_start_date(v)))
            .transpose()?;
        let end_date = non_blank(self.end_date.as_deref())
            .map(|v| dates::parse_date(v).ok_or_else(|| AppError::invalid_end_date(v)))
            .transpose()?;

        let sort_order = match non_blank(self.sort_order.as_deref()) {
            Some(value) => SortOrder::parse(value).ok_or_else(|| {
                AppError::invalid_input(format!("sort_order must be asc or desc, got '{value}'"))
            })?,
            None => SortOrder::default(),
        };
        let sort_by = non_blank(self.sort_by.as_deref())
            .map(SortField::parse_or_default)
            .unwrap_or_default();

        let filter = ItemFilter {
            search: non_blank(self.search.as_deref()).map(str::to_owned),
            start_date,
            end_date,
            sort_by,
            sort_order,
        };
        Ok((filter, page))
    }
}

/// Item row in listings, with figures computed for today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item id
    pub id: i64,
    /// Item name
    pub name: String,
    /// Purchase date
    pub purchase_date: NaiveDate,
    /// Amount paid
    pub purchase_amount: f64,
    /// Amount per day owned
    pub daily_cost: f64,
    /// Days since purchase
    pub days_used: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ItemSummary {
    /// Build the listing row as of `today`
    #[must_use]
    pub fn from_item(item: Item, today: NaiveDate) -> Self {
        Self {
            id: item.id,
            daily_cost: dates::daily_cost(item.purchase_amount, item.purchase_date, today),
            days_used: dates::days_used(item.purchase_date, today),
            name: item.name,
            purchase_date: item.purchase_date,
            purchase_amount: item.purchase_amount,
            created_at: item.created_at,
        }
    }
}

/// Single item view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Item id
    pub id: i64,
    /// Item name
    pub name: String,
    /// Purchase date
    pub purchase_date: NaiveDate,
    /// Amount paid
    pub purchase_amount: f64,
    /// Amount per day owned
    pub daily_cost: f64,
    /// Days since purchase
    pub days_used: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl ItemDetail {
    /// Build the detail view as of `today`
    #[must_use]
    pub fn from_item(item: Item, today: NaiveDate) -> Self {
        Self {
            id: item.id,
            daily_cost: dates::daily_cost(item.purchase_amount, item.purchase_date, today),
            days_used: dates::days_used(item.purchase_date, today),
            name: item.name,
            purchase_date: item.purchase_date,
            purchase_amount: item.purchase_amount,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Result of a batch delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    /// Number of items deleted
    pub deleted_count: usize,
    /// Ids that were deleted
    pub item_ids: Vec<i64>,
}

impl From<Vec<i64>> for BatchDeleteResult {
    fn from(item_ids: Vec<i64>) -> Self {
        Self {
            deleted_count: item_ids.len(),
            item_ids,
        }
    }
}
