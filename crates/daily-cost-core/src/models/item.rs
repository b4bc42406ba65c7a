// ABOUTME: Purchase item model with listing filters and sort options
// ABOUTME: The stored daily cost is refreshed whenever amount or purchase date changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A live purchase record owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Item name
    pub name: String,
    /// Day of purchase
    pub purchase_date: NaiveDate,
    /// Purchase amount, two decimals
    pub purchase_amount: f64,
    /// Daily cost as of the last write, four decimals
    pub daily_cost: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    /// Item name, trimmed
    pub name: String,
    /// Day of purchase, never in the future
    pub purchase_date: NaiveDate,
    /// Amount rounded to two decimals
    pub purchase_amount: f64,
}

/// Validated partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemChanges {
    /// New name
    pub name: Option<String>,
    /// New purchase date
    pub purchase_date: Option<NaiveDate>,
    /// New amount
    pub purchase_amount: Option<f64>,
}

impl ItemChanges {
    /// Whether the update leaves the item as it is
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.purchase_date.is_none() && self.purchase_amount.is_none()
    }
}

/// Column an item listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Day of purchase
    #[default]
    PurchaseDate,
    /// Purchase amount
    PurchaseAmount,
    /// Stored daily cost
    DailyCost,
    /// Item name
    Name,
    /// Creation time
    CreatedAt,
    /// Modification time
    UpdatedAt,
}

impl SortField {
    /// Parse a client supplied field name, falling back to purchase date
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "purchase_amount" => Self::PurchaseAmount,
            "daily_cost" => Self::DailyCost,
            "name" => Self::Name,
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            _ => Self::PurchaseDate,
        }
    }

    /// SQL column backing this field
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::PurchaseDate => "purchase_date",
            Self::PurchaseAmount => "purchase_amount",
            Self::DailyCost => "daily_cost",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse `asc` or `desc` (case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// SQL keyword
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filters applied to an item listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// Inclusive lower bound on purchase date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on purchase date
    pub end_date: Option<NaiveDate>,
    /// Ordering column
    pub sort_by: SortField,
    /// Ordering direction
    pub sort_order: SortOrder,
}
