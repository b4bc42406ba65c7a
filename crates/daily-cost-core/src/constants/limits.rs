// ABOUTME: Validation and pagination limits for items and statistics queries
// ABOUTME: Mirrors the column widths of the relational schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

/// Maximum item name length in characters
pub const MAX_ITEM_NAME_CHARS: usize = 255;

/// Largest amount representable as DECIMAL(10,2)
pub const MAX_PURCHASE_AMOUNT: f64 = 99_999_999.99;

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default number of months for the trends endpoint
pub const DEFAULT_TREND_MONTHS: u32 = 12;

/// Largest number of months for the trends endpoint
pub const MAX_TREND_MONTHS: u32 = 24;

/// Months of trend data embedded in the dashboard
pub const DASHBOARD_TREND_MONTHS: u32 = 6;

/// Earliest year accepted by the monthly statistics endpoint
pub const MIN_STATS_YEAR: i32 = 2020;

/// Latest year accepted by the monthly statistics endpoint
pub const MAX_STATS_YEAR: i32 = 2030;

/// Maximum ids accepted by one batch delete
pub const MAX_BATCH_DELETE_IDS: usize = 500;

/// Decimal places kept for money amounts
pub const AMOUNT_DECIMALS: u32 = 2;

/// Decimal places kept for daily cost values
pub const DAILY_COST_DECIMALS: u32 = 4;

/// Per-request processing deadline in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest accepted request body
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
