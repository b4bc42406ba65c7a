// ABOUTME: Offset pagination module for item listings
// ABOUTME: Provides page requests with bounds checking and the paginated payload shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::constants::limits::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// One-based page number
    pub page: u32,
    /// Items per page
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, applying defaults and bounds
    ///
    /// # Errors
    ///
    /// Returns a validation error if `page` is zero or `size` is outside `1..=100`
    pub fn new(page: Option<u32>, size: Option<u32>) -> AppResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::invalid_input("page must be at least 1"));
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(AppError::invalid_input(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(Self { page, size })
    }

    /// Row offset of the first item on this page
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.size as i64
    }

    /// Row limit for this page
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size as i64
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedData<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Matching rows across all pages
    pub total: i64,
    /// One-based page number
    pub page: u32,
    /// Requested page size
    pub size: u32,
    /// Number of pages, `ceil(total / size)`
    pub pages: i64,
}

impl<T> PaginatedData<T> {
    /// Assemble a page from items and the overall total
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let size = i64::from(request.size.max(1));
        let pages = (total.max(0) + size - 1) / size;
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
            pages,
        }
    }

    /// Transform the items while keeping pagination metadata
    #[must_use]
    pub fn map<U, F>(self, f: F) -> PaginatedData<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedData {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}
