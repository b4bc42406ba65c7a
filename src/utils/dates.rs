// ABOUTME: Purchase date arithmetic for daily cost and statistics
// ABOUTME: Parses YYYY-MM-DD dates, counts ownership days, and walks calendar months
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use chrono::{Datelike, Local, Months, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the server's local time zone
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` date
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Days between purchase and `today`, zero for future dates
#[must_use]
pub fn days_used(purchase_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - purchase_date).num_days().max(0)
}

/// Purchase amount spread over the days owned, at least one day
#[must_use]
pub fn daily_cost(purchase_amount: f64, purchase_date: NaiveDate, today: NaiveDate) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let days = days_used(purchase_date, today).max(1) as f64;
    round_to(purchase_amount / days, 4)
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

/// First day of the given month
#[must_use]
pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Half-open `[first day, first day of next month)` range
#[must_use]
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = month_start(year, month)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((start, end))
}

/// The last `months` calendar months ending with the month of `today`, oldest first
#[must_use]
pub fn trailing_months(today: NaiveDate, months: u32) -> Vec<(i32, u32)> {
    let Some(current) = month_start(today.year(), today.month()) else {
        return Vec::new();
    };
    (0..months)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .map(|d| (d.year(), d.month()))
        .collect()
}

/// `YYYY-MM` label for a month
#[must_use]
pub fn month_label(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_is_strict() {
        assert_eq!(parse_date("2024-03-09"), Some(date(2024, 3, 9)));
        assert_eq!(parse_date(" 2024-03-09 "), Some(date(2024, 3, 9)));
        assert!(parse_date("2024-3-9").is_none());
        assert!(parse_date("2024/03/09").is_none());
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_days_used_clamps_future_dates() {
        let today = date(2024, 6, 15);
        assert_eq!(days_used(date(2024, 6, 5), today), 10);
        assert_eq!(days_used(today, today), 0);
        assert_eq!(days_used(date(2024, 7, 1), today), 0);
    }

    #[test]
    fn test_daily_cost_uses_at_least_one_day() {
        let today = date(2024, 6, 15);
        assert!((daily_cost(100.0, today, today) - 100.0).abs() < f64::EPSILON);
        assert!((daily_cost(100.0, date(2024, 6, 12), today) - 33.3333).abs() < 1e-9);
        assert!((daily_cost(50.0, date(2024, 7, 1), today) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(1.23456, 2) - 1.23).abs() < f64::EPSILON);
        assert!((round_to(2.5, 0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_bounds_roll_over_year() {
        assert_eq!(
            month_bounds(2023, 12),
            Some((date(2023, 12, 1), date(2024, 1, 1)))
        );
        assert!(month_bounds(2023, 13).is_none());
    }

    #[test]
    fn test_trailing_months_oldest_first() {
        let months = trailing_months(date(2024, 2, 29), 4);
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
        assert_eq!(trailing_months(date(2024, 2, 29), 1), vec![(2024, 2)]);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(2024, 3), "2024-03");
    }
}
