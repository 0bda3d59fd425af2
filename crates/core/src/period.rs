//! Budget periods and expense date normalization.
//!
//! Budgets and expenses are matched by calendar month. A period is parsed
//! from path parameters exactly once and carries the normalized, two-digit
//! month from then on.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;

static YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").expect("Invalid regex pattern"));

static MONTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])$").expect("Invalid regex pattern"));

/// Accepted layouts for the time-carrying form of an expense date.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A (year, month) pair identifying one budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BudgetPeriod {
    year: i32,
    month: u32,
}

impl BudgetPeriod {
    /// Parses raw year and month path segments.
    ///
    /// The month is left-padded to two digits before validation, so `"3"`
    /// and `"03"` are the same period.
    pub fn parse(year: &str, month: &str) -> Result<Self, ValidationError> {
        let year = Self::parse_year(year)?;

        let padded = format!("{month:0>2}");
        if !MONTH_REGEX.is_match(&padded) {
            return Err(ValidationError::InvalidMonth(month.to_string()));
        }
        let month = padded
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidMonth(month.to_string()))?;

        Ok(Self { year, month })
    }

    /// Parses a raw year path segment.
    pub fn parse_year(year: &str) -> Result<i32, ValidationError> {
        if !YEAR_REGEX.is_match(year) {
            return Err(ValidationError::InvalidYear(year.to_string()));
        }
        year.parse::<i32>()
            .map_err(|_| ValidationError::InvalidYear(year.to_string()))
    }

    /// The period a calendar date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Four-digit year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Month as stored in the budgets table.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn month_i32(&self) -> i32 {
        self.month as i32
    }

    /// Zero-padded month, e.g. `"03"`.
    #[must_use]
    pub fn month_padded(&self) -> String {
        format!("{:02}", self.month)
    }

    /// First calendar day of the period (inclusive lower bound).
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First calendar day of the following period (exclusive upper bound).
    #[must_use]
    pub fn next_month_start(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Bounds `[start, end)` covering one whole calendar year.
#[must_use]
pub fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or(NaiveDate::MAX);
    (start, end)
}

/// Normalizes a client-supplied expense date to a plain calendar date.
///
/// A single trailing UTC marker (`Z`) is stripped; any time part is dropped.
pub fn parse_expense_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    if let Ok(date) = NaiveDate::parse_from_str(stripped, "%Y-%m-%d") {
        return Ok(date);
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stripped, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024", "03", 2024, 3)]
    #[case("2024", "3", 2024, 3)]
    #[case("1999", "12", 1999, 12)]
    #[case("2000", "01", 2000, 1)]
    fn test_parse_valid_period(
        #[case] year: &str,
        #[case] month: &str,
        #[case] want_year: i32,
        #[case] want_month: u32,
    ) {
        let period = BudgetPeriod::parse(year, month).unwrap();
        assert_eq!(period.year(), want_year);
        assert_eq!(period.month(), want_month);
    }

    #[rstest]
    #[case("abc")]
    #[case("1899")]
    #[case("2100")]
    #[case("24")]
    #[case("20245")]
    fn test_parse_rejects_year(#[case] year: &str) {
        assert_eq!(
            BudgetPeriod::parse(year, "01"),
            Err(ValidationError::InvalidYear(year.to_string()))
        );
    }

    #[rstest]
    #[case("13")]
    #[case("00")]
    #[case("0")]
    #[case("123")]
    #[case("ab")]
    #[case("")]
    fn test_parse_rejects_month(#[case] month: &str) {
        assert_eq!(
            BudgetPeriod::parse("2024", month),
            Err(ValidationError::InvalidMonth(month.to_string()))
        );
    }

    #[test]
    fn test_period_bounds() {
        let march = BudgetPeriod::parse("2024", "03").unwrap();
        assert_eq!(march.first_day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            march.next_month_start(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );

        let december = BudgetPeriod::parse("2024", "12").unwrap();
        assert_eq!(
            december.next_month_start(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_period_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let period = BudgetPeriod::of(date);
        assert_eq!(period.to_string(), "2024-03");
        assert_eq!(period.month_padded(), "03");
        assert_eq!(period, BudgetPeriod::parse("2024", "3").unwrap());
        assert_ne!(period, BudgetPeriod::of(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[rstest]
    #[case("2024-03-15")]
    #[case("2024-03-15T10:20:30Z")]
    #[case("2024-03-15T10:20:30.123Z")]
    #[case("2024-03-15T00:00:00")]
    #[case("2024-03-15 23:59:59")]
    #[case(" 2024-03-15 ")]
    fn test_parse_expense_date(#[case] raw: &str) {
        assert_eq!(
            parse_expense_date(raw).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[rstest]
    #[case("15/03/2024")]
    #[case("2024-02-30")]
    #[case("ZZ")]
    #[case("")]
    fn test_parse_expense_date_rejects(#[case] raw: &str) {
        assert!(matches!(
            parse_expense_date(raw),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
