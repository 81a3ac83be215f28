use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Truncate a date or timestamp string to its calendar date. Callers may pass
/// full timestamps ("2025-01-05T09:30:00Z"); only the first 10 characters are
/// significant.
pub fn date_only(input: &str) -> Result<NaiveDate, PeriodError> {
    let head: String = input.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d")
        .map_err(|_| PeriodError::InvalidDate(input.to_string()))
}

/// An inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Parse a pair of date-or-timestamp strings, truncating to date-only.
    pub fn parse(start: &str, end: &str) -> Result<Self, PeriodError> {
        Ok(DateRange {
            start: date_only(start)?,
            end: date_only(end)?,
        })
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_only_accepts_plain_date() {
        assert_eq!(date_only("2025-01-05").unwrap(), date(2025, 1, 5));
    }

    #[test]
    fn date_only_truncates_timestamps() {
        assert_eq!(
            date_only("2025-01-05T09:30:00Z").unwrap(),
            date(2025, 1, 5)
        );
        assert_eq!(
            date_only("2025-01-05 09:30:00").unwrap(),
            date(2025, 1, 5)
        );
    }

    #[test]
    fn date_only_rejects_garbage() {
        assert!(date_only("not a date").is_err());
        assert!(date_only("2025-13-40").is_err());
        assert!(date_only("").is_err());
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        assert!(range.contains(date(2025, 1, 1)));
        assert!(range.contains(date(2025, 1, 31)));
        assert!(!range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 2, 1)));
    }

    #[test]
    fn range_display() {
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        assert_eq!(range.to_string(), "2025-01-01 to 2025-01-31");
    }
}
