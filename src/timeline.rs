//! Canonical monthly period grid for a simulation run
//!
//! Every component of the engine works against the same `Timeline`: an
//! ordered, contiguous, duplicate-free sequence of calendar months. The
//! period index is the universal join key across rate series, domain
//! cashflows, and the unified ledger.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One discrete month in the simulation horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Zero-based month index within the horizon
    pub index: u32,
    /// First calendar day of the month
    pub date: NaiveDate,
}

/// Ordered sequence of monthly periods, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    periods: Vec<Period>,
}

impl Timeline {
    /// Build an inclusive monthly timeline from `start` through `end`.
    ///
    /// Both dates are snapped to the first of their month before the grid is
    /// generated, so any day within a month selects that whole month.
    pub fn monthly(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        let start = month_start(start);
        let end = month_start(end);
        if end < start {
            return Err(EngineError::InvalidRange(format!(
                "end month {} precedes start month {}",
                end, start
            )));
        }
        Self::with_months(start, months_between(start, end) + 1)
    }

    /// Build a timeline of `months` periods starting at `start`'s month.
    pub fn with_months(start: NaiveDate, months: u32) -> Result<Self, EngineError> {
        if months == 0 {
            return Err(EngineError::InvalidRange(
                "horizon must cover at least one month".to_string(),
            ));
        }
        let start = month_start(start);
        let periods = (0..months)
            .map(|i| Period {
                index: i,
                date: start + Months::new(i),
            })
            .collect();
        Ok(Self { periods })
    }

    /// Number of periods in the horizon
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// All periods in order
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Whether a period index falls inside the horizon
    pub fn contains(&self, index: u32) -> bool {
        (index as usize) < self.periods.len()
    }

    /// Calendar date of a period's month start, if inside the horizon
    pub fn date_of(&self, index: u32) -> Option<NaiveDate> {
        self.periods.get(index as usize).map(|p| p.date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }
}

/// Snap a date to the first of its month
fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Whole months from `a` to `b`; caller guarantees `b >= a`
fn months_between(a: NaiveDate, b: NaiveDate) -> u32 {
    let years = b.year() - a.year();
    let months = years * 12 + b.month() as i32 - a.month() as i32;
    months as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_grid_is_contiguous() {
        let tl = Timeline::monthly(date(2025, 1, 1), date(2025, 12, 1)).unwrap();
        assert_eq!(tl.len(), 12);
        for (i, p) in tl.iter().enumerate() {
            assert_eq!(p.index as usize, i);
            assert_eq!(p.date.day(), 1);
        }
        assert_eq!(tl.periods()[11].date, date(2025, 12, 1));
    }

    #[test]
    fn test_grid_crosses_year_boundary() {
        let tl = Timeline::monthly(date(2025, 11, 15), date(2026, 2, 3)).unwrap();
        assert_eq!(tl.len(), 4);
        assert_eq!(tl.periods()[0].date, date(2025, 11, 1));
        assert_eq!(tl.periods()[3].date, date(2026, 2, 1));
    }

    #[test]
    fn test_mid_month_dates_snap_to_month_start() {
        let tl = Timeline::with_months(date(2025, 6, 17), 3).unwrap();
        assert_eq!(tl.periods()[0].date, date(2025, 6, 1));
        assert_eq!(tl.periods()[2].date, date(2025, 8, 1));
    }

    #[test]
    fn test_single_month_range() {
        let tl = Timeline::monthly(date(2025, 3, 5), date(2025, 3, 28)).unwrap();
        assert_eq!(tl.len(), 1);
    }

    #[test]
    fn test_end_before_start_fails() {
        let err = Timeline::monthly(date(2025, 5, 1), date(2025, 4, 1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange(_)));
    }

    #[test]
    fn test_zero_months_fails() {
        let err = Timeline::with_months(date(2025, 1, 1), 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange(_)));
    }

    #[test]
    fn test_contains_and_date_of() {
        let tl = Timeline::with_months(date(2025, 1, 1), 6).unwrap();
        assert!(tl.contains(5));
        assert!(!tl.contains(6));
        assert_eq!(tl.date_of(2), Some(date(2025, 3, 1)));
        assert_eq!(tl.date_of(6), None);
    }
}
