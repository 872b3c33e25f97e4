//! Per-domain cashflow series
//!
//! Each domain module produces one `CashflowSeries` over the shared
//! timeline. Sign convention throughout the engine: outflows are negative,
//! inflows positive. Amounts within a period are named sub-amounts (for a
//! mortgage: "interest", "principal", "escrow") so downstream consumers can
//! attribute costs without re-deriving them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::timeline::Timeline;

/// One period's named sub-amounts for a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesRow {
    pub period: u32,
    /// Named sub-amounts; outflow negative, inflow positive
    pub parts: BTreeMap<String, f64>,
}

impl SeriesRow {
    /// Net amount for the period: the sum of all sub-amounts
    pub fn net(&self) -> f64 {
        self.parts.values().sum()
    }

    /// Amount of one named part, zero if absent
    pub fn part(&self, name: &str) -> f64 {
        self.parts.get(name).copied().unwrap_or(0.0)
    }

    /// Accumulate an amount into a named part
    pub fn add_part(&mut self, name: &str, amount: f64) {
        *self.parts.entry(name.to_string()).or_insert(0.0) += amount;
    }
}

/// One domain's cashflows over the full timeline, never mutated after the
/// producing module returns it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowSeries {
    domain: String,
    rows: Vec<SeriesRow>,
}

impl CashflowSeries {
    /// Empty (all-zero) series covering every timeline period. Modules start
    /// from this so inactive periods stay explicitly zero-filled, e.g. the
    /// months after a loan is paid off.
    pub fn zeroed(domain: impl Into<String>, timeline: &Timeline) -> Self {
        let rows = timeline
            .iter()
            .map(|p| SeriesRow {
                period: p.index,
                parts: BTreeMap::new(),
            })
            .collect();
        Self {
            domain: domain.into(),
            rows,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [SeriesRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Net amount at a period index, zero outside the series
    pub fn net_at(&self, period: u32) -> f64 {
        self.rows
            .iter()
            .find(|r| r.period == period)
            .map(|r| r.net())
            .unwrap_or(0.0)
    }

    /// Last period carrying any non-zero amount
    pub fn last_active_period(&self) -> Option<u32> {
        self.rows
            .iter()
            .rev()
            .find(|r| r.parts.values().any(|v| *v != 0.0))
            .map(|r| r.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timeline(months: u32) -> Timeline {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Timeline::with_months(start, months).unwrap()
    }

    #[test]
    fn test_zeroed_covers_every_period() {
        let series = CashflowSeries::zeroed("housing", &timeline(6));
        assert_eq!(series.len(), 6);
        for (i, row) in series.rows().iter().enumerate() {
            assert_eq!(row.period as usize, i);
            assert_eq!(row.net(), 0.0);
        }
    }

    #[test]
    fn test_parts_accumulate() {
        let mut series = CashflowSeries::zeroed("transport", &timeline(3));
        series.rows_mut()[1].add_part("fuel", -120.0);
        series.rows_mut()[1].add_part("fuel", -30.0);
        series.rows_mut()[1].add_part("insurance", -90.0);

        assert_eq!(series.rows()[1].part("fuel"), -150.0);
        assert_eq!(series.net_at(1), -240.0);
        assert_eq!(series.net_at(0), 0.0);
    }

    #[test]
    fn test_last_active_period() {
        let mut series = CashflowSeries::zeroed("debt", &timeline(5));
        assert_eq!(series.last_active_period(), None);
        series.rows_mut()[2].add_part("principal", -400.0);
        assert_eq!(series.last_active_period(), Some(2));
    }
}
