//! Aggregation of domain series into the unified ledger
//!
//! The aggregator is the join point of the pipeline: it merges every domain's
//! cashflow series by period key, validates alignment against the timeline,
//! and computes net and cumulative totals. It depends only on the
//! `CashflowSeries` shape, never on which module produced a series.

mod kpi;

pub use kpi::{break_even, break_even_costs, burn_rate, net_present_value, total_cost_of_ownership, BreakEven};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::EngineError;
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

/// One period of the unified ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub period: u32,
    pub date: NaiveDate,
    /// Net amount contributed by each domain this period
    pub by_domain: BTreeMap<String, f64>,
    /// Sum of all domain amounts for the period
    pub net: f64,
    /// Running total of net through this period
    pub cumulative_net: f64,
}

/// Period-keyed merge of all domain series, plus derived totals.
///
/// Derived purely from the timeline and the input series; recomputed fully on
/// any input change, never incrementally patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedLedger {
    rows: Vec<LedgerRow>,
}

impl UnifiedLedger {
    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Net amounts in period order
    pub fn net_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net).collect()
    }

    /// Cumulative net amounts in period order
    pub fn cumulative_net_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cumulative_net).collect()
    }

    /// Cumulative cost curve: negated cumulative net, so a rising curve
    /// means money going out. This is the series KPIs compare.
    pub fn cumulative_cost_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| -r.cumulative_net).collect()
    }

    /// Domain keys present in the ledger
    pub fn domains(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|r| r.by_domain.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Merge domain series into a unified ledger.
///
/// Every series' period domain must be a subset of the timeline, with
/// periods strictly increasing; timeline periods a series does not carry are
/// explicitly zero-filled. Two series for the same domain are rejected
/// rather than silently merged.
pub fn aggregate(
    timeline: &Timeline,
    series: &[CashflowSeries],
) -> Result<UnifiedLedger, EngineError> {
    let n = timeline.len();

    // Per-domain nets aligned to the timeline
    let mut domain_nets: Vec<(&str, Vec<f64>)> = Vec::with_capacity(series.len());
    for s in series {
        if domain_nets.iter().any(|(d, _)| *d == s.domain()) {
            return Err(EngineError::MisalignedSeries {
                domain: s.domain().to_string(),
                reason: "duplicate series for domain".to_string(),
            });
        }

        let mut nets = vec![0.0; n];
        let mut last_period: Option<u32> = None;
        for row in s.rows() {
            if !timeline.contains(row.period) {
                return Err(EngineError::MisalignedSeries {
                    domain: s.domain().to_string(),
                    reason: format!(
                        "period {} is outside the {}-period timeline",
                        row.period, n
                    ),
                });
            }
            if last_period.is_some_and(|p| row.period <= p) {
                return Err(EngineError::MisalignedSeries {
                    domain: s.domain().to_string(),
                    reason: format!("periods not strictly increasing at {}", row.period),
                });
            }
            last_period = Some(row.period);
            nets[row.period as usize] = row.net();
        }
        domain_nets.push((s.domain(), nets));
    }

    let mut rows = Vec::with_capacity(n);
    let mut cumulative = 0.0;
    for period in timeline.iter() {
        let idx = period.index as usize;
        let by_domain: BTreeMap<String, f64> = domain_nets
            .iter()
            .map(|(domain, nets)| (domain.to_string(), nets[idx]))
            .collect();
        let net: f64 = by_domain.values().sum();
        cumulative += net;
        rows.push(LedgerRow {
            period: period.index,
            date: period.date,
            by_domain,
            net,
            cumulative_net: cumulative,
        });
    }

    Ok(UnifiedLedger { rows })
}
