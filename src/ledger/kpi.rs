//! Decision metrics derived from unified ledgers
//!
//! All KPIs are pure reads over the ledger: they allocate their own output
//! and never mutate the underlying series, so any of them can be recomputed
//! from the same ledger at will.

use serde::Serialize;

use crate::error::EngineError;
use crate::rates::annual_to_monthly;
use crate::series::CashflowSeries;

use super::UnifiedLedger;

/// Break-even outcome between two scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakEven {
    /// First period where A's cumulative cost is no greater than B's
    At(u32),
    /// The cumulative cost curves never cross inside the horizon
    NotWithinHorizon,
}

/// Break-even between two ledgers over the same timeline.
///
/// Compares cumulative cost curves (outflow positive). Ledgers of different
/// lengths were built against different timelines and cannot be compared.
pub fn break_even(a: &UnifiedLedger, b: &UnifiedLedger) -> Result<BreakEven, EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::MisalignedSeries {
            domain: "break_even".to_string(),
            reason: format!("ledger lengths differ: {} vs {}", a.len(), b.len()),
        });
    }
    Ok(break_even_costs(
        &a.cumulative_cost_series(),
        &b.cumulative_cost_series(),
    ))
}

/// Break-even on raw cumulative cost curves.
///
/// Returns the first period where `a <= b`. A pair that starts with
/// `a <= b` breaks even at period 0 (scenario A was never the more
/// expensive one); curves that never cross report `NotWithinHorizon`
/// rather than failing.
pub fn break_even_costs(a: &[f64], b: &[f64]) -> BreakEven {
    for (k, (cost_a, cost_b)) in a.iter().zip(b.iter()).enumerate() {
        if cost_a <= cost_b {
            return BreakEven::At(k as u32);
        }
    }
    BreakEven::NotWithinHorizon
}

/// Total cost of ownership for one domain through the first `months`
/// periods: the cumulative sum of that domain's outflow components,
/// financing and recurring costs included. Inflow components (e.g. roommate
/// contributions) do not offset the cost. Returned as a positive amount.
pub fn total_cost_of_ownership(series: &CashflowSeries, months: u32) -> f64 {
    series
        .rows()
        .iter()
        .filter(|row| row.period < months)
        .flat_map(|row| row.parts.values())
        .filter(|amount| **amount < 0.0)
        .sum::<f64>()
        .abs()
}

/// Trailing moving average of net outflow per period.
///
/// Net outflow is `max(0, -net)`: a period that nets an inflow burns
/// nothing. Early periods average over the periods seen so far. The
/// returned iterator is lazy, finite, and restartable: calling again on the
/// same ledger yields the same sequence.
pub fn burn_rate(ledger: &UnifiedLedger, window: usize) -> impl Iterator<Item = f64> + '_ {
    let window = window.max(1);
    let rows = ledger.rows();
    let mut sum = 0.0;
    rows.iter().enumerate().map(move |(i, row)| {
        sum += (-row.net).max(0.0);
        if i >= window {
            sum -= (-rows[i - window].net).max(0.0);
        }
        sum / window.min(i + 1) as f64
    })
}

/// Net present value of the ledger's net series at an effective annual
/// discount rate, discounted monthly to period 0.
pub fn net_present_value(
    ledger: &UnifiedLedger,
    annual_discount_rate: f64,
) -> Result<f64, EngineError> {
    let monthly = annual_to_monthly(annual_discount_rate)?;
    Ok(ledger
        .rows()
        .iter()
        .map(|row| row.net / (1.0 + monthly).powi(row.period as i32))
        .sum())
}
