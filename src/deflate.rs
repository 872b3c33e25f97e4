//! Presentation-time inflation deflator
//!
//! Converts nominal amounts to base-period real values for display and
//! comparison. A pure, read-only transform: it allocates its own output and
//! never feeds back into the ledger, which always stays nominal.

use crate::error::EngineError;
use crate::ledger::UnifiedLedger;
use crate::rates::ResolvedRateSeries;

/// Deflate a nominal per-period series to base-period dollars.
///
/// `inflation` is the resolved general price-level series; the price index
/// at period t is the cumulative product of monthly factors up to t. Real
/// value: `nominal[t] x index[base] / index[t]`. Amounts at the base period
/// pass through unchanged.
pub fn deflate_series(
    nominal: &[f64],
    inflation: &ResolvedRateSeries,
    base_period: u32,
) -> Result<Vec<f64>, EngineError> {
    if inflation.len() != nominal.len() {
        return Err(EngineError::MisalignedSeries {
            domain: "deflator".to_string(),
            reason: format!(
                "price series covers {} periods, nominal series {}",
                inflation.len(),
                nominal.len()
            ),
        });
    }
    let index = inflation.growth_factors();
    let base = index.get(base_period as usize).copied().ok_or_else(|| {
        EngineError::invalid_input(
            "deflator",
            format!("base period {} is outside the {}-period horizon", base_period, index.len()),
        )
    })?;

    Ok(nominal
        .iter()
        .zip(index.iter())
        .map(|(value, idx)| value * base / idx)
        .collect())
}

/// Real (base-period) net series for a ledger
pub fn deflate_net(
    ledger: &UnifiedLedger,
    inflation: &ResolvedRateSeries,
    base_period: u32,
) -> Result<Vec<f64>, EngineError> {
    deflate_series(&ledger.net_series(), inflation, base_period)
}
