//! Rate specification and resolution
//!
//! A `RateSpec` is an abstract description of how a quantity grows over time.
//! The resolver turns it into a concrete per-period series aligned to the
//! timeline, with exactly one entry per period and no extrapolation beyond
//! the horizon.
//!
//! Compounding convention: annual rates are effective annual rates and are
//! converted to monthly rates geometrically, `(1 + annual)^(1/12) - 1`, so
//! twelve months of growth compound back to the stated annual rate. Naive
//! division by twelve is deliberately not used. Loan modules are the one
//! exception: they take nominal annual rates with a periodic rate of
//! nominal / 12, the standard amortization convention (see `amortize`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::timeline::Timeline;

/// Abstract description of how a rate evolves over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateSpec {
    /// Single effective annual rate held for the whole horizon
    Constant { annual: f64 },

    /// Initial annual rate plus changes taking effect at given periods
    Stepped { annual: f64, steps: Vec<RateStep> },

    /// Pre-fetched external series registered under `source`.
    /// `fallback` fills periods the series does not cover.
    External {
        source: String,
        #[serde(default)]
        fallback: Option<f64>,
    },
}

/// One rate change within a stepped spec
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateStep {
    /// First period (inclusive) at which the new rate applies
    pub from_period: u32,
    /// Effective annual rate from that period until the next change
    pub annual: f64,
}

impl RateSpec {
    /// Constant spec at the given effective annual rate
    pub fn constant(annual: f64) -> Self {
        Self::Constant { annual }
    }

    /// Constant spec at zero growth
    pub fn zero() -> Self {
        Self::Constant { annual: 0.0 }
    }
}

impl Default for RateSpec {
    fn default() -> Self {
        Self::zero()
    }
}

/// Pre-fetched external rate series, keyed by period index.
///
/// Values are effective annual rates; the resolver converts them to monthly
/// rates with the same convention as constant specs. These mappings are
/// supplied by external data-provider collaborators; the engine never
/// performs network calls itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSeries {
    pub by_period: BTreeMap<u32, f64>,
}

impl ExternalSeries {
    /// Build from (period, annual rate) pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self {
            by_period: pairs.into_iter().collect(),
        }
    }
}

/// Concrete per-period rate series; length always equals the timeline length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRateSeries {
    monthly: Vec<f64>,
}

impl ResolvedRateSeries {
    fn from_monthly(monthly: Vec<f64>) -> Self {
        Self { monthly }
    }

    pub fn len(&self) -> usize {
        self.monthly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty()
    }

    /// Monthly rates in period order
    pub fn as_slice(&self) -> &[f64] {
        &self.monthly
    }

    /// Cumulative growth factors: `factor[0] = 1`, each subsequent period
    /// multiplies by `1 + monthly`. A base amount times `factor[t]` is the
    /// amount grown through period `t`.
    pub fn growth_factors(&self) -> Vec<f64> {
        let mut factors = Vec::with_capacity(self.monthly.len());
        let mut acc = 1.0;
        for rate in &self.monthly {
            factors.push(acc);
            acc *= 1.0 + rate;
        }
        factors
    }
}

/// Resolves rate specs against a timeline.
///
/// Holds the registry of pre-fetched external series. Shared read-only by all
/// domain modules during a run.
#[derive(Debug, Clone, Default)]
pub struct RateResolver {
    external: HashMap<String, ExternalSeries>,
}

impl RateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-fetched external series under a source name
    pub fn register(&mut self, source: impl Into<String>, series: ExternalSeries) {
        self.external.insert(source.into(), series);
    }

    /// Builder-style registration
    pub fn with_series(mut self, source: impl Into<String>, series: ExternalSeries) -> Self {
        self.register(source, series);
        self
    }

    /// Resolve a spec to one monthly rate per timeline period.
    ///
    /// Stepped specs: a change takes effect at its period (inclusive) and
    /// holds until the next change or horizon end. Two changes declared for
    /// the same period resolve last-write-wins. Changes beyond the horizon
    /// never take effect.
    pub fn resolve(
        &self,
        spec: &RateSpec,
        timeline: &Timeline,
    ) -> Result<ResolvedRateSeries, EngineError> {
        let n = timeline.len();
        let monthly = match spec {
            RateSpec::Constant { annual } => {
                let rate = annual_to_monthly(*annual)?;
                vec![rate; n]
            }
            RateSpec::Stepped { annual, steps } => {
                let mut changes: BTreeMap<u32, f64> = BTreeMap::new();
                for step in steps {
                    // Later declarations overwrite earlier ones at the same period
                    changes.insert(step.from_period, step.annual);
                }
                let mut out = Vec::with_capacity(n);
                let mut current = *annual;
                for i in 0..n as u32 {
                    if let Some(&next) = changes.get(&i) {
                        current = next;
                    }
                    out.push(annual_to_monthly(current)?);
                }
                out
            }
            RateSpec::External { source, fallback } => {
                let series = self.external.get(source);
                let mut out = Vec::with_capacity(n);
                for i in 0..n as u32 {
                    let annual = series
                        .and_then(|s| s.by_period.get(&i).copied())
                        .or(*fallback)
                        .ok_or_else(|| EngineError::MissingRateData {
                            source_name: source.clone(),
                            reason: format!(
                                "period {} has no value and no fallback rate is configured",
                                i
                            ),
                        })?;
                    out.push(annual_to_monthly(annual)?);
                }
                out
            }
        };
        Ok(ResolvedRateSeries::from_monthly(monthly))
    }
}

/// Convert an effective annual rate to the equivalent monthly rate.
///
/// Rejects rates at or below -100%, where the growth multiplier stops being
/// positive; such inputs are an error, never clamped.
pub(crate) fn annual_to_monthly(annual: f64) -> Result<f64, EngineError> {
    if !annual.is_finite() || annual <= -1.0 {
        return Err(EngineError::invalid_input(
            "rates",
            format!("annual rate {} does not yield a positive growth multiplier", annual),
        ));
    }
    Ok((1.0 + annual).powf(1.0 / 12.0) - 1.0)
}
