//! Health insurance cashflows
//!
//! Per-period premium under its own growth spec. The base premium comes from
//! a plan tier table or an explicit amount; an explicit amount overrides the
//! tier default.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::error::EngineError;
use crate::rates::{RateResolver, RateSpec};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "insurance";

/// Plan tiers with default monthly base premiums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Catastrophic,
    Bronze,
    Silver,
    Gold,
}

impl PlanTier {
    /// Default monthly base premium for the tier
    pub fn base_monthly_premium(self) -> f64 {
        match self {
            PlanTier::Catastrophic => 220.0,
            PlanTier::Bronze => 340.0,
            PlanTier::Silver => 470.0,
            PlanTier::Gold => 600.0,
        }
    }
}

/// Health insurance inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceInputs {
    /// Plan tier supplying the default base premium
    #[serde(default)]
    pub plan: Option<PlanTier>,

    /// Explicit monthly premium; overrides the tier default
    #[serde(default)]
    pub monthly_premium: Option<f64>,

    #[serde(default = "default_premium_growth")]
    pub premium_growth: RateSpec,
}

fn default_premium_growth() -> RateSpec {
    RateSpec::constant(0.05)
}

impl InsuranceInputs {
    fn base_premium(&self) -> Option<f64> {
        self.monthly_premium
            .or_else(|| self.plan.map(PlanTier::base_monthly_premium))
    }
}

impl CashflowModule for InsuranceInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        match self.base_premium() {
            None => Err(EngineError::invalid_input(
                DOMAIN,
                "either a plan tier or an explicit monthly premium is required",
            )),
            Some(premium) if !premium.is_finite() || premium <= 0.0 => {
                Err(EngineError::invalid_input(
                    DOMAIN,
                    format!("monthly premium must be positive, got {}", premium),
                ))
            }
            Some(_) => Ok(()),
        }
    }

    fn compute(
        &self,
        timeline: &Timeline,
        rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError> {
        self.validate()?;
        let premium = self.base_premium().unwrap_or(0.0);
        let factors = rates.resolve(&self.premium_growth, timeline)?.growth_factors();

        let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
        for (i, row) in series.rows_mut().iter_mut().enumerate() {
            row.add_part("premium", -premium * factors[i]);
        }
        Ok(series)
    }
}
