//! Housing cashflows: rent or mortgage
//!
//! The two variants are mutually exclusive; a scenario houses its occupant
//! one way. Rent grows period over period under its resolved growth series;
//! a mortgage amortizes with the shared fixed-payment algorithm and carries
//! an escrow component under its own growth spec.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::amortize::{amortize, LoanTerms};
use crate::error::EngineError;
use crate::rates::{RateResolver, RateSpec};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "housing";

/// Housing inputs, one variant per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HousingInputs {
    Rent(RentInputs),
    Mortgage(MortgageInputs),
}

/// Rental scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentInputs {
    /// Monthly rent before roommate contributions
    pub base_monthly_rent: f64,

    /// Number of roommates sharing the rent (0 = living alone)
    #[serde(default)]
    pub roommates: u8,

    /// Share of total rent covered by roommates (0.5 = they pay half)
    #[serde(default)]
    pub roommate_contribution_pct: f64,

    /// Monthly renters insurance premium
    #[serde(default)]
    pub renters_insurance_monthly: f64,

    /// Monthly utilities not included in rent
    #[serde(default)]
    pub utilities_monthly: f64,

    #[serde(default = "default_rent_growth")]
    pub rent_growth: RateSpec,

    #[serde(default = "default_insurance_growth")]
    pub insurance_growth: RateSpec,

    #[serde(default = "default_utilities_growth")]
    pub utilities_growth: RateSpec,
}

fn default_rent_growth() -> RateSpec {
    RateSpec::constant(0.05)
}
fn default_insurance_growth() -> RateSpec {
    RateSpec::constant(0.03)
}
fn default_utilities_growth() -> RateSpec {
    RateSpec::constant(0.025)
}

/// Home purchase scenario financed with a fixed-rate mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInputs {
    /// Loan principal at period 0
    pub principal: f64,

    /// Nominal annual rate (periodic rate is nominal / 12)
    pub annual_rate: f64,

    /// Loan term in months
    pub term_months: u32,

    /// Monthly escrow (property tax and homeowners insurance)
    #[serde(default)]
    pub escrow_monthly: f64,

    #[serde(default = "default_escrow_growth")]
    pub escrow_growth: RateSpec,
}

fn default_escrow_growth() -> RateSpec {
    RateSpec::constant(0.02)
}

impl MortgageInputs {
    fn loan_terms(&self) -> LoanTerms {
        LoanTerms::new(self.principal, self.annual_rate, self.term_months)
    }
}

impl CashflowModule for HousingInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        match self {
            HousingInputs::Rent(rent) => {
                if !rent.base_monthly_rent.is_finite() || rent.base_monthly_rent <= 0.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        format!("monthly rent must be positive, got {}", rent.base_monthly_rent),
                    ));
                }
                if !(0.0..=1.0).contains(&rent.roommate_contribution_pct) {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        format!(
                            "roommate contribution must be within [0, 1], got {}",
                            rent.roommate_contribution_pct
                        ),
                    ));
                }
                if rent.roommates == 0 && rent.roommate_contribution_pct > 0.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        "roommate contribution requires at least one roommate",
                    ));
                }
                if rent.renters_insurance_monthly < 0.0 || rent.utilities_monthly < 0.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        "insurance and utilities must be non-negative",
                    ));
                }
                Ok(())
            }
            HousingInputs::Mortgage(mortgage) => {
                mortgage.loan_terms().validate(DOMAIN)?;
                if mortgage.escrow_monthly < 0.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        format!("escrow must be non-negative, got {}", mortgage.escrow_monthly),
                    ));
                }
                Ok(())
            }
        }
    }

    fn compute(
        &self,
        timeline: &Timeline,
        rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError> {
        self.validate()?;
        match self {
            HousingInputs::Rent(rent) => compute_rent(rent, timeline, rates),
            HousingInputs::Mortgage(mortgage) => compute_mortgage(mortgage, timeline, rates),
        }
    }
}

fn compute_rent(
    inputs: &RentInputs,
    timeline: &Timeline,
    rates: &RateResolver,
) -> Result<CashflowSeries, EngineError> {
    let rent_factors = rates.resolve(&inputs.rent_growth, timeline)?.growth_factors();
    let insurance_factors = rates
        .resolve(&inputs.insurance_growth, timeline)?
        .growth_factors();
    let utilities_factors = rates
        .resolve(&inputs.utilities_growth, timeline)?
        .growth_factors();

    let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
    for (i, row) in series.rows_mut().iter_mut().enumerate() {
        let rent = inputs.base_monthly_rent * rent_factors[i];
        row.add_part("rent", -rent);
        if inputs.roommate_contribution_pct > 0.0 {
            row.add_part("roommate_contribution", rent * inputs.roommate_contribution_pct);
        }
        if inputs.renters_insurance_monthly > 0.0 {
            row.add_part(
                "renters_insurance",
                -inputs.renters_insurance_monthly * insurance_factors[i],
            );
        }
        if inputs.utilities_monthly > 0.0 {
            row.add_part("utilities", -inputs.utilities_monthly * utilities_factors[i]);
        }
    }
    Ok(series)
}

fn compute_mortgage(
    inputs: &MortgageInputs,
    timeline: &Timeline,
    rates: &RateResolver,
) -> Result<CashflowSeries, EngineError> {
    let schedule = amortize(&inputs.loan_terms(), DOMAIN)?;
    let escrow_factors = rates.resolve(&inputs.escrow_growth, timeline)?.growth_factors();

    let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
    let horizon = series.len();
    for entry in schedule.entries() {
        // Payments beyond the horizon are out of scope for this run
        if entry.period as usize >= horizon {
            break;
        }
        let row = &mut series.rows_mut()[entry.period as usize];
        row.add_part("interest", -entry.interest);
        row.add_part("principal", -entry.principal);
    }
    if inputs.escrow_monthly > 0.0 {
        for (i, row) in series.rows_mut().iter_mut().enumerate() {
            row.add_part("escrow", -inputs.escrow_monthly * escrow_factors[i]);
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn timeline(months: u32) -> Timeline {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Timeline::with_months(start, months).unwrap()
    }

    fn rent_inputs(base: f64) -> RentInputs {
        RentInputs {
            base_monthly_rent: base,
            roommates: 0,
            roommate_contribution_pct: 0.0,
            renters_insurance_monthly: 0.0,
            utilities_monthly: 0.0,
            rent_growth: RateSpec::constant(0.05),
            insurance_growth: RateSpec::zero(),
            utilities_growth: RateSpec::zero(),
        }
    }

    #[test]
    fn test_rent_grows_period_over_period() {
        let module = HousingInputs::Rent(rent_inputs(2_000.0));
        let series = module.compute(&timeline(13), &RateResolver::new()).unwrap();

        assert_relative_eq!(series.rows()[0].part("rent"), -2_000.0, max_relative = 1e-12);
        // After twelve months of 5% effective annual growth
        assert_relative_eq!(series.rows()[12].part("rent"), -2_100.0, max_relative = 1e-9);
    }

    #[test]
    fn test_roommates_offset_rent() {
        let mut inputs = rent_inputs(3_000.0);
        inputs.roommates = 2;
        inputs.roommate_contribution_pct = 0.5;
        let module = HousingInputs::Rent(inputs);
        let series = module.compute(&timeline(1), &RateResolver::new()).unwrap();

        assert_relative_eq!(series.rows()[0].part("roommate_contribution"), 1_500.0, max_relative = 1e-12);
        assert_relative_eq!(series.net_at(0), -1_500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rent_side_costs_use_their_own_growth() {
        let mut inputs = rent_inputs(2_000.0);
        inputs.renters_insurance_monthly = 25.0;
        inputs.utilities_monthly = 150.0;
        inputs.rent_growth = RateSpec::zero();
        inputs.insurance_growth = RateSpec::constant(0.10);
        let module = HousingInputs::Rent(inputs);
        let series = module.compute(&timeline(13), &RateResolver::new()).unwrap();

        assert_relative_eq!(series.rows()[12].part("rent"), -2_000.0, max_relative = 1e-12);
        assert_relative_eq!(series.rows()[12].part("renters_insurance"), -27.5, max_relative = 1e-9);
        assert_relative_eq!(series.rows()[12].part("utilities"), -150.0, max_relative = 1e-12);
    }

    #[test]
    fn test_mortgage_splits_interest_and_principal() {
        let module = HousingInputs::Mortgage(MortgageInputs {
            principal: 300_000.0,
            annual_rate: 0.06,
            term_months: 360,
            escrow_monthly: 0.0,
            escrow_growth: RateSpec::zero(),
        });
        let series = module.compute(&timeline(360), &RateResolver::new()).unwrap();

        // First month's interest: 300k x 0.5%
        assert_relative_eq!(series.rows()[0].part("interest"), -1_500.0, max_relative = 1e-9);
        let total_principal: f64 = series.rows().iter().map(|r| r.part("principal")).sum();
        assert_relative_eq!(total_principal, -300_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_mortgage_zero_fills_after_payoff() {
        let module = HousingInputs::Mortgage(MortgageInputs {
            principal: 100_000.0,
            annual_rate: 0.05,
            term_months: 120,
            escrow_monthly: 0.0,
            escrow_growth: RateSpec::zero(),
        });
        // Horizon extends past the loan term
        let series = module.compute(&timeline(180), &RateResolver::new()).unwrap();
        assert_eq!(series.len(), 180);
        assert_eq!(series.last_active_period(), Some(119));
        assert_eq!(series.net_at(150), 0.0);
    }

    #[test]
    fn test_mortgage_truncates_to_horizon() {
        let module = HousingInputs::Mortgage(MortgageInputs {
            principal: 300_000.0,
            annual_rate: 0.06,
            term_months: 360,
            escrow_monthly: 300.0,
            escrow_growth: RateSpec::zero(),
        });
        let series = module.compute(&timeline(60), &RateResolver::new()).unwrap();
        assert_eq!(series.len(), 60);
        assert_relative_eq!(series.rows()[59].part("escrow"), -300.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let negative_rent = HousingInputs::Rent(rent_inputs(-5.0));
        assert!(negative_rent.validate().is_err());

        let mut orphan_contribution = rent_inputs(2_000.0);
        orphan_contribution.roommate_contribution_pct = 0.5;
        assert!(HousingInputs::Rent(orphan_contribution).validate().is_err());

        let bad_mortgage = HousingInputs::Mortgage(MortgageInputs {
            principal: 300_000.0,
            annual_rate: 0.06,
            term_months: 0,
            escrow_monthly: 0.0,
            escrow_growth: RateSpec::zero(),
        });
        let err = bad_mortgage.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { module: "housing", .. }));
    }
}
