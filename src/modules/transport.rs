//! Transportation cashflows: car ownership or transit
//!
//! The car variant combines recurring costs (fuel, insurance, maintenance),
//! each growing under its own spec, with an optional financing schedule that
//! reuses the shared amortization algorithm. Fuel is modeled from driving
//! habits: price per gallon x miles per month / miles per gallon.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::amortize::{amortize, LoanTerms};
use crate::error::EngineError;
use crate::rates::{RateResolver, RateSpec};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "transport";

/// Transportation inputs, one variant per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportInputs {
    Car(CarInputs),
    Transit(TransitInputs),
}

/// Car ownership scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarInputs {
    /// Average fuel price per gallon
    #[serde(default)]
    pub price_per_gallon: f64,

    /// Miles driven per month
    #[serde(default)]
    pub miles_per_month: f64,

    /// Fuel economy; must be >= 1 when any miles are driven
    #[serde(default = "default_mpg")]
    pub miles_per_gallon: f64,

    /// Monthly car insurance premium
    #[serde(default)]
    pub insurance_monthly: f64,

    /// Monthly maintenance reserve
    #[serde(default)]
    pub maintenance_monthly: f64,

    #[serde(default = "default_fuel_growth")]
    pub fuel_growth: RateSpec,

    #[serde(default = "default_insurance_growth")]
    pub insurance_growth: RateSpec,

    #[serde(default = "default_maintenance_growth")]
    pub maintenance_growth: RateSpec,

    /// Financing, if the car is loan-funded
    #[serde(default)]
    pub loan: Option<LoanTerms>,
}

fn default_mpg() -> f64 {
    25.0
}
fn default_fuel_growth() -> RateSpec {
    RateSpec::constant(0.04)
}
fn default_insurance_growth() -> RateSpec {
    RateSpec::constant(0.03)
}
fn default_maintenance_growth() -> RateSpec {
    RateSpec::constant(0.03)
}

/// Public transit scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitInputs {
    /// Monthly transit pass cost
    pub monthly_pass: f64,

    #[serde(default = "default_pass_growth")]
    pub pass_growth: RateSpec,
}

fn default_pass_growth() -> RateSpec {
    RateSpec::constant(0.025)
}

impl CarInputs {
    /// Fuel spend per month before growth
    fn base_fuel_cost(&self) -> f64 {
        if self.miles_per_month == 0.0 {
            0.0
        } else {
            self.price_per_gallon * self.miles_per_month / self.miles_per_gallon
        }
    }
}

impl CashflowModule for TransportInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        match self {
            TransportInputs::Car(car) => {
                if car.price_per_gallon < 0.0
                    || car.miles_per_month < 0.0
                    || car.insurance_monthly < 0.0
                    || car.maintenance_monthly < 0.0
                {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        "car cost fields must be non-negative",
                    ));
                }
                if car.miles_per_month > 0.0 && car.miles_per_gallon < 1.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        format!("miles per gallon must be >= 1, got {}", car.miles_per_gallon),
                    ));
                }
                if let Some(loan) = &car.loan {
                    loan.validate(DOMAIN)?;
                }
                Ok(())
            }
            TransportInputs::Transit(transit) => {
                if !transit.monthly_pass.is_finite() || transit.monthly_pass <= 0.0 {
                    return Err(EngineError::invalid_input(
                        DOMAIN,
                        format!("monthly pass must be positive, got {}", transit.monthly_pass),
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
            TransportInputs::Car(car) => compute_car(car, timeline, rates),
            TransportInputs::Transit(transit) => compute_transit(transit, timeline, rates),
        }
    }
}

fn compute_car(
    inputs: &CarInputs,
    timeline: &Timeline,
    rates: &RateResolver,
) -> Result<CashflowSeries, EngineError> {
    let fuel_factors = rates.resolve(&inputs.fuel_growth, timeline)?.growth_factors();
    let insurance_factors = rates
        .resolve(&inputs.insurance_growth, timeline)?
        .growth_factors();
    let maintenance_factors = rates
        .resolve(&inputs.maintenance_growth, timeline)?
        .growth_factors();

    let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
    let base_fuel = inputs.base_fuel_cost();
    for (i, row) in series.rows_mut().iter_mut().enumerate() {
        if base_fuel > 0.0 {
            row.add_part("fuel", -base_fuel * fuel_factors[i]);
        }
        if inputs.insurance_monthly > 0.0 {
            row.add_part("insurance", -inputs.insurance_monthly * insurance_factors[i]);
        }
        if inputs.maintenance_monthly > 0.0 {
            row.add_part("maintenance", -inputs.maintenance_monthly * maintenance_factors[i]);
        }
    }

    if let Some(loan) = &inputs.loan {
        let schedule = amortize(loan, DOMAIN)?;
        let horizon = series.len();
        for entry in schedule.entries() {
            if entry.period as usize >= horizon {
                break;
            }
            let row = &mut series.rows_mut()[entry.period as usize];
            row.add_part("loan_interest", -entry.interest);
            row.add_part("loan_principal", -entry.principal);
        }
    }
    Ok(series)
}

fn compute_transit(
    inputs: &TransitInputs,
    timeline: &Timeline,
    rates: &RateResolver,
) -> Result<CashflowSeries, EngineError> {
    let factors = rates.resolve(&inputs.pass_growth, timeline)?.growth_factors();
    let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
    for (i, row) in series.rows_mut().iter_mut().enumerate() {
        row.add_part("pass", -inputs.monthly_pass * factors[i]);
    }
    Ok(series)
}
