//! Pre-flight scenario validation
//!
//! Structural checks that gate calls into the engine: every simulation run
//! starts here, so bad inputs fail before any series is computed. Field-level
//! sanity checks are delegated to each module; cross-series alignment is
//! re-checked later by the aggregator, which does not trust its callers.

use crate::engine::Scenario;
use crate::error::EngineError;

/// Hard cap on horizon length: a century of months. Keeps a typo'd duration
/// from allocating an absurd grid.
pub const MAX_HORIZON_MONTHS: u32 = 1200;

/// Validate a scenario before running it
pub fn validate_scenario(scenario: &Scenario) -> Result<(), EngineError> {
    if scenario.months == 0 {
        return Err(EngineError::InvalidRange(
            "horizon must cover at least one month".to_string(),
        ));
    }
    if scenario.months > MAX_HORIZON_MONTHS {
        return Err(EngineError::InvalidRange(format!(
            "horizon of {} months exceeds the {}-month cap",
            scenario.months, MAX_HORIZON_MONTHS
        )));
    }
    if !scenario.annual_discount_rate.is_finite() || scenario.annual_discount_rate <= -1.0 {
        return Err(EngineError::invalid_input(
            "scenario",
            format!(
                "discount rate {} does not yield a positive multiplier",
                scenario.annual_discount_rate
            ),
        ));
    }

    let mut domains: Vec<&str> = Vec::with_capacity(scenario.modules.len());
    for module in &scenario.modules {
        if domains.contains(&module.domain()) {
            return Err(EngineError::invalid_input(
                "scenario",
                format!("duplicate module for domain '{}'", module.domain()),
            ));
        }
        domains.push(module.domain());
        module.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{HousingInputs, RentInputs};
    use crate::rates::RateSpec;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn rent_module(rent: f64) -> HousingInputs {
        HousingInputs::Rent(RentInputs {
            base_monthly_rent: rent,
            roommates: 0,
            roommate_contribution_pct: 0.0,
            renters_insurance_monthly: 0.0,
            utilities_monthly: 0.0,
            rent_growth: RateSpec::zero(),
            insurance_growth: RateSpec::zero(),
            utilities_growth: RateSpec::zero(),
        })
    }

    #[test]
    fn test_valid_scenario_passes() {
        let scenario = Scenario::new("ok", start(), 120).with_module(rent_module(2_000.0));
        assert!(validate_scenario(&scenario).is_ok());
    }

    #[test]
    fn test_horizon_bounds_enforced() {
        let zero = Scenario::new("zero", start(), 0);
        assert!(matches!(
            validate_scenario(&zero).unwrap_err(),
            EngineError::InvalidRange(_)
        ));

        let huge = Scenario::new("huge", start(), MAX_HORIZON_MONTHS + 1);
        assert!(matches!(
            validate_scenario(&huge).unwrap_err(),
            EngineError::InvalidRange(_)
        ));
    }

    #[test]
    fn test_module_preconditions_checked() {
        let scenario = Scenario::new("bad", start(), 12).with_module(rent_module(-1.0));
        assert!(matches!(
            validate_scenario(&scenario).unwrap_err(),
            EngineError::InvalidInput { module: "housing", .. }
        ));
    }

    #[test]
    fn test_duplicate_domain_rejected() {
        let scenario = Scenario::new("dup", start(), 12)
            .with_module(rent_module(1_000.0))
            .with_module(rent_module(2_000.0));
        assert!(matches!(
            validate_scenario(&scenario).unwrap_err(),
            EngineError::InvalidInput { module: "scenario", .. }
        ));
    }

    #[test]
    fn test_bad_discount_rate_rejected() {
        let scenario = Scenario::new("disc", start(), 12).with_discount_rate(-1.5);
        assert!(validate_scenario(&scenario).is_err());
    }
}
