//! One-shot simulation runs
//!
//! A run is a pure batch computation: validate the scenario, build the
//! timeline, compute every domain module in parallel, and aggregate into the
//! unified ledger. All state is request-scoped; nothing survives the run but
//! the returned result. Identical inputs produce bit-identical output.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::ledger::{aggregate, UnifiedLedger};
use crate::modules::{
    CashflowModule, HousingInputs, InsuranceInputs, LivingExpenseInputs, StudentLoanInputs,
    TaxInputs, TransportInputs,
};
use crate::rates::{ExternalSeries, RateResolver};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;
use crate::validate;

/// A fully assembled scenario: horizon plus the set of active modules.
///
/// The engine accepts any `CashflowModule`, so new financial domains plug in
/// without touching the aggregation logic.
pub struct Scenario {
    pub name: String,
    /// First month of the horizon
    pub start: NaiveDate,
    /// Horizon length in months
    pub months: u32,
    /// Effective annual discount rate for NPV reporting
    pub annual_discount_rate: f64,
    pub modules: Vec<Box<dyn CashflowModule>>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, start: NaiveDate, months: u32) -> Self {
        Self {
            name: name.into(),
            start,
            months,
            annual_discount_rate: default_discount_rate(),
            modules: Vec::new(),
        }
    }

    /// Builder-style module registration
    pub fn with_module(mut self, module: impl CashflowModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn with_discount_rate(mut self, annual: f64) -> Self {
        self.annual_discount_rate = annual;
        self
    }
}

/// Everything a run produces: the timeline it ran over, each domain's series,
/// and the merged ledger. Discarded state beyond this is gone with the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub timeline: Timeline,
    pub series: Vec<CashflowSeries>,
    pub ledger: UnifiedLedger,
}

impl SimulationResult {
    /// Series produced by a named domain, if that module was active
    pub fn series_for(&self, domain: &str) -> Option<&CashflowSeries> {
        self.series.iter().find(|s| s.domain() == domain)
    }
}

/// Run one simulation: validate, build the timeline, fan the modules out
/// across threads, and join at the aggregator. Module ordering is
/// irrelevant; the aggregator merges by period key and the series are
/// sorted by domain for a canonical result.
pub fn run(scenario: &Scenario, rates: &RateResolver) -> Result<SimulationResult, EngineError> {
    validate::validate_scenario(scenario)?;
    let timeline = Timeline::with_months(scenario.start, scenario.months)?;

    log::info!(
        "running scenario '{}': {} periods, {} modules",
        scenario.name,
        timeline.len(),
        scenario.modules.len()
    );

    let mut series: Vec<CashflowSeries> = scenario
        .modules
        .par_iter()
        .map(|module| module.compute(&timeline, rates))
        .collect::<Result<_, _>>()?;
    series.sort_by(|a, b| a.domain().cmp(b.domain()));

    let ledger = aggregate(&timeline, &series)?;
    log::debug!(
        "scenario '{}' cumulative net at horizon end: {:.2}",
        scenario.name,
        ledger.rows().last().map(|r| r.cumulative_net).unwrap_or(0.0)
    );

    Ok(SimulationResult {
        timeline,
        series,
        ledger,
    })
}

/// Serializable scenario description for external callers (config loaders,
/// the `run_scenario` binary). A closed set of module slots here; the engine
/// itself is open to any `CashflowModule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub start: NaiveDate,
    pub months: u32,

    #[serde(default = "default_discount_rate")]
    pub annual_discount_rate: f64,

    #[serde(default)]
    pub housing: Option<HousingInputs>,
    #[serde(default)]
    pub transport: Option<TransportInputs>,
    #[serde(default)]
    pub debt: Option<StudentLoanInputs>,
    #[serde(default)]
    pub insurance: Option<InsuranceInputs>,
    #[serde(default)]
    pub taxes: Option<TaxInputs>,
    #[serde(default)]
    pub living: Option<LivingExpenseInputs>,

    /// Pre-fetched external rate series keyed by source name
    #[serde(default)]
    pub external_rates: HashMap<String, ExternalSeries>,
}

fn default_discount_rate() -> f64 {
    0.025
}

impl ScenarioSpec {
    /// Assemble the runnable scenario and the resolver holding its external
    /// series
    pub fn into_scenario(self) -> (Scenario, RateResolver) {
        let mut resolver = RateResolver::new();
        for (source, series) in self.external_rates {
            resolver.register(source, series);
        }

        let mut scenario = Scenario::new(self.name, self.start, self.months)
            .with_discount_rate(self.annual_discount_rate);
        if let Some(housing) = self.housing {
            scenario = scenario.with_module(housing);
        }
        if let Some(transport) = self.transport {
            scenario = scenario.with_module(transport);
        }
        if let Some(debt) = self.debt {
            scenario = scenario.with_module(debt);
        }
        if let Some(insurance) = self.insurance {
            scenario = scenario.with_module(insurance);
        }
        if let Some(taxes) = self.taxes {
            scenario = scenario.with_module(taxes);
        }
        if let Some(living) = self.living {
            scenario = scenario.with_module(living);
        }
        (scenario, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{break_even, BreakEven};
    use crate::modules::{ExpenseCategory, MortgageInputs, RentInputs, TransitInputs};
    use crate::rates::RateSpec;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn rent_scenario(rent: f64, months: u32) -> Scenario {
        Scenario::new("rent", date(2025, 1), months).with_module(HousingInputs::Rent(RentInputs {
            base_monthly_rent: rent,
            roommates: 0,
            roommate_contribution_pct: 0.0,
            renters_insurance_monthly: 0.0,
            utilities_monthly: 0.0,
            rent_growth: RateSpec::constant(0.05),
            insurance_growth: RateSpec::zero(),
            utilities_growth: RateSpec::zero(),
        }))
    }

    #[test]
    fn test_run_is_idempotent() {
        let scenario = rent_scenario(2_000.0, 24)
            .with_module(TransportInputs::Transit(TransitInputs {
                monthly_pass: 120.0,
                pass_growth: RateSpec::constant(0.025),
            }))
            .with_module(LivingExpenseInputs {
                categories: vec![ExpenseCategory::new("groceries", 500.0)],
            });
        let resolver = RateResolver::new();

        let first = run(&scenario, &resolver).unwrap();
        let second = run(&scenario, &resolver).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ledger_net_matches_module_sum() {
        let scenario = rent_scenario(2_000.0, 12).with_module(TransportInputs::Transit(
            TransitInputs {
                monthly_pass: 120.0,
                pass_growth: RateSpec::zero(),
            },
        ));
        let result = run(&scenario, &RateResolver::new()).unwrap();

        for row in result.ledger.rows() {
            let module_sum: f64 = result.series.iter().map(|s| s.net_at(row.period)).sum();
            assert_relative_eq!(row.net, module_sum, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_thirty_year_mortgage_scenario() {
        let scenario = Scenario::new("buy", date(2025, 1), 360).with_module(
            HousingInputs::Mortgage(MortgageInputs {
                principal: 300_000.0,
                annual_rate: 0.06,
                term_months: 360,
                escrow_monthly: 0.0,
                escrow_growth: RateSpec::zero(),
            }),
        );
        let result = run(&scenario, &RateResolver::new()).unwrap();

        let housing = result.series_for("housing").unwrap();
        assert_eq!(housing.last_active_period(), Some(359));
        // Every active period pays the same constant amount
        let payment = -housing.net_at(0);
        assert_relative_eq!(payment, 1798.65, max_relative = 1e-5);
        assert_relative_eq!(-housing.net_at(200), payment, max_relative = 1e-9);
        // Final period absorbs accumulated rounding drift
        assert_relative_eq!(-housing.net_at(359), payment, max_relative = 1e-6);
    }

    #[test]
    fn test_rent_vs_buy_break_even() {
        // Cheap rent grows fast; the mortgage payment is fixed
        let rent = Scenario::new("rent", date(2025, 1), 240).with_module(HousingInputs::Rent(
            RentInputs {
                base_monthly_rent: 1_500.0,
                roommates: 0,
                roommate_contribution_pct: 0.0,
                renters_insurance_monthly: 0.0,
                utilities_monthly: 0.0,
                rent_growth: RateSpec::constant(0.08),
                insurance_growth: RateSpec::zero(),
                utilities_growth: RateSpec::zero(),
            },
        ));
        let buy = Scenario::new("buy", date(2025, 1), 240).with_module(HousingInputs::Mortgage(
            MortgageInputs {
                principal: 300_000.0,
                annual_rate: 0.06,
                term_months: 360,
                escrow_monthly: 0.0,
                escrow_growth: RateSpec::zero(),
            },
        ));

        let resolver = RateResolver::new();
        let rent_result = run(&rent, &resolver).unwrap();
        let buy_result = run(&buy, &resolver).unwrap();

        // Buying starts costlier and eventually breaks even against rent
        match break_even(&buy_result.ledger, &rent_result.ledger).unwrap() {
            BreakEven::At(k) => assert!(k > 0 && k < 240),
            BreakEven::NotWithinHorizon => panic!("expected a break-even inside the horizon"),
        }
    }

    #[test]
    fn test_failed_module_fails_the_run() {
        let scenario = rent_scenario(-100.0, 12);
        let err = run(&scenario, &RateResolver::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { module: "housing", .. }));
    }

    #[test]
    fn test_custom_module_plugs_in() {
        // A domain the crate doesn't ship: pet costs
        struct PetCosts;
        impl CashflowModule for PetCosts {
            fn domain(&self) -> &'static str {
                "pets"
            }
            fn validate(&self) -> Result<(), EngineError> {
                Ok(())
            }
            fn compute(
                &self,
                timeline: &Timeline,
                _rates: &RateResolver,
            ) -> Result<CashflowSeries, EngineError> {
                let mut series = CashflowSeries::zeroed("pets", timeline);
                for row in series.rows_mut() {
                    row.add_part("food", -80.0);
                }
                Ok(series)
            }
        }

        let scenario = Scenario::new("with-pets", date(2025, 1), 6).with_module(PetCosts);
        let result = run(&scenario, &RateResolver::new()).unwrap();
        assert_eq!(result.ledger.rows()[0].by_domain["pets"], -80.0);
    }

    #[test]
    fn test_scenario_json_round_trip() {
        let json = r#"{
            "name": "grad-life",
            "start": "2025-09-01",
            "months": 60,
            "housing": {
                "kind": "rent",
                "base_monthly_rent": 1800.0,
                "roommates": 1,
                "roommate_contribution_pct": 0.5
            },
            "debt": {
                "principal": 30000.0,
                "annual_rate": 0.055,
                "term_months": 120,
                "extra_payment": 150.0
            },
            "external_rates": {
                "cpi": { "by_period": { "0": 0.03 } }
            }
        }"#;
        let spec: ScenarioSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.months, 60);

        let (scenario, resolver) = spec.into_scenario();
        assert_eq!(scenario.modules.len(), 2);
        let result = run(&scenario, &resolver).unwrap();
        assert_eq!(result.ledger.len(), 60);
        assert!(result.series_for("debt").is_some());
    }
}
