//! Living expense cashflows
//!
//! Aggregate of categorized recurring costs (groceries, subscriptions,
//! dining out), each category growing independently under its own spec.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::error::EngineError;
use crate::rates::{RateResolver, RateSpec};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "living";

/// One recurring expense bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    /// Category name, used as the sub-amount key in the ledger
    pub name: String,

    /// Monthly amount at period 0
    pub monthly_amount: f64,

    #[serde(default = "default_category_growth")]
    pub growth: RateSpec,
}

fn default_category_growth() -> RateSpec {
    RateSpec::constant(0.025)
}

impl ExpenseCategory {
    pub fn new(name: impl Into<String>, monthly_amount: f64) -> Self {
        Self {
            name: name.into(),
            monthly_amount,
            growth: default_category_growth(),
        }
    }
}

/// Living expense inputs: one or more categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivingExpenseInputs {
    pub categories: Vec<ExpenseCategory>,
}

impl CashflowModule for LivingExpenseInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.categories.is_empty() {
            return Err(EngineError::invalid_input(
                DOMAIN,
                "at least one expense category is required",
            ));
        }
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(EngineError::invalid_input(DOMAIN, "category name is empty"));
            }
            if !category.monthly_amount.is_finite() || category.monthly_amount < 0.0 {
                return Err(EngineError::invalid_input(
                    DOMAIN,
                    format!(
                        "category '{}' amount must be non-negative, got {}",
                        category.name, category.monthly_amount
                    ),
                ));
            }
        }
        Ok(())
    }

    fn compute(
        &self,
        timeline: &Timeline,
        rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError> {
        self.validate()?;
        let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
        for category in &self.categories {
            let factors = rates.resolve(&category.growth, timeline)?.growth_factors();
            for (i, row) in series.rows_mut().iter_mut().enumerate() {
                row.add_part(&category.name, -category.monthly_amount * factors[i]);
            }
        }
        Ok(series)
    }
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

    #[test]
    fn test_categories_grow_independently() {
        let module = LivingExpenseInputs {
            categories: vec![
                ExpenseCategory {
                    name: "groceries".to_string(),
                    monthly_amount: 500.0,
                    growth: RateSpec::constant(0.04),
                },
                ExpenseCategory {
                    name: "subscriptions".to_string(),
                    monthly_amount: 60.0,
                    growth: RateSpec::zero(),
                },
            ],
        };
        let series = module.compute(&timeline(13), &RateResolver::new()).unwrap();

        assert_relative_eq!(series.rows()[12].part("groceries"), -520.0, max_relative = 1e-9);
        assert_relative_eq!(series.rows()[12].part("subscriptions"), -60.0, max_relative = 1e-12);
        assert_relative_eq!(series.net_at(0), -560.0, max_relative = 1e-12);
    }

    #[test]
    fn test_duplicate_category_names_accumulate() {
        let module = LivingExpenseInputs {
            categories: vec![
                ExpenseCategory::new("dining", 100.0),
                ExpenseCategory::new("dining", 50.0),
            ],
        };
        let series = module.compute(&timeline(1), &RateResolver::new()).unwrap();
        assert_relative_eq!(series.rows()[0].part("dining"), -150.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let empty = LivingExpenseInputs { categories: vec![] };
        assert!(empty.validate().is_err());

        let negative = LivingExpenseInputs {
            categories: vec![ExpenseCategory::new("misc", -10.0)],
        };
        let err = negative.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { module: "living", .. }));
    }
}
