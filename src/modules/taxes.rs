//! Income tax cashflows
//!
//! Periodic liability computed from gross income (growing under its own
//! spec) against a progressive bracket table: marginal rates applied per
//! bracket, never a flat rate on the total. Bundled single/married tables
//! are selected by filing status; a caller-supplied table overrides them.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::error::EngineError;
use crate::rates::{RateResolver, RateSpec};
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "taxes";

/// Federal filing status selecting the bundled bracket table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
}

/// One marginal bracket: `rate` applies to income up to `up_to`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Upper bound of the bracket; `None` marks the unbounded top bracket
    pub up_to: Option<f64>,
    /// Marginal rate within the bracket
    pub rate: f64,
}

/// Ascending progressive bracket table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTable {
    pub brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Bundled single-filer table (2024 federal brackets)
    pub fn single() -> Self {
        Self {
            brackets: vec![
                Bracket { up_to: Some(11_600.0), rate: 0.10 },
                Bracket { up_to: Some(47_150.0), rate: 0.12 },
                Bracket { up_to: Some(100_525.0), rate: 0.22 },
                Bracket { up_to: Some(191_950.0), rate: 0.24 },
                Bracket { up_to: Some(243_725.0), rate: 0.32 },
                Bracket { up_to: Some(609_350.0), rate: 0.35 },
                Bracket { up_to: None, rate: 0.37 },
            ],
        }
    }

    /// Bundled married-filing-jointly table (2024 federal brackets)
    pub fn married() -> Self {
        Self {
            brackets: vec![
                Bracket { up_to: Some(23_200.0), rate: 0.10 },
                Bracket { up_to: Some(94_300.0), rate: 0.12 },
                Bracket { up_to: Some(201_050.0), rate: 0.22 },
                Bracket { up_to: Some(383_900.0), rate: 0.24 },
                Bracket { up_to: Some(487_450.0), rate: 0.32 },
                Bracket { up_to: Some(731_200.0), rate: 0.35 },
                Bracket { up_to: None, rate: 0.37 },
            ],
        }
    }

    /// Bundled table for a filing status
    pub fn for_status(status: FilingStatus) -> Self {
        match status {
            FilingStatus::Single => Self::single(),
            FilingStatus::Married => Self::married(),
        }
    }

    /// Annual tax on `income`, marginal rates applied per bracket
    pub fn tax_on(&self, income: f64) -> f64 {
        let mut tax = 0.0;
        let mut lower = 0.0;
        for bracket in &self.brackets {
            let upper = bracket.up_to.unwrap_or(f64::INFINITY);
            let taxable = income.min(upper) - lower;
            if taxable <= 0.0 {
                break;
            }
            tax += taxable * bracket.rate;
            lower = upper;
        }
        tax
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.brackets.is_empty() {
            return Err(EngineError::invalid_input(DOMAIN, "bracket table is empty"));
        }
        let mut lower = 0.0;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(EngineError::invalid_input(
                    DOMAIN,
                    format!("bracket rate must be within [0, 1], got {}", bracket.rate),
                ));
            }
            match bracket.up_to {
                Some(upper) => {
                    if upper <= lower {
                        return Err(EngineError::invalid_input(
                            DOMAIN,
                            format!("bracket bounds must be strictly ascending at index {}", i),
                        ));
                    }
                    lower = upper;
                }
                None => {
                    if i != self.brackets.len() - 1 {
                        return Err(EngineError::invalid_input(
                            DOMAIN,
                            "only the final bracket may be unbounded",
                        ));
                    }
                }
            }
        }
        if self.brackets.last().map(|b| b.up_to.is_some()).unwrap_or(true) {
            return Err(EngineError::invalid_input(
                DOMAIN,
                "the final bracket must be unbounded",
            ));
        }
        Ok(())
    }
}

/// Income tax inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInputs {
    /// Gross annual income at period 0
    pub annual_gross_income: f64,

    #[serde(default = "default_income_growth")]
    pub income_growth: RateSpec,

    #[serde(default)]
    pub filing_status: FilingStatus,

    /// Custom bracket table; defaults to the bundled table for the status
    #[serde(default)]
    pub brackets: Option<BracketTable>,
}

fn default_income_growth() -> RateSpec {
    RateSpec::constant(0.03)
}

impl TaxInputs {
    fn bracket_table(&self) -> BracketTable {
        self.brackets
            .clone()
            .unwrap_or_else(|| BracketTable::for_status(self.filing_status))
    }
}

impl CashflowModule for TaxInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !self.annual_gross_income.is_finite() || self.annual_gross_income < 0.0 {
            return Err(EngineError::invalid_input(
                DOMAIN,
                format!("gross income must be non-negative, got {}", self.annual_gross_income),
            ));
        }
        self.bracket_table().validate()
    }

    fn compute(
        &self,
        timeline: &Timeline,
        rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError> {
        self.validate()?;
        let table = self.bracket_table();
        let factors = rates.resolve(&self.income_growth, timeline)?.growth_factors();

        let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
        for (i, row) in series.rows_mut().iter_mut().enumerate() {
            // Annualized income at this period, taxed and spread monthly
            let income = self.annual_gross_income * factors[i];
            row.add_part("income_tax", -table.tax_on(income) / 12.0);
        }
        Ok(series)
    }
}
