//! Student loan cashflows
//!
//! Identical amortization algorithm to the mortgage path, parameterized
//! separately. Aggressive payoff adds a fixed extra payment each period,
//! retiring principal ahead of schedule; the last period is the first one
//! where the balance reaches zero.

use serde::{Deserialize, Serialize};

use super::CashflowModule;
use crate::amortize::{amortize, LoanTerms};
use crate::error::EngineError;
use crate::rates::RateResolver;
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

const DOMAIN: &str = "debt";

/// Student loan inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentLoanInputs {
    /// Outstanding principal at period 0
    pub principal: f64,

    /// Nominal annual rate
    pub annual_rate: f64,

    /// Remaining scheduled term in months
    pub term_months: u32,

    /// Aggressive payoff: extra principal paid every period
    #[serde(default)]
    pub extra_payment: f64,
}

impl StudentLoanInputs {
    fn loan_terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate: self.annual_rate,
            term_months: self.term_months,
            extra_payment: self.extra_payment,
        }
    }

    /// Period at which the balance reaches zero under these terms
    pub fn payoff_period(&self) -> Result<u32, EngineError> {
        Ok(amortize(&self.loan_terms(), DOMAIN)?.payoff_period())
    }
}

impl CashflowModule for StudentLoanInputs {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn validate(&self) -> Result<(), EngineError> {
        self.loan_terms().validate(DOMAIN)
    }

    fn compute(
        &self,
        timeline: &Timeline,
        _rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError> {
        let schedule = amortize(&self.loan_terms(), DOMAIN)?;

        let mut series = CashflowSeries::zeroed(DOMAIN, timeline);
        let horizon = series.len();
        for entry in schedule.entries() {
            if entry.period as usize >= horizon {
                break;
            }
            let row = &mut series.rows_mut()[entry.period as usize];
            row.add_part("interest", -entry.interest);
            row.add_part("principal", -entry.principal);
        }
        Ok(series)
    }
}
