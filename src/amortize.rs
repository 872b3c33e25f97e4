//! Fixed-payment loan amortization
//!
//! One algorithm shared by the mortgage, car loan, and student loan paths so
//! the financial math and its rounding behavior stay identical across
//! domains. Loans use the standard amortization convention: the rate is a
//! nominal annual rate and the periodic rate is nominal / 12 (growth specs
//! use effective-annual compounding instead, see `rates`).

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Parameters of one amortized loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Outstanding principal at period 0
    pub principal: f64,
    /// Nominal annual rate; periodic rate is `annual_rate / 12`
    pub annual_rate: f64,
    /// Scheduled term in months
    pub term_months: u32,
    /// Extra principal paid every period on top of the scheduled payment
    #[serde(default)]
    pub extra_payment: f64,
}

impl LoanTerms {
    /// Scheduled loan with no extra payments
    pub fn new(principal: f64, annual_rate: f64, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
            extra_payment: 0.0,
        }
    }

    /// Field-level preconditions; `module` attributes the error to the
    /// domain module that owns the loan
    pub fn validate(&self, module: &'static str) -> Result<(), EngineError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(EngineError::invalid_input(
                module,
                format!("loan principal must be positive, got {}", self.principal),
            ));
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(EngineError::invalid_input(
                module,
                format!("loan rate must be non-negative, got {}", self.annual_rate),
            ));
        }
        if self.term_months == 0 {
            return Err(EngineError::invalid_input(module, "loan term must be at least one month"));
        }
        if !self.extra_payment.is_finite() || self.extra_payment < 0.0 {
            return Err(EngineError::invalid_input(
                module,
                format!("extra payment must be non-negative, got {}", self.extra_payment),
            ));
        }
        Ok(())
    }
}

/// One period of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmortizationEntry {
    pub period: u32,
    /// Interest portion: unpaid balance times the periodic rate
    pub interest: f64,
    /// Principal portion, including any extra payment
    pub principal: f64,
    /// Balance remaining after this period's payment
    pub balance: f64,
}

/// Full payment schedule for a loan
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    payment: f64,
    entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    /// Constant scheduled payment (excluding extra payments)
    pub fn payment(&self) -> f64 {
        self.payment
    }

    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Period at which the balance first reaches zero
    pub fn payoff_period(&self) -> u32 {
        self.entries.last().map(|e| e.period).unwrap_or(0)
    }

    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest).sum()
    }
}

/// Build the amortization schedule for a loan.
///
/// The fixed payment follows the standard annuity formula. Each period splits
/// into interest (balance x periodic rate) and principal (payment - interest,
/// plus any extra payment). The final period's principal portion is set to
/// the remaining balance exactly, zeroing out floating-point drift, so the
/// principal portions always sum to the original principal. With an extra
/// payment the schedule ends at the first period the balance reaches zero,
/// ahead of the scheduled term.
pub fn amortize(terms: &LoanTerms, module: &'static str) -> Result<AmortizationSchedule, EngineError> {
    terms.validate(module)?;

    let rate = terms.annual_rate / 12.0;
    let n = terms.term_months;
    let payment = if rate == 0.0 {
        terms.principal / n as f64
    } else {
        terms.principal * rate / (1.0 - (1.0 + rate).powi(-(n as i32)))
    };

    let mut entries = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;
    for period in 0..n {
        let interest = balance * rate;
        let mut principal = payment - interest + terms.extra_payment;

        // Final period: pay the balance off exactly
        if principal >= balance || period == n - 1 {
            principal = balance;
        }

        balance -= principal;
        entries.push(AmortizationEntry {
            period,
            interest,
            principal,
            balance,
        });

        if balance <= 0.0 {
            break;
        }
    }

    Ok(AmortizationSchedule { payment, entries })
}
