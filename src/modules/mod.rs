//! Domain cashflow modules
//!
//! Each module independently computes a per-period cashflow series for its
//! domain over the shared timeline, using the shared rate resolver. Modules
//! have no data dependency on one another, so the engine computes them in
//! parallel; the aggregator merges by period key and depends only on the
//! `CashflowModule` contract, never on concrete module types. New domains
//! plug in by implementing the trait.

mod debt;
mod housing;
mod insurance;
mod living;
mod taxes;
mod transport;

pub use debt::StudentLoanInputs;
pub use housing::{HousingInputs, MortgageInputs, RentInputs};
pub use insurance::{InsuranceInputs, PlanTier};
pub use living::{ExpenseCategory, LivingExpenseInputs};
pub use taxes::{Bracket, BracketTable, FilingStatus, TaxInputs};
pub use transport::{CarInputs, TransitInputs, TransportInputs};

use crate::error::EngineError;
use crate::rates::RateResolver;
use crate::series::CashflowSeries;
use crate::timeline::Timeline;

/// Capability contract every domain module implements.
///
/// `compute` must be deterministic given the same inputs: no randomness, no
/// time-of-day dependency, no I/O. `Send + Sync` so independent modules can
/// fan out across threads.
pub trait CashflowModule: Send + Sync {
    /// Stable domain key used in the unified ledger (e.g. "housing")
    fn domain(&self) -> &'static str;

    /// Field-level precondition checks, run by the validator before a
    /// simulation starts. `compute` re-checks them; validation here lets bad
    /// inputs fail before any work is done.
    fn validate(&self) -> Result<(), EngineError>;

    /// Compute this domain's cashflow series over the timeline
    fn compute(
        &self,
        timeline: &Timeline,
        rates: &RateResolver,
    ) -> Result<CashflowSeries, EngineError>;
}
