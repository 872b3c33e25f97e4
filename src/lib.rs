//! Deterministic month-by-month personal finance projection engine
//!
//! Composes independent domain cashflow models (housing, transport, debt,
//! insurance, taxes, living expenses) over a shared monthly timeline into one
//! unified ledger, then derives decision metrics: break-even dates, total
//! cost of ownership, burn rate. Scenario-driven and fully deterministic
//! given fixed assumptions; no probabilistic forecasting.
//!
//! Pipeline: inputs -> validation -> timeline + rate resolution -> per-domain
//! cashflow series (computed in parallel) -> aggregation -> KPIs, with an
//! optional presentation-time inflation deflator. I/O (rate fetches,
//! persistence, export) happens strictly outside the engine.

pub mod amortize;
pub mod deflate;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod modules;
pub mod rates;
pub mod series;
pub mod timeline;
pub mod validate;

pub use engine::{run, Scenario, ScenarioSpec, SimulationResult};
pub use error::EngineError;
pub use ledger::{
    aggregate, break_even, burn_rate, net_present_value, total_cost_of_ownership, BreakEven,
    LedgerRow, UnifiedLedger,
};
pub use modules::CashflowModule;
pub use rates::{ExternalSeries, RateResolver, RateSpec, ResolvedRateSeries};
pub use series::{CashflowSeries, SeriesRow};
pub use timeline::{Period, Timeline};
