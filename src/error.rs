//! Error types raised by the projection engine
//!
//! Every error is raised eagerly at the boundary of the component responsible
//! for it and propagates to the caller of the simulation run. A failed run
//! yields no ledger; there is no partial-result path and no silent defaulting.

use thiserror::Error;

/// Errors produced by the simulation engine and its components
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Timeline bounds are unusable (end precedes start, zero-length horizon)
    #[error("invalid timeline range: {0}")]
    InvalidRange(String),

    /// A domain module's inputs are missing or violate its preconditions
    #[error("invalid input for {module}: {reason}")]
    InvalidInput {
        module: &'static str,
        reason: String,
    },

    /// An externally sourced rate series does not cover the timeline
    #[error("missing rate data for '{source_name}': {reason}")]
    MissingRateData { source_name: String, reason: String },

    /// A cashflow series refers to periods outside the timeline domain
    #[error("misaligned series for {domain}: {reason}")]
    MisalignedSeries { domain: String, reason: String },
}

impl EngineError {
    /// Shorthand for module precondition failures
    pub fn invalid_input(module: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            module,
            reason: reason.into(),
        }
    }
}
