//! Error classification shared by the module-level error enums.
//!
//! Every error raised by the crate belongs to one of a few classes. Sweep
//! drivers use the class to decide whether a failed sample should be recorded
//! as missing or abort the whole run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of the errors raised by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Non-positive temperature, invalid parameter values or an unphysical coverage state.
    InvalidPhysicalInput,
    /// The ODE integrator failed within its internal limits.
    SolverDivergence,
    /// Too few usable samples, or a non-positive TOF where a logarithm is needed.
    InsufficientData,
    /// Malformed setup, sweep definition or file.
    Configuration,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::InvalidPhysicalInput => "invalid physical input",
            ErrorClass::SolverDivergence => "solver divergence",
            ErrorClass::InsufficientData => "insufficient data",
            ErrorClass::Configuration => "configuration",
        };
        write!(f, "{name}")
    }
}
