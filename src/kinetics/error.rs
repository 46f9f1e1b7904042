//! Kinetics Error Module
//!
//! Errors raised by the rate law evaluator and the coverage derivative
//! function. All of them indicate invalid physical input: a non-positive
//! temperature, an inadmissible parameter value, or a coverage state whose
//! vacant-site fraction is negative beyond the rounding tolerance.

use thiserror::Error;

use crate::error::ErrorClass;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KineticsError {
    #[error("Temperature must be > 0 K, got {0}")]
    NonPositiveTemperature(f64),
    #[error(
        "Unphysical coverages: theta_* = {theta_star:.3e}. \
         Check initial conditions, solver tolerances or the parameter set"
    )]
    UnphysicalCoverage { theta_star: f64 },
    #[error("Invalid value {value} for parameter {name}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },
    #[error("Unknown parameter {0}")]
    UnknownParameter(String),
}

impl KineticsError {
    pub fn class(&self) -> ErrorClass {
        match self {
            KineticsError::UnknownParameter(_) => ErrorClass::Configuration,
            _ => ErrorClass::InvalidPhysicalInput,
        }
    }
}
