use thiserror::Error;

use crate::{
    error::ErrorClass, kinetics::error::KineticsError, simulation::error::SimulationError,
};

/// Errors raised by the Arrhenius, degree-of-rate-control and attribution
/// analyses.
#[derive(Error, Debug)]
pub enum SensitivityError {
    #[error("Failed to compute steady state: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Kinetic evaluation failed: {0}")]
    Kinetics(#[from] KineticsError),
    #[error("Insufficient data: {required} strictly positive TOF samples required, found {found}")]
    InsufficientData { required: usize, found: usize },
    #[error("{context} TOF must be > 0 for log(), got {tof}")]
    NonPositiveTof { context: String, tof: f64 },
    #[error("Temperatures and TOFs differ in length: {temperatures} vs {tofs}")]
    LengthMismatch { temperatures: usize, tofs: usize },
    #[error("Invalid energy perturbation: {0} eV")]
    InvalidPerturbation(f64),
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),
}

impl SensitivityError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SensitivityError::Simulation(err) => err.class(),
            SensitivityError::Kinetics(err) => err.class(),
            SensitivityError::InsufficientData { .. } | SensitivityError::NonPositiveTof { .. } => {
                ErrorClass::InsufficientData
            }
            SensitivityError::LengthMismatch { .. }
            | SensitivityError::InvalidPerturbation(_)
            | SensitivityError::InvalidSweep(_) => ErrorClass::Configuration,
        }
    }
}
