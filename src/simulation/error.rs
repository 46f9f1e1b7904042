//! Simulation Error Module
//!
//! Errors raised while integrating the coverage ODE system towards a steady
//! state.
//!
//! # Key Error Types
//!
//! The [`SimulationError`] enum covers:
//! - Kinetic errors raised by the right-hand side (invalid parameters, unphysical states)
//! - Solver divergence (non-finite states, exhausted step budget, integrator failures)
//! - Invalid integration horizons and setups
//!
//! None of these are retried. The only automatic recovery in the integrator is
//! the single horizon extension for slowly converging systems.

use thiserror::Error;

use crate::{error::ErrorClass, kinetics::error::KineticsError};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Kinetic evaluation failed: {0}")]
    Kinetics(#[from] KineticsError),
    #[error("ODE solver failed: {0}")]
    SolverDivergence(String),
    #[error("Integration horizon must be finite and > 0, got {0}")]
    InvalidHorizon(f64),
    #[error("Invalid simulation setup: {0}")]
    InvalidSetup(String),
}

impl SimulationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SimulationError::Kinetics(err) => err.class(),
            SimulationError::SolverDivergence(_) => ErrorClass::SolverDivergence,
            SimulationError::InvalidHorizon(_) | SimulationError::InvalidSetup(_) => {
                ErrorClass::Configuration
            }
        }
    }

    /// Maps an error returned through the solver interface back onto the
    /// crate's taxonomy.
    pub(crate) fn from_solver(err: anyhow::Error) -> Self {
        match err.downcast::<KineticsError>() {
            Ok(kinetic) => SimulationError::Kinetics(kinetic),
            Err(other) => SimulationError::SolverDivergence(format!("{other:#}")),
        }
    }
}
