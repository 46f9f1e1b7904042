//! Coverage derivative function.
//!
//! Composes the net step rates into the time derivatives of the coverage
//! vector:
//!
//! - dθ_CO/dt  = r1 − r3
//! - dθ_O/dt   = 2·r2 − r3
//! - dθ_CO2/dt = r3 − r4
//!
//! The factor 2 accounts for the two sites involved in every O2
//! dissociation/recombination event. The system is autonomous; time is
//! accepted only to match the solver interface.

use nalgebra::DMatrix;
use peroxide::fuga::ODEProblem;

use crate::{params::ParameterSet, simulation::stiff::StiffProblem};

use super::{
    coverage::CoverageState,
    error::KineticsError,
    rates::{RateConstants, StepRates},
};

/// Time derivatives of the coverages for a given state and parameter set.
pub fn coverage_derivatives(
    _t: f64,
    state: &CoverageState,
    params: &ParameterSet,
) -> Result<[f64; 3], KineticsError> {
    let rates = super::rates::evaluate_rates(state, params)?;
    Ok(derivatives_from_rates(&rates))
}

fn derivatives_from_rates(rates: &StepRates) -> [f64; 3] {
    [
        rates.r1 - rates.r3,
        2.0 * rates.r2 - rates.r3,
        rates.r3 - rates.r4,
    ]
}

/// The coverage ODE system of one parameter set.
///
/// Rate constants are evaluated once at construction, so the right-hand side
/// only performs the mass-action arithmetic.
#[derive(Debug, Clone)]
pub struct SurfaceSystem {
    params: ParameterSet,
    constants: RateConstants,
}

impl SurfaceSystem {
    /// Creates the system, validating the parameter set.
    pub fn new(params: &ParameterSet) -> Result<Self, KineticsError> {
        params.validate()?;
        let constants = RateConstants::from_params(params)?;
        Ok(Self {
            params: *params,
            constants,
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn constants(&self) -> &RateConstants {
        &self.constants
    }

    /// Net step rates at a coverage state.
    pub fn rates(&self, state: &CoverageState) -> Result<StepRates, KineticsError> {
        self.constants.step_rates(&self.params, state)
    }

    /// Time derivatives of the coverages at a state.
    pub fn derivatives(&self, state: &CoverageState) -> Result<[f64; 3], KineticsError> {
        Ok(derivatives_from_rates(&self.rates(state)?))
    }

    /// Jacobian of the coverage derivatives, ∂(dθ_i/dt)/∂θ_j.
    pub fn jacobian(&self, state: &CoverageState) -> Result<[[f64; 3]; 3], KineticsError> {
        let [d1, d2, d3, d4] = self.constants.rate_jacobian(&self.params, state)?;

        Ok(std::array::from_fn(|row| {
            std::array::from_fn(|column| match row {
                0 => d1[column] - d3[column],
                1 => 2.0 * d2[column] - d3[column],
                _ => d3[column] - d4[column],
            })
        }))
    }

    /// Max-norm of the coverage derivatives, the steady-state residual.
    pub fn residual(&self, state: &CoverageState) -> Result<f64, KineticsError> {
        Ok(self
            .derivatives(state)?
            .iter()
            .fold(0.0_f64, |acc, d| acc.max(d.abs())))
    }

    /// Fastest relaxation rate the system can exhibit (1/time).
    pub fn stiffness_bound(&self) -> f64 {
        self.constants.stiffness_bound(&self.params)
    }
}

impl ODEProblem for SurfaceSystem {
    fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
        let state = CoverageState::from_slice(y)
            .ok_or_else(|| anyhow::anyhow!("Expected 3 coverages, got {}", y.len()))?;
        let derivatives = self.derivatives(&state)?;
        dy[..3].copy_from_slice(&derivatives);
        Ok(())
    }
}

impl StiffProblem for SurfaceSystem {
    fn jacobian(&self, _t: f64, y: &[f64]) -> anyhow::Result<DMatrix<f64>> {
        let state = CoverageState::from_slice(y)
            .ok_or_else(|| anyhow::anyhow!("Expected 3 coverages, got {}", y.len()))?;
        let jac = SurfaceSystem::jacobian(self, &state)?;
        Ok(DMatrix::from_fn(3, 3, |row, column| jac[row][column]))
    }
}
