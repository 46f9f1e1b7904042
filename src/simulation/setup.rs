//! Setup module for configuring steady-state integrations.
//!
//! This module provides the [`SteadyStateSetup`] struct and its builder for
//! configuring the integration used to reach a steady state. It handles:
//!
//! - The integration horizon and the number of stored trajectory samples
//! - The steady-state residual threshold and the single horizon extension
//! - Error tolerances, Newton iteration limit and initial step of the adaptive
//!   stiff solver
//! - The step length bound of fixed-step integrators and the total step budget

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::constants::{ANALYSIS_T_FINAL, DEFAULT_N_POINTS, DEFAULT_T_FINAL, RESIDUAL_TOLERANCE};

use super::{error::SimulationError, stiff::Sdirk4};

/// Configuration of a steady-state integration.
///
/// # Fields
///
/// * `t_final` - Integration horizon (default: 50.0)
/// * `n_points` - Number of stored trajectory samples, including t = 0 (default: 800)
/// * `residual_tol` - Max-norm of dθ/dt below which the end state is steady (default: 1e-8)
/// * `extend_once` - Re-integrate once over twice the horizon if unconverged (default: true)
/// * `rtol` - Relative local error tolerance of the stiff solver (default: 1e-8)
/// * `atol` - Absolute local error tolerance of the stiff solver (default: 1e-10)
/// * `max_newton_iter` - Newton iterations per stage before a step is retried (default: 10)
/// * `initial_step` - First trial step of the stiff solver (default: 1e-6)
/// * `stability` - Step length of fixed-step integrators as a fraction of the
///   fastest relaxation time (default: 0.5)
/// * `max_steps` - Budget of attempted steps per integration (default: 5_000_000)
///
/// # Examples
///
/// ```
/// use surfkin::prelude::SteadyStateSetupBuilder;
///
/// let setup = SteadyStateSetupBuilder::default()
///     .t_final(80.0)
///     .n_points(400)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.t_final, 80.0);
/// assert_eq!(setup.residual_tol, 1e-8);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SteadyStateSetup {
    #[builder(default = "DEFAULT_T_FINAL")]
    pub t_final: f64,
    #[builder(default = "DEFAULT_N_POINTS")]
    pub n_points: usize,
    #[builder(default = "RESIDUAL_TOLERANCE")]
    pub residual_tol: f64,
    #[builder(default = "true")]
    pub extend_once: bool,
    #[builder(default = "1e-8")]
    pub rtol: f64,
    #[builder(default = "1e-10")]
    pub atol: f64,
    #[builder(default = "10")]
    pub max_newton_iter: usize,
    #[builder(default = "1e-6")]
    pub initial_step: f64,
    #[builder(default = "0.5")]
    pub stability: f64,
    #[builder(default = "5_000_000")]
    pub max_steps: usize,
}

impl SteadyStateSetupBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(t_final) = self.t_final {
            if !(t_final > 0.0 && t_final.is_finite()) {
                return Err(format!("t_final must be finite and > 0, got {t_final}"));
            }
        }
        if let Some(n_points) = self.n_points {
            if n_points < 2 {
                return Err(format!("n_points must be at least 2, got {n_points}"));
            }
        }
        for (name, value) in [
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("initial_step", self.initial_step),
            ("stability", self.stability),
        ] {
            if let Some(value) = value {
                if !(value > 0.0 && value.is_finite()) {
                    return Err(format!("{name} must be finite and > 0, got {value}"));
                }
            }
        }
        if self.max_newton_iter == Some(0) {
            return Err("max_newton_iter must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for SteadyStateSetup {
    fn default() -> Self {
        Self {
            t_final: DEFAULT_T_FINAL,
            n_points: DEFAULT_N_POINTS,
            residual_tol: RESIDUAL_TOLERANCE,
            extend_once: true,
            rtol: 1e-8,
            atol: 1e-10,
            max_newton_iter: 10,
            initial_step: 1e-6,
            stability: 0.5,
            max_steps: 5_000_000,
        }
    }
}

impl SteadyStateSetup {
    /// Default setup with another horizon.
    pub fn with_t_final(t_final: f64) -> Self {
        Self {
            t_final,
            ..Self::default()
        }
    }

    /// Setup used by the sensitivity analyses (horizon 80).
    pub fn analysis() -> Self {
        Self::with_t_final(ANALYSIS_T_FINAL)
    }

    /// The adaptive stiff solver configured by this setup.
    pub fn solver(&self) -> Sdirk4 {
        Sdirk4 {
            rtol: self.rtol,
            atol: self.atol,
            max_newton_iter: self.max_newton_iter,
            max_steps: self.max_steps,
        }
    }

    /// Validates a setup that may have been constructed without the builder.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.t_final > 0.0 && self.t_final.is_finite()) {
            return Err(SimulationError::InvalidHorizon(self.t_final));
        }
        if self.n_points < 2 {
            return Err(SimulationError::InvalidSetup(format!(
                "n_points must be at least 2, got {}",
                self.n_points
            )));
        }
        for (name, value) in [
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("initial_step", self.initial_step),
            ("stability", self.stability),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimulationError::InvalidSetup(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.max_newton_iter == 0 {
            return Err(SimulationError::InvalidSetup(
                "max_newton_iter must be at least 1".to_string(),
            ));
        }
        if !(self.residual_tol >= 0.0) {
            return Err(SimulationError::InvalidSetup(format!(
                "residual_tol must be >= 0, got {}",
                self.residual_tol
            )));
        }
        Ok(())
    }
}
