//! Steady-state integration of the coverage ODE system.
//!
//! Starting from a clean surface, the coverage derivatives are integrated with
//! the adaptive L-stable solver of [`super::stiff`] up to the requested
//! horizon. The end state is steady if the max-norm of its derivatives is below
//! the residual threshold. Otherwise the integration is repeated once from the
//! same clean surface over twice the horizon; a result that is still
//! unconverged afterwards is returned as-is together with its residual.
//!
//! The solver stops on a uniform grid of `n_points` output samples and carries
//! its step size across the samples, so the grid only affects the trajectory,
//! not the step sequence between samples.
//!
//! [`simulate_with`] runs the same policy with a fixed-step peroxide
//! integrator (RK4, RK5). Each output interval is then split into equal steps
//! no longer than `stability / λ_max` (see [`SurfaceSystem::stiffness_bound`]),
//! which is only affordable for mildly stiff parameter sets.
//!
//! Results are bit-reproducible: no randomness, no warm starts, and the step
//! sequence depends only on the parameter set and the setup.

use log::{debug, warn};
use peroxide::fuga::ODEIntegrator;
use serde::{Deserialize, Serialize};

use crate::{
    kinetics::{coverage::CoverageState, rates::StepRates, system::SurfaceSystem},
    params::ParameterSet,
};

use super::{
    error::SimulationError,
    setup::SteadyStateSetup,
    stiff::StepControl,
    trajectory::Trajectory,
};

/// Terminal state of a steady-state integration.
///
/// # Fields
///
/// * `coverage` - End coverages clamped to [0, 1]
/// * `theta_star` - Vacant-site fraction of the clamped coverages, floored at 0
/// * `residual` - Max-norm of dθ/dt at the (unclamped) end state
/// * `horizon` - Horizon of the integration that produced the state
/// * `extended` - Whether the horizon had to be doubled
/// * `converged` - Whether the residual is within the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateResult {
    pub coverage: CoverageState,
    pub theta_star: f64,
    pub residual: f64,
    pub horizon: f64,
    pub extended: bool,
    pub converged: bool,
}

impl SteadyStateResult {
    /// Net step rates at the steady state.
    pub fn rates(&self, params: &ParameterSet) -> Result<StepRates, SimulationError> {
        Ok(crate::kinetics::rates::evaluate_rates(&self.coverage, params)?)
    }

    /// Turnover frequency (net r4) at the steady state.
    pub fn tof(&self, params: &ParameterSet) -> Result<f64, SimulationError> {
        Ok(self.rates(params)?.tof())
    }
}

/// A steady state together with the trajectory that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateRun {
    pub result: SteadyStateResult,
    pub trajectory: Trajectory,
}

/// Integrates the coverage system to steady state over `[0, t_final]`.
///
/// Uses the default [`SteadyStateSetup`] with the given horizon.
///
/// # Errors
///
/// * [`SimulationError::InvalidHorizon`] if `t_final` is not finite and positive
/// * [`SimulationError::Kinetics`] for invalid parameters or an unphysical state
/// * [`SimulationError::SolverDivergence`] if the integration fails
pub fn integrate_to_steady_state(
    params: &ParameterSet,
    t_final: f64,
) -> Result<SteadyStateResult, SimulationError> {
    simulate_to_steady_state(params, &SteadyStateSetup::with_t_final(t_final))
        .map(|run| run.result)
}

/// Integrates to steady state and keeps the trajectory of the final run.
pub fn simulate_to_steady_state(
    params: &ParameterSet,
    setup: &SteadyStateSetup,
) -> Result<SteadyStateRun, SimulationError> {
    solve_steady_state(params, setup, |system, horizon| {
        integrate_adaptive(system, horizon, setup)
    })
}

/// Steady-state turnover frequency (net r4) for a parameter set.
pub fn steady_state_tof(
    params: &ParameterSet,
    setup: &SteadyStateSetup,
) -> Result<f64, SimulationError> {
    simulate_to_steady_state(params, setup)?.result.tof(params)
}

/// Integrates to steady state with a caller-supplied fixed-step peroxide
/// integrator.
///
/// Every internal step has the same length, bounded by
/// `setup.stability / λ_max`. Adaptive peroxide integrators are rejected,
/// since they report a proposal for the next step instead of the step taken.
///
/// # Arguments
///
/// * `params` - Parameter set of the run
/// * `setup` - Horizon, sampling and convergence settings
/// * `integrator` - A fixed-step peroxide integrator such as [`peroxide::fuga::RK4`]
///
/// # Errors
///
/// * [`SimulationError::InvalidSetup`] if the integrator changes the step size
/// * [`SimulationError::SolverDivergence`] if the equal steps exceed `max_steps`
///   or the state becomes non-finite
///
/// # Returns
///
/// The steady state and the trajectory of the last integration performed.
pub fn simulate_with<S: ODEIntegrator>(
    params: &ParameterSet,
    setup: &SteadyStateSetup,
    integrator: &S,
) -> Result<SteadyStateRun, SimulationError> {
    solve_steady_state(params, setup, |system, horizon| {
        integrate_fixed(system, horizon, setup, integrator)
    })
}

/// Integrates from the clean surface, extends the horizon once if needed and
/// balances the end state.
fn solve_steady_state<F>(
    params: &ParameterSet,
    setup: &SteadyStateSetup,
    integrate: F,
) -> Result<SteadyStateRun, SimulationError>
where
    F: Fn(&SurfaceSystem, f64) -> Result<Trajectory, SimulationError>,
{
    setup.validate()?;
    let system = SurfaceSystem::new(params)?;

    let mut horizon = setup.t_final;
    let mut trajectory = integrate(&system, horizon)?;
    let mut state = terminal_state(&trajectory)?;
    let mut residual = system.residual(&state)?;
    let mut extended = false;

    if residual > setup.residual_tol && setup.extend_once {
        debug!(
            "Residual {residual:.3e} above {:.1e} at t = {horizon}; re-integrating to t = {}",
            setup.residual_tol,
            2.0 * horizon
        );

        horizon *= 2.0;
        trajectory = integrate(&system, horizon)?;
        state = terminal_state(&trajectory)?;
        residual = system.residual(&state)?;
        extended = true;
    }

    let converged = residual <= setup.residual_tol;
    if !converged {
        warn!(
            "Steady state not reached at t = {horizon} (residual {residual:.3e}, T = {} K, PCO = {})",
            params.t, params.pco
        );
    }

    let (coverage, theta_star) = site_balanced(&state);

    Ok(SteadyStateRun {
        result: SteadyStateResult {
            coverage,
            theta_star,
            residual,
            horizon,
            extended,
            converged,
        },
        trajectory,
    })
}

/// Clamps the coverages to [0, 1] and derives θ* so that the four site
/// fractions add up to one.
///
/// A clamped total above one can only come from rounding noise; it is
/// removed by rescaling, which leaves θ* = 0.
fn site_balanced(state: &CoverageState) -> (CoverageState, f64) {
    let clamped = state.clamped();
    let occupied = clamped.co + clamped.o + clamped.co2;

    if occupied > 1.0 {
        let rescaled = CoverageState::new(
            clamped.co / occupied,
            clamped.o / occupied,
            clamped.co2 / occupied,
        );
        return (rescaled, rescaled.vacancy().max(0.0));
    }

    (clamped, clamped.vacancy().max(0.0))
}

fn terminal_state(trajectory: &Trajectory) -> Result<CoverageState, SimulationError> {
    trajectory
        .terminal()
        .map(|(_, state)| state)
        .ok_or_else(|| SimulationError::SolverDivergence("Empty trajectory".to_string()))
}

/// Output time of sample `i` on the uniform grid over `[0, horizon]`.
fn sample_time(i: usize, n_intervals: usize, horizon: f64) -> f64 {
    if i == n_intervals {
        horizon
    } else {
        i as f64 * (horizon / n_intervals as f64)
    }
}

fn checked_sample(y: &[f64], t: f64) -> Result<CoverageState, SimulationError> {
    let state = CoverageState::from_slice(y)
        .ok_or_else(|| SimulationError::SolverDivergence("Lost state vector".to_string()))?;
    if !state.is_finite() {
        return Err(SimulationError::SolverDivergence(format!(
            "Non-finite coverages at t = {t}"
        )));
    }
    Ok(state)
}

/// Integrates the system from the clean surface over `[0, horizon]` with the
/// adaptive stiff solver.
fn integrate_adaptive(
    system: &SurfaceSystem,
    horizon: f64,
    setup: &SteadyStateSetup,
) -> Result<Trajectory, SimulationError> {
    let solver = setup.solver();
    let n_intervals = setup.n_points - 1;
    let mut control = StepControl::new(setup.initial_step);

    let mut y = CoverageState::vacant().to_array();
    let mut trajectory = Trajectory::with_capacity(setup.n_points);
    trajectory.push(0.0, CoverageState::vacant());

    for i in 0..n_intervals {
        let t0 = sample_time(i, n_intervals, horizon);
        let t1 = sample_time(i + 1, n_intervals, horizon);
        solver.advance(system, t0, t1, &mut y, &mut control)?;
        trajectory.push(t1, checked_sample(&y, t1)?);
    }

    debug!(
        "Reached t = {horizon} in {} steps ({} rejected)",
        control.accepted, control.rejected
    );

    Ok(trajectory)
}

/// Integrates the system from the clean surface over `[0, horizon]` with equal
/// steps of a fixed-step integrator.
fn integrate_fixed<S: ODEIntegrator>(
    system: &SurfaceSystem,
    horizon: f64,
    setup: &SteadyStateSetup,
    integrator: &S,
) -> Result<Trajectory, SimulationError> {
    let n_intervals = setup.n_points - 1;
    let dt = horizon / n_intervals as f64;
    let substeps = internal_steps(dt, system.stiffness_bound(), setup.stability);

    let total_steps = substeps.saturating_mul(n_intervals);
    if total_steps > setup.max_steps {
        return Err(SimulationError::SolverDivergence(format!(
            "Integration to t = {horizon} needs {total_steps} fixed steps, budget is {}",
            setup.max_steps
        )));
    }

    let h = dt / substeps as f64;
    debug!("Integrating to t = {horizon} with {total_steps} fixed steps of {h:.3e}");

    let mut y = CoverageState::vacant().to_array().to_vec();
    let mut trajectory = Trajectory::with_capacity(setup.n_points);
    trajectory.push(0.0, CoverageState::vacant());

    for i in 0..n_intervals {
        let t0 = i as f64 * dt;
        for j in 0..substeps {
            let taken = integrator
                .step(system, t0 + j as f64 * h, &mut y, h)
                .map_err(SimulationError::from_solver)?;

            if (taken - h).abs() > 1e-12 * h {
                return Err(SimulationError::InvalidSetup(format!(
                    "Fixed-step integrator expected: step {h:.6e} was answered with {taken:.6e}"
                )));
            }
        }

        let t1 = sample_time(i + 1, n_intervals, horizon);
        trajectory.push(t1, checked_sample(&y, t1)?);
    }

    Ok(trajectory)
}

/// Number of equal internal steps per output interval.
fn internal_steps(dt: f64, stiffness: f64, stability: f64) -> usize {
    let h_max = stability / stiffness;
    if !h_max.is_finite() || h_max <= 0.0 {
        return 1;
    }

    let steps = (dt / h_max).ceil();
    if steps >= usize::MAX as f64 {
        usize::MAX
    } else {
        (steps as usize).max(1)
    }
}
