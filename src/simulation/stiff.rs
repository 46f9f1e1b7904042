//! Adaptive stiff integrator.
//!
//! [`Sdirk4`] is the five-stage, L-stable and stiffly accurate singly diagonally
//! implicit Runge-Kutta method of order 4 from Hairer & Wanner (Solving
//! Ordinary Differential Equations II, Table IV.6.5), with its embedded order-3
//! solution for error control.
//!
//! Every stage is solved by a simplified Newton iteration on `I − hγJ`, with the
//! Jacobian evaluated once per step. The local error estimate is filtered
//! through the same matrix, which keeps it bounded on very stiff components.
//! The step size follows the usual `0.9·err^(−1/4)` controller on the mixed
//! `atol + rtol·|y|` RMS norm.
//!
//! A step whose Newton iteration fails (divergence, a non-finite iterate, or
//! an error from the right-hand side such as an unphysical intermediate state)
//! is retried with a quarter of the step size.

use anyhow::anyhow;
use log::trace;
use nalgebra::{DMatrix, DVector};
use peroxide::fuga::ODEProblem;

use super::error::SimulationError;

const STAGES: usize = 5;
const GAMMA: f64 = 0.25;

const C: [f64; STAGES] = [0.25, 0.75, 11.0 / 20.0, 0.5, 1.0];

const A: [[f64; STAGES]; STAGES] = [
    [0.0; STAGES],
    [0.5, 0.0, 0.0, 0.0, 0.0],
    [17.0 / 50.0, -1.0 / 25.0, 0.0, 0.0, 0.0],
    [371.0 / 1360.0, -137.0 / 2720.0, 15.0 / 544.0, 0.0, 0.0],
    [25.0 / 24.0, -49.0 / 48.0, 125.0 / 16.0, -85.0 / 12.0, 0.0],
];

/// Weights of the order-4 solution minus those of the embedded order-3 one.
const ERROR_WEIGHTS: [f64; STAGES] = [
    25.0 / 24.0 - 59.0 / 48.0,
    -49.0 / 48.0 + 17.0 / 96.0,
    125.0 / 16.0 - 225.0 / 32.0,
    0.0,
    0.25,
];

/// Newton corrections below this fraction of the error tolerance end the
/// stage iteration.
const NEWTON_TOL: f64 = 1e-3;
const SAFETY: f64 = 0.9;
const FAC_MIN: f64 = 0.2;
const FAC_MAX: f64 = 5.0;
const REJECT_FAC_MIN: f64 = 0.1;
const FAILURE_FAC: f64 = 0.25;
const MIN_STEP: f64 = 1e-20;

/// An ODE problem that can provide its Jacobian ∂f/∂y.
///
/// The default implementation uses forward differences of
/// [`ODEProblem::rhs`]; problems with an analytic Jacobian should override it.
pub trait StiffProblem: ODEProblem {
    fn jacobian(&self, t: f64, y: &[f64]) -> anyhow::Result<DMatrix<f64>> {
        let n = y.len();
        let mut f0 = vec![0.0; n];
        self.rhs(t, y, &mut f0)?;

        let mut jac = DMatrix::zeros(n, n);
        let mut shifted = y.to_vec();
        let mut f1 = vec![0.0; n];
        for column in 0..n {
            let delta = f64::EPSILON.sqrt() * y[column].abs().max(1e-5);
            shifted[column] = y[column] + delta;
            self.rhs(t, &shifted, &mut f1)?;
            shifted[column] = y[column];

            for row in 0..n {
                jac[(row, column)] = (f1[row] - f0[row]) / delta;
            }
        }

        Ok(jac)
    }
}

/// Step-size state carried across consecutive calls to [`Sdirk4::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepControl {
    /// Step size proposed for the next step
    pub step: f64,
    pub accepted: usize,
    pub rejected: usize,
}

impl StepControl {
    pub fn new(initial_step: f64) -> Self {
        Self {
            step: initial_step,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Accepted plus rejected steps.
    pub fn attempts(&self) -> usize {
        self.accepted + self.rejected
    }
}

/// Adaptive L-stable SDIRK integrator of order 4.
///
/// # Fields
///
/// * `rtol` - Relative tolerance of the local error
/// * `atol` - Absolute tolerance of the local error
/// * `max_newton_iter` - Newton iterations per stage before the step is retried
/// * `max_steps` - Budget of attempted steps per [`StepControl`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sdirk4 {
    pub rtol: f64,
    pub atol: f64,
    pub max_newton_iter: usize,
    pub max_steps: usize,
}

impl Default for Sdirk4 {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_newton_iter: 10,
            max_steps: 5_000_000,
        }
    }
}

impl Sdirk4 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Self::default()
        }
    }

    /// Advances `y` from `t0` to exactly `t1`.
    ///
    /// The step size proposed at the end is stored in `control`, so a sequence
    /// of calls over adjacent intervals behaves like a single integration that
    /// stops at every interval boundary.
    ///
    /// # Errors
    ///
    /// * [`SimulationError::SolverDivergence`] if the step budget is exhausted
    ///   or the step size underflows
    /// * [`SimulationError::Kinetics`] if the step size underflows because the
    ///   right-hand side keeps failing with a kinetic error
    pub fn advance<P: StiffProblem>(
        &self,
        problem: &P,
        t0: f64,
        t1: f64,
        y: &mut [f64],
        control: &mut StepControl,
    ) -> Result<(), SimulationError> {
        let mut t = t0;
        let mut state = DVector::from_column_slice(y);

        while t < t1 {
            if control.attempts() >= self.max_steps {
                return Err(SimulationError::SolverDivergence(format!(
                    "Step budget of {} exhausted at t = {t:.6e}",
                    self.max_steps
                )));
            }

            let last = t1 - t <= control.step;
            let h = if last { t1 - t } else { control.step };

            match self.attempt(problem, t, &state, h) {
                Ok((next, error)) if error <= 1.0 => {
                    control.accepted += 1;
                    state = next;
                    t = if last { t1 } else { t + h };

                    if !last {
                        control.step = h * self.step_factor(error, FAC_MIN);
                    }
                }
                Ok((_, error)) => {
                    control.rejected += 1;
                    control.step = h * self.step_factor(error, REJECT_FAC_MIN).min(1.0);
                    trace!("Rejected step {h:.3e} at t = {t:.6e} (error {error:.3e})");
                }
                Err(err) => {
                    control.rejected += 1;
                    control.step = h * FAILURE_FAC;
                    trace!("Failed step {h:.3e} at t = {t:.6e}: {err}");

                    if control.step < (16.0 * f64::EPSILON * t.abs()).max(MIN_STEP) {
                        return Err(SimulationError::from_solver(err.context(format!(
                            "Step size underflow at t = {t:.6e}"
                        ))));
                    }
                }
            }
        }

        y.copy_from_slice(state.as_slice());
        Ok(())
    }

    fn step_factor(&self, error: f64, fac_min: f64) -> f64 {
        if error == 0.0 {
            return FAC_MAX;
        }
        (SAFETY * error.powf(-0.25)).clamp(fac_min, FAC_MAX)
    }

    /// One step of size `h`; returns the new state and its scaled error norm.
    fn attempt<P: StiffProblem>(
        &self,
        problem: &P,
        t: f64,
        y: &DVector<f64>,
        h: f64,
    ) -> anyhow::Result<(DVector<f64>, f64)> {
        let n = y.len();
        let hg = h * GAMMA;

        let jac = problem.jacobian(t, y.as_slice())?;
        if jac.iter().any(|v| !v.is_finite()) {
            return Err(anyhow!("Non-finite Jacobian"));
        }
        let newton = (DMatrix::identity(n, n) - jac * hg).lu();

        let mut slopes: Vec<DVector<f64>> = Vec::with_capacity(STAGES);
        let mut stage = y.clone();
        let mut f = vec![0.0; n];

        for i in 0..STAGES {
            let mut base = y.clone();
            for (j, slope) in slopes.iter().enumerate() {
                base.axpy(h * A[i][j], slope, 1.0);
            }
            stage.copy_from(&base);

            let mut previous = f64::INFINITY;
            let mut converged = false;
            for _ in 0..self.max_newton_iter {
                problem.rhs(t + C[i] * h, stage.as_slice(), &mut f)?;

                let residual = DVector::from_fn(n, |m, _| base[m] + hg * f[m] - stage[m]);
                let delta = newton
                    .solve(&residual)
                    .ok_or_else(|| anyhow!("Singular Newton matrix"))?;
                stage += &delta;

                if stage.iter().any(|v| !v.is_finite()) {
                    return Err(anyhow!("Non-finite Newton iterate"));
                }

                let norm = self.error_norm(&delta, y, &stage);
                if norm <= NEWTON_TOL {
                    converged = true;
                    break;
                }
                if norm > 2.0 * previous {
                    return Err(anyhow!("Newton iteration diverged"));
                }
                previous = norm;
            }

            if !converged {
                return Err(anyhow!(
                    "Newton iteration did not converge in {} iterations",
                    self.max_newton_iter
                ));
            }

            slopes.push((&stage - &base) / hg);
        }

        let mut error = DVector::<f64>::zeros(n);
        for (weight, slope) in ERROR_WEIGHTS.iter().zip(slopes.iter()) {
            error.axpy(h * weight, slope, 1.0);
        }
        let error = newton
            .solve(&error)
            .ok_or_else(|| anyhow!("Singular Newton matrix"))?;

        let norm = self.error_norm(&error, y, &stage);
        if !norm.is_finite() {
            return Err(anyhow!("Non-finite error estimate"));
        }
        Ok((stage, norm))
    }

    /// RMS norm scaled by `atol + rtol·max(|y0|, |y1|)`.
    fn error_norm(&self, v: &DVector<f64>, y0: &DVector<f64>, y1: &DVector<f64>) -> f64 {
        let sum: f64 = v
            .iter()
            .zip(y0.iter().zip(y1.iter()))
            .map(|(vi, (a, b))| {
                let scale = self.atol + self.rtol * a.abs().max(b.abs());
                (vi / scale).powi(2)
            })
            .sum();
        (sum / v.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// y' = −λ·(y − cos t)
    struct Relaxation {
        lambda: f64,
    }

    impl ODEProblem for Relaxation {
        fn rhs(&self, t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
            dy[0] = -self.lambda * (y[0] - t.cos());
            Ok(())
        }
    }

    impl StiffProblem for Relaxation {}

    /// y1' = −y2, y2' = y1
    struct Rotation;

    impl ODEProblem for Rotation {
        fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
            dy[0] = -y[1];
            dy[1] = y[0];
            Ok(())
        }
    }

    impl StiffProblem for Rotation {}

    #[test]
    fn test_weights_are_consistent() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum::<f64>() + GAMMA;
            assert_relative_eq!(row_sum, C[i], epsilon = 1e-14);
        }
        assert_relative_eq!(ERROR_WEIGHTS.iter().sum::<f64>(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_non_stiff_accuracy() {
        let solver = Sdirk4::default();
        let mut control = StepControl::new(1e-3);
        let mut y = [1.0, 0.0];

        solver
            .advance(&Rotation, 0.0, 2.0, &mut y, &mut control)
            .unwrap();

        assert_relative_eq!(y[0], 2.0_f64.cos(), max_relative = 1e-6);
        assert_relative_eq!(y[1], 2.0_f64.sin(), max_relative = 1e-6);
    }

    #[test]
    fn test_stiff_relaxation_takes_few_steps() {
        let problem = Relaxation { lambda: 1e12 };
        let solver = Sdirk4::default();
        let mut control = StepControl::new(1e-6);
        let mut y = [0.0];

        solver.advance(&problem, 0.0, 1.0, &mut y, &mut control).unwrap();

        // The slow manifold is y = cos t + sin t / λ + O(1/λ²)
        assert_relative_eq!(y[0], 1.0_f64.cos(), max_relative = 1e-7);
        assert!(control.attempts() < 10_000);
    }

    #[test]
    fn test_lands_on_interval_boundaries() {
        let solver = Sdirk4::default();
        let mut control = StepControl::new(10.0);
        let mut y = [1.0, 0.0];

        for i in 0..4 {
            let t0 = i as f64 * 0.25;
            solver
                .advance(&Rotation, t0, t0 + 0.25, &mut y, &mut control)
                .unwrap();
        }

        assert_relative_eq!(y[0], 1.0_f64.cos(), max_relative = 1e-6);
        assert!(control.step > 0.0);
    }

    #[test]
    fn test_step_budget() {
        let solver = Sdirk4 {
            max_steps: 3,
            ..Sdirk4::default()
        };
        let mut control = StepControl::new(1e-6);
        let mut y = [1.0, 0.0];

        let result = solver.advance(&Rotation, 0.0, 10.0, &mut y, &mut control);

        assert!(matches!(result, Err(SimulationError::SolverDivergence(_))));
    }
}
