//! Coverage trajectories produced by one integration call.
//!
//! A [`Trajectory`] is the ordered sequence of `(time, CoverageState)` samples
//! written by the integrator. It is used to extract the terminal state and for
//! diagnostics such as coverage-vs-time output; it is never fed back into the
//! integrator.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::kinetics::coverage::CoverageState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<CoverageState>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, t: f64, state: CoverageState) {
        self.times.push(t);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Last sample of the trajectory.
    pub fn terminal(&self) -> Option<(f64, CoverageState)> {
        Some((*self.times.last()?, *self.states.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &CoverageState)> {
        self.times.iter().copied().zip(self.states.iter())
    }

    pub fn theta_co(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.co).collect()
    }

    pub fn theta_o(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.o).collect()
    }

    pub fn theta_co2(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.co2).collect()
    }

    /// Unclamped vacant-site fraction of every sample.
    pub fn theta_star(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.vacancy()).collect()
    }

    /// Matrix with one row per sample: `[t, θ_CO, θ_O, θ_CO2, θ*]`.
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.len(), 5));
        for (i, (t, state)) in self.iter().enumerate() {
            matrix[(i, 0)] = t;
            matrix[(i, 1)] = state.co;
            matrix[(i, 2)] = state.o;
            matrix[(i, 3)] = state.co2;
            matrix[(i, 4)] = state.vacancy();
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_of_empty_trajectory() {
        assert!(Trajectory::default().terminal().is_none());
    }

    #[test]
    fn test_matrix_layout() {
        let mut trajectory = Trajectory::with_capacity(2);
        trajectory.push(0.0, CoverageState::vacant());
        trajectory.push(1.0, CoverageState::new(0.5, 0.25, 0.125));

        let matrix = trajectory.to_matrix();

        assert_eq!(matrix.shape(), &[2, 5]);
        assert_eq!(matrix[(0, 4)], 1.0);
        assert_eq!(matrix[(1, 0)], 1.0);
        assert_eq!(matrix[(1, 4)], 0.125);
        assert_eq!(trajectory.terminal().unwrap().0, 1.0);
    }
}
