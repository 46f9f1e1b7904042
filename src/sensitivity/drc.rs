//! Degree of rate control by one-factor-at-a-time finite differences.
//!
//! For each requested step the forward barrier is lowered by δE with every
//! other parameter held at its baseline value, the steady-state TOF is
//! recomputed, and
//!
//! DRC = (ln TOF₁ − ln TOF₀) / (δE / (k_B·T))
//!
//! approximates ∂ln(TOF)/∂(−E/k_BT). Coefficients of different steps are
//! independent; no joint Jacobian is formed.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    params::{ParameterSet, Step},
    simulation::{setup::SteadyStateSetup, steady_state::steady_state_tof},
};

use super::error::SensitivityError;

/// Degree-of-rate-control coefficients of a baseline parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrcMap {
    /// Steady-state TOF of the unperturbed parameter set
    pub baseline_tof: f64,
    /// Barrier decrement used for the finite differences (eV)
    pub delta_e: f64,
    /// Temperature of the baseline (K)
    pub temperature: f64,
    /// Coefficient per step
    pub coefficients: BTreeMap<Step, f64>,
}

impl DrcMap {
    pub fn get(&self, step: Step) -> Option<f64> {
        self.coefficients.get(&step).copied()
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Iterates over `(step, coefficient)` pairs in cycle order.
    pub fn iter(&self) -> impl Iterator<Item = (Step, f64)> + '_ {
        self.coefficients.iter().map(|(step, drc)| (*step, *drc))
    }

    /// Coefficients keyed by the human readable step label.
    pub fn labelled(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(step, drc)| (step.label().to_string(), drc))
            .collect()
    }

    /// Sum of the coefficients.
    ///
    /// Close to one when every rate-relevant step is included.
    pub fn sum(&self) -> f64 {
        self.coefficients.values().sum()
    }
}

/// Finite-difference degree of rate control from two TOFs.
///
/// # Errors
///
/// [`SensitivityError::NonPositiveTof`] if either TOF is not strictly positive.
pub fn drc_coefficient(
    tof_base: f64,
    tof_perturbed: f64,
    delta_e: f64,
    temperature: f64,
) -> Result<f64, SensitivityError> {
    check_positive("Baseline", tof_base)?;
    check_positive("Perturbed", tof_perturbed)?;

    let thermal = crate::constants::K_B_EV_PER_K * temperature;
    Ok((tof_perturbed.ln() - tof_base.ln()) / (delta_e / thermal))
}

/// Computes the degree of rate control of each step's forward barrier.
///
/// # Arguments
///
/// * `baseline` - Unperturbed parameter set
/// * `steps` - Steps to analyse; duplicates are evaluated once
/// * `delta_e` - Barrier decrement in eV (typically 0.01)
/// * `setup` - Steady-state integration settings
///
/// # Errors
///
/// * [`SensitivityError::InvalidPerturbation`] if `delta_e` is not finite and positive
/// * [`SensitivityError::NonPositiveTof`] if the baseline or a perturbed TOF is not > 0
/// * [`SensitivityError::Simulation`] if a steady-state integration fails
pub fn compute_drc(
    baseline: &ParameterSet,
    steps: &[Step],
    delta_e: f64,
    setup: &SteadyStateSetup,
) -> Result<DrcMap, SensitivityError> {
    if !(delta_e > 0.0 && delta_e.is_finite()) {
        return Err(SensitivityError::InvalidPerturbation(delta_e));
    }

    let tof_base = steady_state_tof(baseline, setup)?;
    check_positive("Baseline", tof_base)?;
    debug!("Baseline TOF = {tof_base:.6e}");

    let mut coefficients = BTreeMap::new();
    for step in steps {
        if coefficients.contains_key(step) {
            continue;
        }

        let barrier = step.forward_barrier();
        let perturbed = baseline.shifted(barrier, -delta_e);
        let tof = steady_state_tof(&perturbed, setup)?;
        check_positive(&format!("Perturbed ({barrier})"), tof)?;

        let drc = drc_coefficient(tof_base, tof, delta_e, baseline.t)?;
        debug!("{}: TOF = {tof:.6e}, DRC = {drc:+.4}", step.label());
        coefficients.insert(*step, drc);
    }

    let map = DrcMap {
        baseline_tof: tof_base,
        delta_e,
        temperature: baseline.t,
        coefficients,
    };
    info!(
        "Degree of rate control at T = {} K: sum = {:.4}",
        map.temperature,
        map.sum()
    );

    Ok(map)
}

fn check_positive(context: &str, tof: f64) -> Result<(), SensitivityError> {
    if tof > 0.0 && tof.is_finite() {
        Ok(())
    } else {
        Err(SensitivityError::NonPositiveTof {
            context: context.to_string(),
            tof,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::constants::K_B_EV_PER_K;

    use super::*;

    #[test]
    fn test_coefficient_of_pure_arrhenius_step() {
        // A TOF proportional to exp(-E/kT) has a DRC of exactly one.
        let t = 600.0;
        let delta_e = 0.01;
        let tof0 = (-0.7 / (K_B_EV_PER_K * t)).exp();
        let tof1 = (-(0.7 - delta_e) / (K_B_EV_PER_K * t)).exp();

        let drc = drc_coefficient(tof0, tof1, delta_e, t).unwrap();

        assert_relative_eq!(drc, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_coefficient_rejects_zero_tof() {
        assert!(matches!(
            drc_coefficient(0.0, 1.0, 0.01, 600.0),
            Err(SensitivityError::NonPositiveTof { .. })
        ));
        assert!(matches!(
            drc_coefficient(1.0, -1.0, 0.01, 600.0),
            Err(SensitivityError::NonPositiveTof { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_perturbation() {
        let result = compute_drc(
            &ParameterSet::baseline(),
            &Step::ALL,
            0.0,
            &SteadyStateSetup::analysis(),
        );
        assert!(matches!(
            result,
            Err(SensitivityError::InvalidPerturbation(_))
        ));
    }

    #[test]
    fn test_map_accessors() {
        let map = DrcMap {
            baseline_tof: 1.0,
            delta_e: 0.01,
            temperature: 600.0,
            coefficients: BTreeMap::from([(Step::O2Dissociation, 0.75), (Step::CoAdsorption, -0.5)]),
        };

        assert_eq!(map.sum(), 0.25);
        assert_eq!(map.get(Step::SurfaceReaction), None);
        assert_eq!(map.iter().next().unwrap().0, Step::CoAdsorption);
        assert_eq!(map.labelled()["O2 dissociation"], 0.75);
    }
}
