//! Rate law of the four-step CO oxidation mechanism.
//!
//! Every half-step follows an Arrhenius law k = A·exp(−E/(k_B·T)). The net
//! step rates are mean-field mass-action expressions in the coverages and the
//! vacant-site fraction θ*:
//!
//! - r1 = k1f·PCO·θ* − k1r·θ_CO
//! - r2 = k2f·PO2·θ*² − k2r·θ_O²
//! - r3 = k3f·θ_CO·θ_O − k3r·θ_CO2·θ*
//! - r4 = k4f·θ_CO2 − k4r·PCO2·θ*
//!
//! The turnover frequency is the net CO2 desorption rate r4.

use serde::{Deserialize, Serialize};

use crate::{
    constants::K_B_EV_PER_K,
    params::{Barrier, ParameterSet, Step},
};

use super::{coverage::CoverageState, error::KineticsError};

/// Arrhenius rate constant k = A·exp(−E/(k_B·T)).
///
/// Fails for a non-positive (or non-finite) temperature instead of returning
/// an infinite or NaN constant.
pub fn arrhenius(prefactor: f64, energy_ev: f64, t: f64) -> Result<f64, KineticsError> {
    if !(t > 0.0 && t.is_finite()) {
        return Err(KineticsError::NonPositiveTemperature(t));
    }
    Ok(prefactor * (-energy_ev / (K_B_EV_PER_K * t)).exp())
}

/// The eight forward/reverse rate constants of a parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConstants {
    pub k1f: f64,
    pub k1r: f64,
    pub k2f: f64,
    pub k2r: f64,
    pub k3f: f64,
    pub k3r: f64,
    pub k4f: f64,
    pub k4r: f64,
}

impl RateConstants {
    /// Evaluates all rate constants, resolving per-step prefactor overrides.
    pub fn from_params(params: &ParameterSet) -> Result<Self, KineticsError> {
        let k = |barrier: Barrier| {
            arrhenius(
                params.prefactor(barrier.step()),
                params.energy(barrier),
                params.t,
            )
        };

        Ok(Self {
            k1f: k(Barrier::E1f)?,
            k1r: k(Barrier::E1r)?,
            k2f: k(Barrier::E2f)?,
            k2r: k(Barrier::E2r)?,
            k3f: k(Barrier::E3f)?,
            k3r: k(Barrier::E3r)?,
            k4f: k(Barrier::E4f)?,
            k4r: k(Barrier::E4r)?,
        })
    }

    pub fn get(&self, barrier: Barrier) -> f64 {
        match barrier {
            Barrier::E1f => self.k1f,
            Barrier::E1r => self.k1r,
            Barrier::E2f => self.k2f,
            Barrier::E2r => self.k2r,
            Barrier::E3f => self.k3f,
            Barrier::E3r => self.k3r,
            Barrier::E4f => self.k4f,
            Barrier::E4r => self.k4r,
        }
    }

    /// Net step rates at a coverage state.
    ///
    /// The pressures are taken from `params`; the rate constants are assumed
    /// to have been computed from the same parameter set.
    pub fn step_rates(
        &self,
        params: &ParameterSet,
        state: &CoverageState,
    ) -> Result<StepRates, KineticsError> {
        let theta_star = state.checked_vacancy()?;

        let r1 = self.k1f * params.pco * theta_star - self.k1r * state.co;
        let r2 = self.k2f * params.po2 * theta_star.powi(2) - self.k2r * state.o.powi(2);
        let r3 = self.k3f * state.co * state.o - self.k3r * state.co2 * theta_star;
        let r4 = self.k4f * state.co2 - self.k4r * params.pco2 * theta_star;

        Ok(StepRates { r1, r2, r3, r4 })
    }

    /// Partial derivatives of the net step rates with respect to
    /// (θ_CO, θ_O, θ_CO2), one row per step.
    ///
    /// θ* enters every rate with ∂θ*/∂θ_i = −1.
    pub fn rate_jacobian(
        &self,
        params: &ParameterSet,
        state: &CoverageState,
    ) -> Result<[[f64; 3]; 4], KineticsError> {
        let theta_star = state.checked_vacancy()?;

        let adsorption = self.k1f * params.pco;
        let dissociation = 2.0 * self.k2f * params.po2 * theta_star;
        let recombination = 2.0 * self.k2r * state.o;
        let reverse_reaction = self.k3r * state.co2;
        let readsorption = self.k4r * params.pco2;

        Ok([
            [-adsorption - self.k1r, -adsorption, -adsorption],
            [-dissociation, -dissociation - recombination, -dissociation],
            [
                self.k3f * state.o + reverse_reaction,
                self.k3f * state.co + reverse_reaction,
                reverse_reaction - self.k3r * theta_star,
            ],
            [readsorption, readsorption, self.k4f + readsorption],
        ])
    }

    /// Upper bound on the magnitude of the coverage Jacobian's eigenvalues.
    ///
    /// Sums, over every term of the derivative function, the largest partial
    /// derivative it can contribute for coverages in [0, 1]. The inverse is the
    /// fastest relaxation time of the surface.
    pub fn stiffness_bound(&self, params: &ParameterSet) -> f64 {
        let adsorption = self.k1f * params.pco + self.k1r;
        let dissociation = 2.0 * (2.0 * self.k2f * params.po2 + 2.0 * self.k2r);
        let reaction = 2.0 * (self.k3f + self.k3r);
        let desorption = self.k4f + self.k4r * params.pco2;

        3.0 * (adsorption + dissociation + reaction + desorption)
    }
}

/// Net rates of the four elementary steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRates {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub r4: f64,
}

impl StepRates {
    /// Turnover frequency, the net CO2 desorption rate.
    pub fn tof(&self) -> f64 {
        self.r4
    }

    pub fn get(&self, step: Step) -> f64 {
        match step {
            Step::CoAdsorption => self.r1,
            Step::O2Dissociation => self.r2,
            Step::SurfaceReaction => self.r3,
            Step::Co2Desorption => self.r4,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.r1, self.r2, self.r3, self.r4]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|r| r.is_finite())
    }
}

/// Evaluates the net step rates for a coverage state and parameter set.
///
/// # Errors
///
/// * [`KineticsError::NonPositiveTemperature`] if `T <= 0`
/// * [`KineticsError::UnphysicalCoverage`] if θ* < −1e-8
pub fn evaluate_rates(
    state: &CoverageState,
    params: &ParameterSet,
) -> Result<StepRates, KineticsError> {
    RateConstants::from_params(params)?.step_rates(params, state)
}

/// Steady-state turnover frequency convention: TOF = r4 at the given state.
pub fn tof_at(state: &CoverageState, params: &ParameterSet) -> Result<f64, KineticsError> {
    Ok(evaluate_rates(state, params)?.tof())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_arrhenius_value() {
        let k = arrhenius(1e3, 0.35, 600.0).unwrap();
        let expected = 1e3 * (-0.35_f64 / (K_B_EV_PER_K * 600.0)).exp();
        assert_relative_eq!(k, expected, max_relative = 1e-14);
    }

    #[test]
    fn test_arrhenius_rejects_zero_temperature() {
        assert_eq!(
            arrhenius(1e3, 0.35, 0.0),
            Err(KineticsError::NonPositiveTemperature(0.0))
        );
    }

    #[test]
    fn test_override_only_affects_its_step() {
        let base = ParameterSet::baseline();
        let overridden = ParameterSet {
            a2: Some(2e3),
            ..base
        };

        let k0 = RateConstants::from_params(&base).unwrap();
        let k1 = RateConstants::from_params(&overridden).unwrap();

        assert_relative_eq!(k1.k2f, 2.0 * k0.k2f, max_relative = 1e-12);
        assert_relative_eq!(k1.k2r, 2.0 * k0.k2r, max_relative = 1e-12);
        assert_eq!(k1.k1f, k0.k1f);
        assert_eq!(k1.k4r, k0.k4r);
    }

    #[test]
    fn test_rates_by_hand() {
        let params = ParameterSet::baseline();
        let k = RateConstants::from_params(&params).unwrap();
        let state = CoverageState::new(0.3, 0.2, 0.1);
        let theta_star = 0.4;

        let rates = k.step_rates(&params, &state).unwrap();

        assert_relative_eq!(rates.r1, k.k1f * 1.0 * theta_star - k.k1r * 0.3);
        assert_relative_eq!(rates.r2, k.k2f * 0.2 * theta_star * theta_star - k.k2r * 0.04);
        assert_relative_eq!(rates.r3, k.k3f * 0.3 * 0.2 - k.k3r * 0.1 * theta_star);
        assert_relative_eq!(rates.r4, k.k4f * 0.1);
        assert_eq!(rates.tof(), rates.r4);
    }

    #[test]
    fn test_rate_jacobian_matches_central_differences() {
        let params = ParameterSet {
            pco2: 0.3,
            ..ParameterSet::baseline().at_temperature(700.0)
        };
        let k = RateConstants::from_params(&params).unwrap();
        let state = [0.3, 0.2, 0.1];
        let jac = k.rate_jacobian(&params, &state.into()).unwrap();

        let h = 1e-6;
        for column in 0..3 {
            let mut up = state;
            let mut down = state;
            up[column] += h;
            down[column] -= h;
            let r_up = k.step_rates(&params, &up.into()).unwrap().to_array();
            let r_down = k.step_rates(&params, &down.into()).unwrap().to_array();

            for row in 0..4 {
                let numeric = (r_up[row] - r_down[row]) / (2.0 * h);
                assert_relative_eq!(
                    jac[row][column],
                    numeric,
                    max_relative = 1e-6,
                    epsilon = 1e-9 * k.k1f.max(k.k4f)
                );
            }
        }
    }
}
