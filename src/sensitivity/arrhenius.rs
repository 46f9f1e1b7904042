//! Apparent activation energies from Arrhenius plots.
//!
//! The steady-state TOF is computed at a series of temperatures with all other
//! parameters fixed, and ln(TOF) is regressed on 1/T by ordinary least squares.
//! The apparent activation energy follows from the slope m as
//! Ea_app = −m·k_B. Only strictly positive TOF samples enter the fit.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{EV_TO_KJ_PER_MOL, K_B_EV_PER_K, MIN_ARRHENIUS_POINTS},
    params::ParameterSet,
    simulation::{setup::SteadyStateSetup, steady_state::steady_state_tof},
};

use super::error::SensitivityError;

/// Least-squares line through ln(TOF) vs 1/T.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusFit {
    /// Slope of ln(TOF) against 1/T (K)
    pub slope: f64,
    /// Intercept, ln of the apparent prefactor
    pub intercept: f64,
    /// Apparent activation energy in eV
    pub ea_ev: f64,
    /// Apparent activation energy in kJ/mol
    pub ea_kjmol: f64,
    /// Number of positive samples used in the fit
    pub n_points: usize,
    /// Coefficient of determination of the fit
    pub r_squared: f64,
}

impl ArrheniusFit {
    /// TOF predicted by the fitted line at temperature `t`.
    pub fn predict_tof(&self, t: f64) -> f64 {
        (self.intercept + self.slope / t).exp()
    }
}

/// Fits ln(TOF) against 1/T.
///
/// Samples with a non-positive or non-finite TOF (or temperature) are
/// discarded before fitting.
///
/// # Errors
///
/// * [`SensitivityError::LengthMismatch`] if the inputs differ in length
/// * [`SensitivityError::InsufficientData`] if fewer than three usable samples remain
/// * [`SensitivityError::InvalidSweep`] if all usable samples share one temperature
pub fn fit_arrhenius(temperatures: &[f64], tofs: &[f64]) -> Result<ArrheniusFit, SensitivityError> {
    if temperatures.len() != tofs.len() {
        return Err(SensitivityError::LengthMismatch {
            temperatures: temperatures.len(),
            tofs: tofs.len(),
        });
    }

    let (x, y): (Vec<f64>, Vec<f64>) = temperatures
        .iter()
        .zip(tofs.iter())
        .filter(|(t, tof)| **t > 0.0 && t.is_finite() && **tof > 0.0 && tof.is_finite())
        .map(|(t, tof)| (1.0 / t, tof.ln()))
        .unzip();

    let n_points = x.len();
    if n_points < MIN_ARRHENIUS_POINTS {
        return Err(SensitivityError::InsufficientData {
            required: MIN_ARRHENIUS_POINTS,
            found: n_points,
        });
    }

    let n = n_points as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();
    let syy: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    if sxx <= 0.0 {
        return Err(SensitivityError::InvalidSweep(
            "Arrhenius fit needs at least two distinct temperatures".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_squared = if syy > 0.0 {
        (sxy * sxy) / (sxx * syy)
    } else {
        1.0
    };

    let ea_ev = -slope * K_B_EV_PER_K;

    Ok(ArrheniusFit {
        slope,
        intercept,
        ea_ev,
        ea_kjmol: ea_ev * EV_TO_KJ_PER_MOL,
        n_points,
        r_squared,
    })
}

/// Steady-state TOFs over a temperature series together with their Arrhenius fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusScan {
    pub temperatures: Vec<f64>,
    pub tofs: Vec<f64>,
    pub fit: ArrheniusFit,
}

/// Steady-state TOF at every temperature, all other parameters fixed.
pub fn tofs_over_temperatures(
    params: &ParameterSet,
    temperatures: &[f64],
    setup: &SteadyStateSetup,
) -> Result<Vec<f64>, SensitivityError> {
    temperatures
        .iter()
        .map(|&t| {
            let tof = steady_state_tof(&params.at_temperature(t), setup)?;
            debug!("T = {t} K: TOF = {tof:.6e}");
            Ok(tof)
        })
        .collect()
}

/// Computes the steady-state TOF at each temperature and fits the result.
///
/// # Arguments
///
/// * `params` - Parameter set; its temperature is replaced by each entry of `temperatures`
/// * `temperatures` - Temperatures in K
/// * `setup` - Steady-state integration settings
pub fn arrhenius_scan(
    params: &ParameterSet,
    temperatures: &[f64],
    setup: &SteadyStateSetup,
) -> Result<ArrheniusScan, SensitivityError> {
    let tofs = tofs_over_temperatures(params, temperatures, setup)?;
    let fit = fit_arrhenius(temperatures, &tofs)?;

    info!(
        "Arrhenius fit over {} of {} temperatures: Ea_app = {:.4} eV ({:.2} kJ/mol)",
        fit.n_points,
        temperatures.len(),
        fit.ea_ev,
        fit.ea_kjmol
    );

    Ok(ArrheniusScan {
        temperatures: temperatures.to_vec(),
        tofs,
        fit,
    })
}

/// Apparent activation energy (eV) of a parameter set over a temperature series.
pub fn apparent_activation_energy(
    params: &ParameterSet,
    temperatures: &[f64],
    setup: &SteadyStateSetup,
) -> Result<f64, SensitivityError> {
    Ok(arrhenius_scan(params, temperatures, setup)?.fit.ea_ev)
}
