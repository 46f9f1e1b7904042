//! Barrier attribution across operating regimes.
//!
//! At every point of a grid over one operating variable (commonly PCO), the
//! apparent activation energy is fitted once for the unperturbed parameters
//! and once for each barrier raised by Δ. The shift ΔEa_app = Ea_app(perturbed)
//! − Ea_app(baseline) maps which elementary step controls the kinetics in
//! which regime.
//!
//! A grid point whose Arrhenius fit has too few positive TOF samples is
//! recorded as NaN; every other failure aborts the sweep.

use std::collections::BTreeMap;

use derive_builder::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_ATTRIBUTION_DELTA, MIN_ARRHENIUS_POINTS},
    error::ErrorClass,
    params::{Barrier, ParameterSet, SweepVariable},
    simulation::setup::SteadyStateSetup,
};

use super::{arrhenius::apparent_activation_energy, error::SensitivityError};

/// Definition of a barrier attribution sweep.
///
/// # Examples
///
/// ```
/// use surfkin::prelude::*;
///
/// let sweep = AttributionSweepBuilder::default()
///     .grid(vec![0.1, 1.0, 3.0])
///     .temperatures(vec![500.0, 600.0, 700.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(sweep.variable, SweepVariable::Pco);
/// assert_eq!(sweep.barriers, vec![Barrier::E2f, Barrier::E3f, Barrier::E4f]);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct AttributionSweep {
    /// Operating variable spanned by the grid
    #[builder(default = "SweepVariable::Pco")]
    pub variable: SweepVariable,
    /// Values of the operating variable
    pub grid: Vec<f64>,
    /// Temperatures of each Arrhenius fit (K)
    pub temperatures: Vec<f64>,
    /// Barriers to perturb
    #[builder(default = "vec![Barrier::E2f, Barrier::E3f, Barrier::E4f]")]
    pub barriers: Vec<Barrier>,
    /// Barrier increment (eV)
    #[builder(default = "DEFAULT_ATTRIBUTION_DELTA")]
    pub delta: f64,
    /// Steady-state integration settings
    #[builder(default = "SteadyStateSetup::analysis()")]
    pub setup: SteadyStateSetup,
    /// Show a progress bar on stderr
    #[builder(default = "false")]
    #[serde(default)]
    pub progress: bool,
}

impl AttributionSweepBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.variable == Some(SweepVariable::Temperature) {
            return Err("the attribution grid cannot span the temperature".to_string());
        }
        if let Some(temperatures) = &self.temperatures {
            if temperatures.len() < MIN_ARRHENIUS_POINTS {
                return Err(format!(
                    "at least {MIN_ARRHENIUS_POINTS} temperatures are required, got {}",
                    temperatures.len()
                ));
            }
        }
        if let Some(delta) = self.delta {
            if !(delta.is_finite() && delta != 0.0) {
                return Err(format!("delta must be finite and non-zero, got {delta}"));
            }
        }
        Ok(())
    }
}

impl AttributionSweep {
    fn check(&self) -> Result<(), SensitivityError> {
        if self.variable == SweepVariable::Temperature {
            return Err(SensitivityError::InvalidSweep(
                "the attribution grid cannot span the temperature".to_string(),
            ));
        }
        if self.grid.is_empty() {
            return Err(SensitivityError::InvalidSweep("empty grid".to_string()));
        }
        if self.temperatures.len() < MIN_ARRHENIUS_POINTS {
            return Err(SensitivityError::InsufficientData {
                required: MIN_ARRHENIUS_POINTS,
                found: self.temperatures.len(),
            });
        }
        if !(self.delta.is_finite() && self.delta != 0.0) {
            return Err(SensitivityError::InvalidPerturbation(self.delta));
        }
        Ok(())
    }

    /// Runs the sweep around `base`.
    ///
    /// `base` supplies every parameter except the swept variable and the
    /// temperature, which are overridden by the grid and the Arrhenius series.
    pub fn run(&self, base: &ParameterSet) -> Result<AttributionMap, SensitivityError> {
        self.check()?;

        let total = (self.grid.len() * (self.barriers.len() + 1)) as u64;
        let progress = self.progress_bar(total);

        let mut baseline_ea = Vec::with_capacity(self.grid.len());
        let mut shifts: BTreeMap<Barrier, Vec<f64>> = self
            .barriers
            .iter()
            .map(|barrier| (*barrier, Vec::with_capacity(self.grid.len())))
            .collect();

        for &value in &self.grid {
            let params = base.with_value(self.variable, value);
            progress.set_message(format!("{} = {value:.4}", self.variable));

            let ea0 = self.fit_or_nan(&params)?;
            progress.inc(1);
            baseline_ea.push(ea0);

            for (barrier, column) in shifts.iter_mut() {
                let ea = self.fit_or_nan(&params.shifted(*barrier, self.delta))?;
                progress.inc(1);
                column.push(ea - ea0);
            }
        }

        progress.finish_and_clear();
        info!(
            "Barrier attribution over {} values of {} for {} barriers",
            self.grid.len(),
            self.variable,
            shifts.len()
        );

        Ok(AttributionMap {
            variable: self.variable,
            grid: self.grid.clone(),
            delta: self.delta,
            baseline_ea,
            shifts,
        })
    }

    /// Apparent activation energy, or NaN when the fit lacks positive samples.
    fn fit_or_nan(&self, params: &ParameterSet) -> Result<f64, SensitivityError> {
        match apparent_activation_energy(params, &self.temperatures, &self.setup) {
            Ok(ea) => Ok(ea),
            Err(err) if err.class() == ErrorClass::InsufficientData => {
                warn!(
                    "No Arrhenius fit at {} = {}: {err}",
                    self.variable,
                    params.value(self.variable)
                );
                Ok(f64::NAN)
            }
            Err(err) => Err(err),
        }
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} | {elapsed}/{eta} | {msg}")
        {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        pb
    }
}

/// ΔEa_app per barrier and grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionMap {
    pub variable: SweepVariable,
    pub grid: Vec<f64>,
    /// Barrier increment (eV)
    pub delta: f64,
    /// Unperturbed Ea_app (eV) per grid point
    pub baseline_ea: Vec<f64>,
    /// Ea_app(perturbed) − Ea_app(baseline) (eV) per barrier and grid point
    pub shifts: BTreeMap<Barrier, Vec<f64>>,
}

impl AttributionMap {
    pub fn shift(&self, barrier: Barrier, index: usize) -> Option<f64> {
        self.shifts.get(&barrier)?.get(index).copied()
    }

    /// Barrier with the largest |ΔEa_app| at a grid point, ignoring NaN entries.
    pub fn dominant_barrier(&self, index: usize) -> Option<Barrier> {
        self.shifts
            .iter()
            .filter_map(|(barrier, column)| {
                let value = *column.get(index)?;
                (!value.is_nan()).then_some((*barrier, value.abs()))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(barrier, _)| barrier)
    }
}
