//! Steady-state sweeps over one operating variable.
//!
//! A sweep evaluates the steady state at every value of a grid (TOF vs
//! temperature, coverages vs CO pressure, ...). Each sample is independent. A
//! sample whose steady state cannot be computed is recorded with NaN entries
//! and logged instead of aborting the sweep, so one bad regime does not
//! discard the rest of the grid.

use std::str::FromStr;

use log::warn;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::ErrorClass,
    kinetics::{coverage::CoverageState, error::KineticsError},
    params::{ParameterSet, SweepVariable},
    simulation::{setup::SteadyStateSetup, steady_state::simulate_to_steady_state},
};

/// Linearly spaced values of one sweep variable.
///
/// Parsed from strings of the form `NAME=from:to:n`, e.g. `PCO=0.05:3.0:20`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub variable: SweepVariable,
    pub from: f64,
    pub to: f64,
    pub n: usize,
}

impl SweepRange {
    pub fn new(variable: SweepVariable, from: f64, to: f64, n: usize) -> Self {
        Self {
            variable,
            from,
            to,
            n,
        }
    }

    /// The grid values, endpoints included.
    pub fn values(&self) -> Vec<f64> {
        linspace(self.from, self.to, self.n)
    }
}

impl FromStr for SweepRange {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Example: "PCO=0.05:3.0:20"
        let pattern = Regex::new(r"^(\w+)=([-+0-9.eE]+):([-+0-9.eE]+):(\d+)$")
            .map_err(|e| KineticsError::UnknownParameter(e.to_string()))?;
        let caps = pattern
            .captures(s.trim())
            .ok_or_else(|| KineticsError::UnknownParameter(s.to_string()))?;

        let variable = caps[1].parse::<SweepVariable>()?;
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| KineticsError::UnknownParameter(s.to_string()))
        };
        let from = parse(&caps[2])?;
        let to = parse(&caps[3])?;
        let n = caps[4]
            .parse::<usize>()
            .map_err(|_| KineticsError::UnknownParameter(s.to_string()))?;

        Ok(Self::new(variable, from, to, n))
    }
}

/// `n` evenly spaced values from `from` to `to`, both included.
pub fn linspace(from: f64, to: f64, n: usize) -> Vec<f64> {
    Array1::linspace(from, to, n).to_vec()
}

/// Steady state at one grid value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Value of the swept variable
    pub value: f64,
    pub coverage: CoverageState,
    pub theta_star: f64,
    pub tof: f64,
    pub residual: f64,
    pub converged: bool,
    /// Class of the error that prevented the sample, if any
    pub failure: Option<ErrorClass>,
}

impl SweepPoint {
    fn failed(value: f64, class: ErrorClass) -> Self {
        Self {
            value,
            coverage: CoverageState::new(f64::NAN, f64::NAN, f64::NAN),
            theta_star: f64::NAN,
            tof: f64::NAN,
            residual: f64::NAN,
            converged: false,
            failure: Some(class),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// Steady states of `params` with `variable` set to each of `values`.
pub fn parameter_sweep(
    params: &ParameterSet,
    variable: SweepVariable,
    values: &[f64],
    setup: &SteadyStateSetup,
) -> Vec<SweepPoint> {
    values
        .iter()
        .map(|&value| {
            let sample = params.with_value(variable, value);
            let point = simulate_to_steady_state(&sample, setup).and_then(|run| {
                let tof = run.result.tof(&sample)?;
                Ok(SweepPoint {
                    value,
                    coverage: run.result.coverage,
                    theta_star: run.result.theta_star,
                    tof,
                    residual: run.result.residual,
                    converged: run.result.converged,
                    failure: None,
                })
            });

            point.unwrap_or_else(|err| {
                warn!("Sample {variable} = {value} failed: {err}");
                SweepPoint::failed(value, err.class())
            })
        })
        .collect()
}
