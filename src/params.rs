//! Physical parameter sets of the CO oxidation model.
//!
//! A [`ParameterSet`] is the only input of the kinetic core besides the
//! coverage state. It is a plain immutable record: analyses derive perturbed
//! copies through [`ParameterSet::with_energy`], [`ParameterSet::shifted`] and
//! [`ParameterSet::with_value`] rather than mutating shared state.
//!
//! The serialized form uses the physical symbols as keys, so a JSON file such as
//!
//! ```json
//! { "PCO": 1.0, "PO2": 0.2, "PCO2": 0.0, "T": 600.0, "A": 1e3,
//!   "E1f": 0.35, "E1r": 0.60, "E2f": 0.55, "E2r": 1.00,
//!   "E3f": 0.70, "E3r": 0.90, "E4f": 0.70, "E4r": 1.20 }
//! ```
//!
//! deserializes directly into a [`ParameterSet`]. Step prefactors `A1`..`A4`
//! are optional and fall back to `A`.

use std::{fmt, str::FromStr};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{constants::K_B_EV_PER_K, kinetics::error::KineticsError};

/// Elementary steps of the mechanism, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    /// CO(g) + * <-> CO*
    CoAdsorption,
    /// O2(g) + 2* <-> 2O*
    O2Dissociation,
    /// CO* + O* <-> CO2* + *
    SurfaceReaction,
    /// CO2* <-> CO2(g) + *
    Co2Desorption,
}

impl Step {
    /// All steps in cycle order.
    pub const ALL: [Step; 4] = [
        Step::CoAdsorption,
        Step::O2Dissociation,
        Step::SurfaceReaction,
        Step::Co2Desorption,
    ];

    /// Human readable name of the step.
    pub fn label(&self) -> &'static str {
        match self {
            Step::CoAdsorption => "CO adsorption",
            Step::O2Dissociation => "O2 dissociation",
            Step::SurfaceReaction => "Surface reaction",
            Step::Co2Desorption => "CO2 desorption",
        }
    }

    /// One-based step number as used in the parameter names (`E1f`, `A1`, ...).
    pub fn number(&self) -> usize {
        match self {
            Step::CoAdsorption => 1,
            Step::O2Dissociation => 2,
            Step::SurfaceReaction => 3,
            Step::Co2Desorption => 4,
        }
    }

    pub fn forward_barrier(&self) -> Barrier {
        match self {
            Step::CoAdsorption => Barrier::E1f,
            Step::O2Dissociation => Barrier::E2f,
            Step::SurfaceReaction => Barrier::E3f,
            Step::Co2Desorption => Barrier::E4f,
        }
    }

    pub fn reverse_barrier(&self) -> Barrier {
        match self {
            Step::CoAdsorption => Barrier::E1r,
            Step::O2Dissociation => Barrier::E2r,
            Step::SurfaceReaction => Barrier::E3r,
            Step::Co2Desorption => Barrier::E4r,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Activation energy of one half-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Barrier {
    E1f,
    E1r,
    E2f,
    E2r,
    E3f,
    E3r,
    E4f,
    E4r,
}

impl Barrier {
    pub const ALL: [Barrier; 8] = [
        Barrier::E1f,
        Barrier::E1r,
        Barrier::E2f,
        Barrier::E2r,
        Barrier::E3f,
        Barrier::E3r,
        Barrier::E4f,
        Barrier::E4r,
    ];

    /// Parameter key of the barrier, e.g. `"E2f"`.
    pub fn key(&self) -> &'static str {
        match self {
            Barrier::E1f => "E1f",
            Barrier::E1r => "E1r",
            Barrier::E2f => "E2f",
            Barrier::E2r => "E2r",
            Barrier::E3f => "E3f",
            Barrier::E3r => "E3r",
            Barrier::E4f => "E4f",
            Barrier::E4r => "E4r",
        }
    }

    /// The elementary step this barrier belongs to.
    pub fn step(&self) -> Step {
        match self {
            Barrier::E1f | Barrier::E1r => Step::CoAdsorption,
            Barrier::E2f | Barrier::E2r => Step::O2Dissociation,
            Barrier::E3f | Barrier::E3r => Step::SurfaceReaction,
            Barrier::E4f | Barrier::E4r => Step::Co2Desorption,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            Barrier::E1f | Barrier::E2f | Barrier::E3f | Barrier::E4f
        )
    }
}

impl fmt::Display for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Barrier {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Barrier::ALL
            .iter()
            .find(|barrier| barrier.key().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| KineticsError::UnknownParameter(s.to_string()))
    }
}

/// Scalar parameters that can be swept over a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepVariable {
    Pco,
    Po2,
    Pco2,
    Temperature,
    Prefactor,
}

impl SweepVariable {
    /// Parameter key of the variable, e.g. `"PCO"`.
    pub fn key(&self) -> &'static str {
        match self {
            SweepVariable::Pco => "PCO",
            SweepVariable::Po2 => "PO2",
            SweepVariable::Pco2 => "PCO2",
            SweepVariable::Temperature => "T",
            SweepVariable::Prefactor => "A",
        }
    }
}

impl fmt::Display for SweepVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for SweepVariable {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PCO" => Ok(SweepVariable::Pco),
            "PO2" => Ok(SweepVariable::Po2),
            "PCO2" => Ok(SweepVariable::Pco2),
            "T" => Ok(SweepVariable::Temperature),
            "A" => Ok(SweepVariable::Prefactor),
            _ => Err(KineticsError::UnknownParameter(s.to_string())),
        }
    }
}

/// Operating conditions and energetics of one model evaluation.
///
/// # Fields
///
/// * `pco`, `po2`, `pco2` - Partial pressures (same units as the prefactors assume)
/// * `t` - Temperature in K
/// * `a` - Default pre-exponential factor
/// * `a1`..`a4` - Optional per-step prefactors overriding `a`
/// * `e1f`..`e4r` - Forward/reverse activation energies in eV
///
/// # Examples
///
/// ```
/// use surfkin::prelude::ParameterSetBuilder;
///
/// let params = ParameterSetBuilder::default()
///     .t(650.0)
///     .pco(0.5)
///     .a2(5e2)
///     .build()
///     .unwrap();
///
/// assert_eq!(params.t, 650.0);
/// assert_eq!(params.a2, Some(5e2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct ParameterSet {
    #[serde(rename = "PCO")]
    #[builder(default = "1.0")]
    pub pco: f64,
    #[serde(rename = "PO2")]
    #[builder(default = "0.2")]
    pub po2: f64,
    #[serde(rename = "PCO2")]
    #[builder(default = "0.0")]
    pub pco2: f64,
    #[serde(rename = "T")]
    #[builder(default = "600.0")]
    pub t: f64,
    #[serde(rename = "A")]
    #[builder(default = "1e3")]
    pub a: f64,

    #[serde(rename = "A1", default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub a1: Option<f64>,
    #[serde(rename = "A2", default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub a2: Option<f64>,
    #[serde(rename = "A3", default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub a3: Option<f64>,
    #[serde(rename = "A4", default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub a4: Option<f64>,

    #[serde(rename = "E1f")]
    #[builder(default = "0.35")]
    pub e1f: f64,
    #[serde(rename = "E1r")]
    #[builder(default = "0.60")]
    pub e1r: f64,
    #[serde(rename = "E2f")]
    #[builder(default = "0.55")]
    pub e2f: f64,
    #[serde(rename = "E2r")]
    #[builder(default = "1.00")]
    pub e2r: f64,
    #[serde(rename = "E3f")]
    #[builder(default = "0.70")]
    pub e3f: f64,
    #[serde(rename = "E3r")]
    #[builder(default = "0.90")]
    pub e3r: f64,
    #[serde(rename = "E4f")]
    #[builder(default = "0.70")]
    pub e4f: f64,
    #[serde(rename = "E4r")]
    #[builder(default = "1.20")]
    pub e4r: f64,
}

impl ParameterSetBuilder {
    fn validate(&self) -> Result<(), String> {
        let candidate = ParameterSet {
            pco: self.pco.unwrap_or(1.0),
            po2: self.po2.unwrap_or(0.2),
            pco2: self.pco2.unwrap_or(0.0),
            t: self.t.unwrap_or(600.0),
            a: self.a.unwrap_or(1e3),
            a1: self.a1.flatten(),
            a2: self.a2.flatten(),
            a3: self.a3.flatten(),
            a4: self.a4.flatten(),
            e1f: self.e1f.unwrap_or(0.35),
            e1r: self.e1r.unwrap_or(0.60),
            e2f: self.e2f.unwrap_or(0.55),
            e2r: self.e2r.unwrap_or(1.00),
            e3f: self.e3f.unwrap_or(0.70),
            e3r: self.e3r.unwrap_or(0.90),
            e4f: self.e4f.unwrap_or(0.70),
            e4r: self.e4r.unwrap_or(1.20),
        };
        candidate.validate().map_err(|e| e.to_string())
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ParameterSet {
    /// The reference operating point used throughout the analyses.
    pub fn baseline() -> Self {
        Self {
            pco: 1.0,
            po2: 0.2,
            pco2: 0.0,
            t: 600.0,
            a: 1e3,
            a1: None,
            a2: None,
            a3: None,
            a4: None,
            e1f: 0.35,
            e1r: 0.60,
            e2f: 0.55,
            e2r: 1.00,
            e3f: 0.70,
            e3r: 0.90,
            e4f: 0.70,
            e4r: 1.20,
        }
    }

    /// Checks the physical admissibility of every field.
    ///
    /// Pressures must be finite and non-negative, the temperature and all
    /// prefactors finite and strictly positive, and the energies finite.
    pub fn validate(&self) -> Result<(), KineticsError> {
        if !(self.t > 0.0 && self.t.is_finite()) {
            return Err(KineticsError::NonPositiveTemperature(self.t));
        }

        for (name, pressure) in [("PCO", self.pco), ("PO2", self.po2), ("PCO2", self.pco2)] {
            if !(pressure >= 0.0 && pressure.is_finite()) {
                return Err(KineticsError::InvalidParameter {
                    name: name.to_string(),
                    value: pressure,
                    reason: "partial pressures must be finite and >= 0".to_string(),
                });
            }
        }

        for (name, prefactor) in [
            ("A", Some(self.a)),
            ("A1", self.a1),
            ("A2", self.a2),
            ("A3", self.a3),
            ("A4", self.a4),
        ] {
            if let Some(value) = prefactor {
                if !(value > 0.0 && value.is_finite()) {
                    return Err(KineticsError::InvalidParameter {
                        name: name.to_string(),
                        value,
                        reason: "prefactors must be finite and > 0".to_string(),
                    });
                }
            }
        }

        for barrier in Barrier::ALL {
            let value = self.energy(barrier);
            if !value.is_finite() {
                return Err(KineticsError::InvalidParameter {
                    name: barrier.key().to_string(),
                    value,
                    reason: "activation energies must be finite".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Activation energy (eV) of the given half-step.
    pub fn energy(&self, barrier: Barrier) -> f64 {
        match barrier {
            Barrier::E1f => self.e1f,
            Barrier::E1r => self.e1r,
            Barrier::E2f => self.e2f,
            Barrier::E2r => self.e2r,
            Barrier::E3f => self.e3f,
            Barrier::E3r => self.e3r,
            Barrier::E4f => self.e4f,
            Barrier::E4r => self.e4r,
        }
    }

    /// Returns a copy with one activation energy replaced.
    pub fn with_energy(&self, barrier: Barrier, value: f64) -> Self {
        let mut params = *self;
        let slot = match barrier {
            Barrier::E1f => &mut params.e1f,
            Barrier::E1r => &mut params.e1r,
            Barrier::E2f => &mut params.e2f,
            Barrier::E2r => &mut params.e2r,
            Barrier::E3f => &mut params.e3f,
            Barrier::E3r => &mut params.e3r,
            Barrier::E4f => &mut params.e4f,
            Barrier::E4r => &mut params.e4r,
        };
        *slot = value;
        params
    }

    /// Returns a copy with one activation energy shifted by `delta` eV.
    pub fn shifted(&self, barrier: Barrier, delta: f64) -> Self {
        self.with_energy(barrier, self.energy(barrier) + delta)
    }

    /// Prefactor of a step: the step-specific override if present, else `A`.
    pub fn prefactor(&self, step: Step) -> f64 {
        let overridden = match step {
            Step::CoAdsorption => self.a1,
            Step::O2Dissociation => self.a2,
            Step::SurfaceReaction => self.a3,
            Step::Co2Desorption => self.a4,
        };
        overridden.unwrap_or(self.a)
    }

    /// Current value of a sweepable parameter.
    pub fn value(&self, variable: SweepVariable) -> f64 {
        match variable {
            SweepVariable::Pco => self.pco,
            SweepVariable::Po2 => self.po2,
            SweepVariable::Pco2 => self.pco2,
            SweepVariable::Temperature => self.t,
            SweepVariable::Prefactor => self.a,
        }
    }

    /// Returns a copy with a sweepable parameter replaced.
    pub fn with_value(&self, variable: SweepVariable, value: f64) -> Self {
        let mut params = *self;
        match variable {
            SweepVariable::Pco => params.pco = value,
            SweepVariable::Po2 => params.po2 = value,
            SweepVariable::Pco2 => params.pco2 = value,
            SweepVariable::Temperature => params.t = value,
            SweepVariable::Prefactor => params.a = value,
        }
        params
    }

    /// Returns a copy at another temperature.
    pub fn at_temperature(&self, t: f64) -> Self {
        self.with_value(SweepVariable::Temperature, t)
    }

    /// Thermal energy k_B*T in eV.
    pub fn thermal_energy(&self) -> f64 {
        K_B_EV_PER_K * self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefactor_override_resolution() {
        let params = ParameterSet {
            a3: Some(42.0),
            ..ParameterSet::baseline()
        };

        assert_eq!(params.prefactor(Step::CoAdsorption), 1e3);
        assert_eq!(params.prefactor(Step::SurfaceReaction), 42.0);
    }

    #[test]
    fn test_shifted_changes_only_one_barrier() {
        let base = ParameterSet::baseline();
        let shifted = base.shifted(Barrier::E2f, 0.05);

        for barrier in Barrier::ALL {
            if barrier == Barrier::E2f {
                assert!((shifted.energy(barrier) - 0.60).abs() < 1e-12);
            } else {
                assert_eq!(shifted.energy(barrier), base.energy(barrier));
            }
        }
    }

    #[test]
    fn test_builder_rejects_zero_temperature() {
        let result = ParameterSetBuilder::default().t(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_negative_pressure() {
        let result = ParameterSetBuilder::default().po2(-0.1).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults_to_baseline() {
        let params = ParameterSetBuilder::default().build().unwrap();
        assert_eq!(params, ParameterSet::baseline());
    }

    #[test]
    fn test_barrier_parse() {
        assert_eq!("E2f".parse::<Barrier>().unwrap(), Barrier::E2f);
        assert_eq!("e4r".parse::<Barrier>().unwrap(), Barrier::E4r);
        assert!("E5f".parse::<Barrier>().is_err());
    }

    #[test]
    fn test_sweep_variable_roundtrip() {
        let params = ParameterSet::baseline().with_value(SweepVariable::Pco, 2.5);
        assert_eq!(params.value(SweepVariable::Pco), 2.5);
        assert_eq!("pco".parse::<SweepVariable>().unwrap(), SweepVariable::Pco);
    }

    #[test]
    fn test_json_keys_use_physical_symbols() {
        let json = serde_json::to_value(ParameterSet::baseline()).unwrap();
        assert_eq!(json["PCO"], 1.0);
        assert_eq!(json["E3r"], 0.9);
        assert!(json.get("A1").is_none());
    }
}
