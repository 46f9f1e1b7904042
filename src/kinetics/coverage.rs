//! Surface coverage state.
//!
//! A [`CoverageState`] holds the fractional occupancies of the three adsorbed
//! species. The vacant-site fraction is derived from the site balance
//! θ* = 1 − θ_CO − θ_O − θ_CO2 and never stored.

use serde::{Deserialize, Serialize};

use crate::constants::VACANCY_TOLERANCE;

use super::error::KineticsError;

/// Fractional surface occupancy by CO*, O* and CO2*.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageState {
    #[serde(rename = "theta_CO")]
    pub co: f64,
    #[serde(rename = "theta_O")]
    pub o: f64,
    #[serde(rename = "theta_CO2")]
    pub co2: f64,
}

impl CoverageState {
    pub fn new(co: f64, o: f64, co2: f64) -> Self {
        Self { co, o, co2 }
    }

    /// The clean surface, θ* = 1.
    pub fn vacant() -> Self {
        Self::default()
    }

    /// Builds a state from the first three entries of a solver state vector.
    ///
    /// Returns `None` if the slice holds fewer than three values.
    pub fn from_slice(y: &[f64]) -> Option<Self> {
        match y {
            [co, o, co2, ..] => Some(Self::new(*co, *o, *co2)),
            _ => None,
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.co, self.o, self.co2]
    }

    /// Unchecked vacant-site fraction from the site balance.
    pub fn vacancy(&self) -> f64 {
        1.0 - (self.co + self.o + self.co2)
    }

    /// Vacant-site fraction as used by the rate law.
    ///
    /// Negative values within [`VACANCY_TOLERANCE`] are rounding noise and are
    /// clamped to zero; anything below that is an unphysical state.
    pub fn checked_vacancy(&self) -> Result<f64, KineticsError> {
        let theta_star = self.vacancy();
        if theta_star < -VACANCY_TOLERANCE || theta_star.is_nan() {
            return Err(KineticsError::UnphysicalCoverage { theta_star });
        }
        Ok(theta_star.max(0.0))
    }

    /// Clamps every coverage into [0, 1].
    pub fn clamped(&self) -> Self {
        Self::new(
            self.co.clamp(0.0, 1.0),
            self.o.clamp(0.0, 1.0),
            self.co2.clamp(0.0, 1.0),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.co.is_finite() && self.o.is_finite() && self.co2.is_finite()
    }
}

impl From<[f64; 3]> for CoverageState {
    fn from(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vacancy_of_clean_surface() {
        assert_eq!(CoverageState::vacant().checked_vacancy().unwrap(), 1.0);
    }

    #[test]
    fn test_noise_within_tolerance_is_clamped() {
        let state = CoverageState::new(0.6, 0.4, 5e-9);
        assert_eq!(state.checked_vacancy().unwrap(), 0.0);
    }

    #[test]
    fn test_overfilled_surface_is_rejected() {
        let state = CoverageState::new(0.6, 0.4, 1e-6);
        assert!(matches!(
            state.checked_vacancy(),
            Err(KineticsError::UnphysicalCoverage { .. })
        ));
    }

    #[test]
    fn test_clamped() {
        let state = CoverageState::new(-1e-12, 1.0 + 1e-12, 0.3).clamped();
        assert_eq!(state.to_array(), [0.0, 1.0, 0.3]);
    }

    #[test]
    fn test_from_short_slice() {
        assert!(CoverageState::from_slice(&[0.1, 0.2]).is_none());
    }
}
