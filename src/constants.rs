//! Physical constants and numerical defaults shared across the crate.

/// Boltzmann constant in eV/K.
pub const K_B_EV_PER_K: f64 = 8.617333262e-5;

/// Conversion factor from eV (per particle) to kJ/mol.
pub const EV_TO_KJ_PER_MOL: f64 = 96.485;

/// Band within which a negative vacant-site fraction is treated as rounding noise.
pub const VACANCY_TOLERANCE: f64 = 1e-8;

/// Default integration horizon of a steady-state run.
pub const DEFAULT_T_FINAL: f64 = 50.0;

/// Horizon used by the sensitivity analyses when computing steady-state TOFs.
pub const ANALYSIS_T_FINAL: f64 = 80.0;

/// Number of samples stored in a trajectory.
pub const DEFAULT_N_POINTS: usize = 800;

/// Max-norm of the coverage derivatives below which a state counts as steady.
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Default barrier decrement (eV) for degree-of-rate-control finite differences.
pub const DEFAULT_DRC_DELTA: f64 = 0.01;

/// Default barrier increment (eV) for the barrier attribution sweep.
pub const DEFAULT_ATTRIBUTION_DELTA: f64 = 0.05;

/// Minimum number of strictly positive TOF samples needed for an Arrhenius fit.
pub const MIN_ARRHENIUS_POINTS: usize = 3;
