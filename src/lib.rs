//! Surface Kinetics Library
//!
//! Mean-field microkinetics of CO oxidation on a single-site catalyst surface:
//! - Arrhenius rate constants and elementary step rates
//! - Coverage ODEs integrated to steady state
//! - Apparent activation energies from Arrhenius plots
//! - Degree of rate control and barrier attribution maps
//! - Parameter sweeps over operating conditions

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::error::*;
    pub use crate::io::*;
    pub use crate::params::*;

    pub use crate::kinetics::coverage::*;
    pub use crate::kinetics::error::*;
    pub use crate::kinetics::rates::*;
    pub use crate::kinetics::system::*;

    pub use crate::simulation::error::*;
    pub use crate::simulation::setup::*;
    pub use crate::simulation::steady_state::*;
    pub use crate::simulation::stiff::*;
    pub use crate::simulation::trajectory::*;

    pub use crate::sensitivity::arrhenius::*;
    pub use crate::sensitivity::attribution::*;
    pub use crate::sensitivity::drc::*;
    pub use crate::sensitivity::error::*;

    pub use crate::sweep::*;
}

/// Physical constants and numerical defaults
pub mod constants;

/// Error classification shared by all modules
pub mod error;

/// Operating conditions and energetics of the reaction network
pub mod params;

/// Rate law and coverage dynamics
pub mod kinetics {
    /// Surface coverages and the vacant-site balance
    pub mod coverage;
    /// Error types for invalid physical input
    pub mod error;
    /// Rate constants and elementary step rates
    pub mod rates;
    /// Coverage ODE system
    pub mod system;
}

/// Time integration of the coverage ODEs to steady state
pub mod simulation {
    pub use crate::simulation::setup::SteadyStateSetup;
    pub use crate::simulation::stiff::{Sdirk4, StiffProblem};
    /// Fixed-step integrators accepted by [`steady_state::simulate_with`]
    pub use peroxide::fuga::{ODEIntegrator, RK4, RK5};

    /// Error types for simulation failures
    pub mod error;
    /// Integration settings
    pub mod setup;
    /// Steady-state driver
    pub mod steady_state;
    /// Adaptive L-stable integrator for stiff systems
    pub mod stiff;
    /// Sampled coverage trajectories
    pub mod trajectory;
}

/// Sensitivity analyses built on steady-state TOFs
pub mod sensitivity {
    pub mod arrhenius;
    pub mod attribution;
    pub mod drc;
    pub mod error;
}

/// Steady-state sweeps over operating conditions
pub mod sweep;

/// IO functionality
pub mod io;

/// Tabular display of results
pub mod info;
