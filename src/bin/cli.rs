//! Command-line interface for the surface kinetics library
//!
//! Runs steady-state simulations and sensitivity analyses of the CO oxidation
//! network from a parameter file (or the baseline parameters) and prints the
//! results as tables.
//!
//! # Usage
//!
//! ```bash
//! # Steady state of the baseline
//! surfkin steady
//!
//! # Apparent activation energy between 500 and 700 K
//! surfkin arrhenius --temperatures 500:700:5 --params params.json
//!
//! # Degree of rate control
//! surfkin drc --delta 0.01 --output drc.json
//!
//! # Barrier attribution over CO pressure
//! surfkin attribution --range PCO=0.05:3:20 --temperatures 400:900:26
//!
//! # Steady states over temperature
//! surfkin sweep --range T=400:900:26
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use surfkin::{
    constants::{ANALYSIS_T_FINAL, DEFAULT_ATTRIBUTION_DELTA, DEFAULT_DRC_DELTA, DEFAULT_T_FINAL},
    info::sweep_table,
    io::{load_parameters, save_json},
    params::{Barrier, ParameterSet, Step, SweepVariable},
    sensitivity::{
        arrhenius::arrhenius_scan, attribution::AttributionSweepBuilder, drc::compute_drc,
    },
    simulation::{setup::SteadyStateSetup, steady_state::simulate_to_steady_state},
    sweep::{parameter_sweep, SweepRange},
};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with the parameter set; missing keys take baseline values
    #[arg(short, long, global = true)]
    params: Option<PathBuf>,

    /// Write the result as JSON to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Integrate the coverages to steady state
    Steady {
        /// Integration horizon
        #[arg(long, default_value_t = DEFAULT_T_FINAL)]
        t_final: f64,
    },
    /// Fit the apparent activation energy over a temperature series
    Arrhenius {
        /// Temperatures as from:to:n
        #[arg(long, default_value = "500:700:5", value_parser = parse_temperatures)]
        temperatures: SweepRange,

        /// Integration horizon
        #[arg(long, default_value_t = ANALYSIS_T_FINAL)]
        t_final: f64,
    },
    /// Degree of rate control of each step's forward barrier
    Drc {
        /// Barrier decrement in eV
        #[arg(long, default_value_t = DEFAULT_DRC_DELTA)]
        delta: f64,

        /// Integration horizon
        #[arg(long, default_value_t = ANALYSIS_T_FINAL)]
        t_final: f64,
    },
    /// Shift of the apparent activation energy per raised barrier
    Attribution {
        /// Grid of the operating variable as NAME=from:to:n
        #[arg(long, default_value = "PCO=0.05:3:20")]
        range: SweepRange,

        /// Temperatures of each Arrhenius fit as from:to:n
        #[arg(long, default_value = "400:900:26", value_parser = parse_temperatures)]
        temperatures: SweepRange,

        /// Barriers to raise
        #[arg(long, value_delimiter = ',', default_value = "E2f,E3f,E4f")]
        barriers: Vec<Barrier>,

        /// Barrier increment in eV
        #[arg(long, default_value_t = DEFAULT_ATTRIBUTION_DELTA)]
        delta: f64,

        /// Integration horizon
        #[arg(long, default_value_t = ANALYSIS_T_FINAL)]
        t_final: f64,
    },
    /// Steady states over a range of one operating variable
    Sweep {
        /// Values as NAME=from:to:n
        #[arg(long)]
        range: SweepRange,

        /// Integration horizon
        #[arg(long, default_value_t = DEFAULT_T_FINAL)]
        t_final: f64,
    },
}

fn parse_temperatures(s: &str) -> Result<SweepRange, String> {
    format!("{}={s}", SweepVariable::Temperature)
        .parse()
        .map_err(|e: surfkin::kinetics::error::KineticsError| e.to_string())
}

/// Main entry point for the CLI application
pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let params = match &cli.params {
        Some(path) => load_parameters(path)?,
        None => ParameterSet::baseline(),
    };
    info!("Parameters:\n{params}");

    match &cli.command {
        Commands::Steady { t_final } => {
            let setup = setup_with(*t_final)?;
            let run = simulate_to_steady_state(&params, &setup)?;
            let rates = run.result.rates(&params)?;

            println!("{}", run.result);
            println!("TOF = {:.6e}", rates.tof());
            for step in Step::ALL {
                println!("r{} ({}) = {:.6e}", step.number(), step, rates.get(step));
            }

            if let Some(path) = &cli.output {
                save_json(path, &run)?;
            }
        }
        Commands::Arrhenius {
            temperatures,
            t_final,
        } => {
            let setup = setup_with(*t_final)?;
            let scan = arrhenius_scan(&params, &temperatures.values(), &setup)?;
            println!("{scan}");

            if let Some(path) = &cli.output {
                save_json(path, &scan)?;
            }
        }
        Commands::Drc { delta, t_final } => {
            let setup = setup_with(*t_final)?;
            let map = compute_drc(&params, &Step::ALL, *delta, &setup)?;
            println!("{map}");

            if let Some(path) = &cli.output {
                save_json(path, &map)?;
            }
        }
        Commands::Attribution {
            range,
            temperatures,
            barriers,
            delta,
            t_final,
        } => {
            let sweep = AttributionSweepBuilder::default()
                .variable(range.variable)
                .grid(range.values())
                .temperatures(temperatures.values())
                .barriers(barriers.clone())
                .delta(*delta)
                .setup(setup_with(*t_final)?)
                .progress(true)
                .build()?;

            let map = sweep.run(&params)?;
            println!("{map}");

            if let Some(path) = &cli.output {
                save_json(path, &map)?;
            }
        }
        Commands::Sweep { range, t_final } => {
            let setup = setup_with(*t_final)?;
            let points = parameter_sweep(&params, range.variable, &range.values(), &setup);
            println!("{}", sweep_table(range.variable, &points));

            if let Some(path) = &cli.output {
                save_json(path, &points)?;
            }
        }
    }

    Ok(())
}

fn setup_with(t_final: f64) -> anyhow::Result<SteadyStateSetup> {
    let setup = SteadyStateSetup::with_t_final(t_final);
    setup.validate()?;
    Ok(setup)
}
