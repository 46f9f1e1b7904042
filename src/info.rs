//! Tabular display of parameter sets and analysis results
//!
//! Implements `Display` for the result types so they can be printed as
//! formatted tables by the command-line interface.

use std::fmt::{self, Display};

use tabled::{builder::Builder, settings::Style};

use crate::{
    params::{Barrier, ParameterSet, SweepVariable},
    sensitivity::{
        arrhenius::{ArrheniusFit, ArrheniusScan},
        attribution::AttributionMap,
        drc::DrcMap,
    },
    simulation::steady_state::SteadyStateResult,
    sweep::SweepPoint,
};

/// Rows of a result table
trait TableRecord {
    fn columns() -> Vec<String>;

    fn to_record(&self) -> Vec<String>;
}

/// Converts a collection of records to a formatted table string
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Two-column key/value table
fn key_value_table(rows: Vec<(String, String)>) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec!["Quantity".to_string(), "Value".to_string()]);
    for (key, value) in rows {
        builder.push_record(vec![key, value]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Fixed-width rendering that keeps NaN entries readable.
fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.6e}")
    }
}

impl Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = vec![
            ("PCO".to_string(), self.pco.to_string()),
            ("PO2".to_string(), self.po2.to_string()),
            ("PCO2".to_string(), self.pco2.to_string()),
            ("T".to_string(), self.t.to_string()),
            ("A".to_string(), self.a.to_string()),
        ];

        for (key, prefactor) in [("A1", self.a1), ("A2", self.a2), ("A3", self.a3), ("A4", self.a4)] {
            if let Some(value) = prefactor {
                rows.push((key.to_string(), value.to_string()));
            }
        }

        rows.extend(
            Barrier::ALL
                .iter()
                .map(|barrier| (barrier.key().to_string(), self.energy(*barrier).to_string())),
        );

        write!(f, "{}", key_value_table(rows))
    }
}

impl Display for SteadyStateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = vec![
            ("θ_CO".to_string(), format!("{:.6}", self.coverage.co)),
            ("θ_O".to_string(), format!("{:.6}", self.coverage.o)),
            ("θ_CO2".to_string(), format!("{:.6}", self.coverage.co2)),
            ("θ*".to_string(), format!("{:.6}", self.theta_star)),
            ("Residual".to_string(), fmt_value(self.residual)),
            ("Horizon".to_string(), self.horizon.to_string()),
            ("Extended".to_string(), self.extended.to_string()),
            ("Converged".to_string(), self.converged.to_string()),
        ];

        write!(f, "{}", key_value_table(rows))
    }
}

impl Display for ArrheniusFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = vec![
            ("Ea_app [eV]".to_string(), format!("{:.4}", self.ea_ev)),
            ("Ea_app [kJ/mol]".to_string(), format!("{:.2}", self.ea_kjmol)),
            ("Slope [K]".to_string(), format!("{:.4}", self.slope)),
            ("Intercept".to_string(), format!("{:.4}", self.intercept)),
            ("R²".to_string(), format!("{:.6}", self.r_squared)),
            ("Points".to_string(), self.n_points.to_string()),
        ];

        write!(f, "{}", key_value_table(rows))
    }
}

impl Display for ArrheniusScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["T [K]", "1000/T [1/K]", "TOF", "ln(TOF)"]);

        for (t, tof) in self.temperatures.iter().zip(self.tofs.iter()) {
            let ln_tof = if *tof > 0.0 { format!("{:.4}", tof.ln()) } else { "-".to_string() };
            builder.push_record(vec![
                t.to_string(),
                format!("{:.4}", 1000.0 / t),
                fmt_value(*tof),
                ln_tof,
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(f, "{table}")?;
        write!(f, "{}", self.fit)
    }
}

impl Display for DrcMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec![
            "Step".to_string(),
            "Barrier".to_string(),
            "DRC".to_string(),
        ]);

        for (step, drc) in self.iter() {
            builder.push_record(vec![
                step.label().to_string(),
                step.forward_barrier().to_string(),
                format!("{drc:+.4}"),
            ]);
        }
        builder.push_record(vec![
            "Sum".to_string(),
            String::new(),
            format!("{:+.4}", self.sum()),
        ]);

        let mut table = builder.build();
        table.with(Style::sharp());

        writeln!(
            f,
            "Baseline TOF = {} at T = {} K (δE = {} eV)",
            fmt_value(self.baseline_tof),
            self.temperature,
            self.delta_e
        )?;
        write!(f, "{table}")
    }
}

impl Display for AttributionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec![self.variable.to_string(), "Ea_app [eV]".to_string()];
        header.extend(self.shifts.keys().map(|barrier| format!("ΔEa ({barrier})")));
        header.push("Dominant".to_string());

        let mut builder = Builder::default();
        builder.push_record(header);

        for (index, value) in self.grid.iter().enumerate() {
            let mut row = vec![
                format!("{value:.4}"),
                format_shift(self.baseline_ea.get(index).copied()),
            ];
            row.extend(
                self.shifts
                    .values()
                    .map(|column| format_shift(column.get(index).copied())),
            );
            row.push(
                self.dominant_barrier(index)
                    .map(|barrier| barrier.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            builder.push_record(row);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(f, "Barrier increment Δ = {} eV", self.delta)?;
        write!(f, "{table}")
    }
}

/// Missing entries of a ragged map render as "-".
fn format_shift(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(value) if value.is_nan() => "NaN".to_string(),
        Some(value) => format!("{value:+.4}"),
    }
}

impl TableRecord for SweepPoint {
    fn columns() -> Vec<String> {
        ["Value", "θ_CO", "θ_O", "θ_CO2", "θ*", "TOF", "Residual", "Status"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn to_record(&self) -> Vec<String> {
        let status = match (self.failure, self.converged) {
            (Some(class), _) => class.to_string(),
            (None, true) => "converged".to_string(),
            (None, false) => "not converged".to_string(),
        };

        vec![
            self.value.to_string(),
            format!("{:.6}", self.coverage.co),
            format!("{:.6}", self.coverage.o),
            format!("{:.6}", self.coverage.co2),
            format!("{:.6}", self.theta_star),
            fmt_value(self.tof),
            fmt_value(self.residual),
            status,
        ]
    }
}

/// Formats the points of a parameter sweep as a table.
pub fn sweep_table(variable: SweepVariable, points: &[SweepPoint]) -> String {
    let table = to_table(points);
    format!("Sweep over {variable}\n{table}")
}
