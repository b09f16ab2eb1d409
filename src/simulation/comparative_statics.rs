//! Comparative statics: how the equilibrium rate moves with one parameter.
//!
//! Each sweep point starts from a fresh copy of the base config, sets the
//! parameter, builds the economy and solves it. A point that fails (invalid
//! parameter value, no sign change on the bracket, failed agent) is kept in
//! the report with the reason instead of aborting the sweep.

use crate::config::{ConfigError, FirmConfig, ModelConfig};
use crate::market::equilibrium::{Equilibrium, EquilibriumError, EquilibriumSolver};
use crate::parallel::map_slice;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter {parameter} needs a '{section}' section in the model config")]
    MissingSection {
        parameter: Parameter,
        section: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
}

/// A scalar model parameter that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Beta,
    Sigma,
    Phi,
    #[serde(rename = "g")]
    Growth,
    TaxRateYoung,
    TaxRateOld,
    GovernmentConsumption,
    TransferPayment,
    Tfp,
    CapitalShare,
    Depreciation,
}

impl Parameter {
    pub const ALL: [Parameter; 11] = [
        Parameter::Beta,
        Parameter::Sigma,
        Parameter::Phi,
        Parameter::Growth,
        Parameter::TaxRateYoung,
        Parameter::TaxRateOld,
        Parameter::GovernmentConsumption,
        Parameter::TransferPayment,
        Parameter::Tfp,
        Parameter::CapitalShare,
        Parameter::Depreciation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Beta => "beta",
            Parameter::Sigma => "sigma",
            Parameter::Phi => "phi",
            Parameter::Growth => "g",
            Parameter::TaxRateYoung => "tax_rate_young",
            Parameter::TaxRateOld => "tax_rate_old",
            Parameter::GovernmentConsumption => "government_consumption",
            Parameter::TransferPayment => "transfer_payment",
            Parameter::Tfp => "tfp",
            Parameter::CapitalShare => "capital_share",
            Parameter::Depreciation => "depreciation",
        }
    }

    /// Set this parameter on `config`.
    ///
    /// Fiscal parameters create a neutral government section when the
    /// config has none; firm parameters require an existing firm section.
    pub fn apply(&self, config: &mut ModelConfig, value: f64) -> Result<(), SweepError> {
        match self {
            Parameter::Beta => config.beta = value,
            Parameter::Sigma => config.sigma = Some(value),
            Parameter::Phi => config.phi = value,
            Parameter::Growth => config.g = value,
            Parameter::TaxRateYoung => {
                config.government.get_or_insert_with(Default::default).tax_rate_young = value
            }
            Parameter::TaxRateOld => {
                config.government.get_or_insert_with(Default::default).tax_rate_old = value
            }
            Parameter::GovernmentConsumption => {
                config
                    .government
                    .get_or_insert_with(Default::default)
                    .government_consumption = value
            }
            Parameter::TransferPayment => {
                config
                    .government
                    .get_or_insert_with(Default::default)
                    .transfer_payment = value
            }
            Parameter::Tfp => self.firm(config)?.tfp = value,
            Parameter::CapitalShare => self.firm(config)?.alpha = value,
            Parameter::Depreciation => self.firm(config)?.delta = value,
        }
        Ok(())
    }

    fn firm<'a>(
        &self,
        config: &'a mut ModelConfig,
    ) -> Result<&'a mut FirmConfig, SweepError> {
        config.firm.as_mut().ok_or(SweepError::MissingSection {
            parameter: *self,
            section: "firm",
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => return Ok(Parameter::Tfp),
            "alpha" => return Ok(Parameter::CapitalShare),
            "delta" => return Ok(Parameter::Depreciation),
            "G" => return Ok(Parameter::GovernmentConsumption),
            _ => {}
        }
        Parameter::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SweepError::UnknownParameter(s.to_string()))
    }
}

/// One solved (or failed) point of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    /// Equilibrium gross rate; `None` when the point failed.
    pub r_star: Option<f64>,
    pub imbalance: Option<f64>,
    pub iterations: Option<usize>,
    pub failure: Option<String>,
}

impl SweepPoint {
    fn solved(value: f64, equilibrium: &Equilibrium) -> Self {
        Self {
            value,
            r_star: Some(equilibrium.gross_rate),
            imbalance: Some(equilibrium.imbalance),
            iterations: Some(equilibrium.iterations),
            failure: None,
        }
    }

    fn failed(value: f64, err: &SweepError) -> Self {
        Self {
            value,
            r_star: None,
            imbalance: None,
            iterations: None,
            failure: Some(err.to_string()),
        }
    }

    pub fn net_rate(&self) -> Option<f64> {
        self.r_star.map(|r| r - 1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub parameter: Parameter,
    pub generated_at: DateTime<Utc>,
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn solved_count(&self) -> usize {
        self.points.iter().filter(|p| p.r_star.is_some()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SweepPoint> {
        self.points.iter().filter(|p| p.r_star.is_none())
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Comparative statics over {} ({} points, {} solved, generated {})",
            self.parameter,
            self.points.len(),
            self.solved_count(),
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "{:>14}  {:>14}  {:>10}  {:>12}",
            self.parameter.name(),
            "R*",
            "r* (%)",
            "imbalance"
        )?;
        for point in &self.points {
            match (point.r_star, point.imbalance) {
                (Some(r_star), Some(imbalance)) => writeln!(
                    f,
                    "{:>14.6}  {:>14.8}  {:>10.4}  {:>12.3e}",
                    point.value,
                    r_star,
                    (r_star - 1.0) * 100.0,
                    imbalance
                )?,
                _ => writeln!(
                    f,
                    "{:>14.6}  failed: {}",
                    point.value,
                    point.failure.as_deref().unwrap_or("unknown")
                )?,
            }
        }
        Ok(())
    }
}

/// Runs one-parameter sweeps around a base configuration.
#[derive(Debug, Clone)]
pub struct ComparativeStatics {
    base: ModelConfig,
    solver: EquilibriumSolver,
}

impl ComparativeStatics {
    pub fn new(base: ModelConfig) -> Self {
        Self {
            base,
            solver: EquilibriumSolver::default(),
        }
    }

    pub fn with_solver(mut self, solver: EquilibriumSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn base(&self) -> &ModelConfig {
        &self.base
    }

    /// Solve the economy at every value of `parameter`, in order.
    pub fn run(&self, parameter: Parameter, values: &[f64]) -> SweepReport {
        info!("sweeping {} over {} values", parameter, values.len());

        let points = map_slice(values, |&value| match self.solve_point(parameter, value) {
            Ok(equilibrium) => SweepPoint::solved(value, &equilibrium),
            Err(err) => {
                warn!("sweep point {} = {} failed: {}", parameter, value, err);
                SweepPoint::failed(value, &err)
            }
        });

        let report = SweepReport {
            parameter,
            generated_at: Utc::now(),
            points,
        };
        info!(
            "sweep over {} complete: {}/{} points solved",
            parameter,
            report.solved_count(),
            report.points.len()
        );
        report
    }

    /// Solve the base economy with `parameter` set to `value`.
    pub fn solve_point(&self, parameter: Parameter, value: f64) -> Result<Equilibrium, SweepError> {
        let mut config = self.base.clone();
        parameter.apply(&mut config, value)?;
        let economy = config.build_economy()?;
        let (r_min, r_max) = config.bracket();
        Ok(self.solver.find_equilibrium(&economy, r_min, r_max)?)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
