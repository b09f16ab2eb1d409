use crate::core::agent::AgentId;
use crate::core::error::ModelError;
use crate::market::aggregation::market_imbalance;
use crate::market::economy::Economy;
use crate::optimization::agent_solver::AgentSolveError;
use crate::optimization::root_finding::{brent, BrentSettings, RootFindError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquilibriumError {
    #[error(transparent)]
    Domain(#[from] ModelError),

    #[error(
        "market imbalance does not change sign on [{r_min}, {r_max}]: \
         imbalance({r_min}) = {imbalance_min}, imbalance({r_max}) = {imbalance_max}"
    )]
    Bracketing {
        r_min: f64,
        r_max: f64,
        imbalance_min: f64,
        imbalance_max: f64,
    },

    #[error("optimizer failed for agent {agent} at R = {rate}: {source}")]
    AgentFailure {
        agent: AgentId,
        rate: f64,
        #[source]
        source: AgentSolveError,
    },

    #[error("market imbalance is not a number at R = {rate}")]
    NonFiniteImbalance { rate: f64 },

    #[error("equilibrium search did not converge after {iterations} iterations (last R = {last})")]
    NotConverged { iterations: usize, last: f64 },
}

/// A market-clearing interest rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    /// `R* = 1 + r*`.
    pub gross_rate: f64,
    pub net_rate: f64,
    /// Imbalance remaining at `gross_rate`.
    pub imbalance: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub bracket: (f64, f64),
}

impl fmt::Display for Equilibrium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R* = {:.8} (r* = {:.4}%), imbalance {:.3e}, {} iterations on [{}, {}]",
            self.gross_rate,
            self.net_rate * 100.0,
            self.imbalance,
            self.iterations,
            self.bracket.0,
            self.bracket.1
        )
    }
}

/// Finds the gross rate at which national savings equal investment.
///
/// The search is a Brent root find on [`market_imbalance`] over a caller
/// supplied bracket. The imbalance must differ in sign at the two ends;
/// otherwise the search fails with [`EquilibriumError::Bracketing`] rather
/// than extrapolating.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::prelude::*;
/// use std::sync::Arc;
///
/// let utility = Arc::new(LogUtility::new(0.96).unwrap());
/// let saver = Agent::new("saver", utility.clone(), 10.0, 3.0).unwrap();
/// let borrower = Agent::new("borrower", utility, 3.0, 10.0).unwrap();
/// let population = Population::two_type(saver, borrower, 0.5).unwrap();
/// let economy = Economy::new(population, 0.02).unwrap();
///
/// let equilibrium = EquilibriumSolver::default()
///     .find_equilibrium(&economy, 0.8, 1.5)
///     .unwrap();
/// assert!((equilibrium.gross_rate - 1.0625).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EquilibriumSolver {
    settings: BrentSettings,
}

impl EquilibriumSolver {
    pub fn new(settings: BrentSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BrentSettings {
        &self.settings
    }

    pub fn find_equilibrium(
        &self,
        economy: &Economy,
        r_min: f64,
        r_max: f64,
    ) -> Result<Equilibrium, EquilibriumError> {
        validate_bracket(r_min, r_max)?;

        let estimate = brent(
            |rate| market_imbalance(economy, rate),
            r_min,
            r_max,
            &self.settings,
        )
        .map_err(|err| match err {
            RootFindError::NoSignChange {
                f_lower, f_upper, ..
            } => {
                warn!(
                    "no equilibrium bracketed on [{}, {}]: imbalance {:.6e} and {:.6e}",
                    r_min, r_max, f_lower, f_upper
                );
                EquilibriumError::Bracketing {
                    r_min,
                    r_max,
                    imbalance_min: f_lower,
                    imbalance_max: f_upper,
                }
            }
            RootFindError::NotANumber { x } => EquilibriumError::NonFiniteImbalance { rate: x },
            RootFindError::NotConverged { iterations, last } => {
                EquilibriumError::NotConverged { iterations, last }
            }
            RootFindError::Evaluation(source) => source,
        })?;

        let equilibrium = Equilibrium {
            gross_rate: estimate.root,
            net_rate: estimate.root - 1.0,
            imbalance: estimate.value,
            iterations: estimate.iterations,
            evaluations: estimate.evaluations,
            bracket: (r_min, r_max),
        };
        info!("equilibrium found: {}", equilibrium);
        Ok(equilibrium)
    }

    /// Search the economy's default bracket.
    pub fn find_default(&self, economy: &Economy) -> Result<Equilibrium, EquilibriumError> {
        let (r_min, r_max) = economy.default_bracket();
        self.find_equilibrium(economy, r_min, r_max)
    }
}

/// Find the equilibrium gross rate in `[r_min, r_max]` with default solver
/// settings.
pub fn find_equilibrium(
    economy: &Economy,
    r_min: f64,
    r_max: f64,
) -> Result<Equilibrium, EquilibriumError> {
    EquilibriumSolver::default().find_equilibrium(economy, r_min, r_max)
}

fn validate_bracket(r_min: f64, r_max: f64) -> Result<(), ModelError> {
    if r_min.is_finite() && r_max.is_finite() && r_min > 0.0 && r_min < r_max {
        Ok(())
    } else {
        Err(ModelError::InvalidBracket { r_min, r_max })
    }
}
