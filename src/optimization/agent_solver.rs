//! The household problem: choose young and old consumption to maximize
//! lifetime utility subject to the present-value budget constraint
//!
//! ```text
//! net_young + net_old / R = c_young + c_old / R
//! ```
//!
//! The search runs on the budget line itself, parameterized by savings
//! `s`: `c_young = net_young - s`, `c_old = net_old + R * s`. The
//! constraint therefore holds by construction and the problem reduces to
//! finding a zero of the objective's gradient along the line, which is
//! estimated by central finite differences.

use crate::core::agent::Agent;
use crate::core::error::{validate_gross_rate, validate_growth_rate, ModelError};
use crate::optimization::root_finding::{brent, BrentSettings, RootFindError};
use crate::sector::fiscal::FiscalPolicy;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numerical settings of the per-agent optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Finite-difference step, relative to the smaller of the two
    /// consumption levels (old consumption measured in young-period units).
    pub finite_difference_step: f64,
    /// Halvings of the distance to the boundary tried while looking for a
    /// sign change of the gradient. Past roughly 30 halvings the finite
    /// differences fall below roundoff for utilities without an Inada
    /// condition.
    pub max_bracket_steps: usize,
    /// Stopping rule of the root search on the gradient.
    pub root: BrentSettings,
    /// Budget residual allowed, relative to `1 + lifetime wealth`.
    pub budget_tolerance: f64,
    /// Largest accepted `|dU/ds| / (|U_young| + R |U_old|)` at the optimum.
    pub stationarity_tolerance: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            finite_difference_step: 1e-5,
            max_bracket_steps: 24,
            root: BrentSettings {
                xtol: 1e-12,
                ..BrentSettings::default()
            },
            budget_tolerance: 1e-9,
            stationarity_tolerance: 1e-6,
        }
    }
}

/// Consumption corner the optimizer was pushed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    Young,
    Old,
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corner::Young => write!(f, "young"),
            Corner::Old => write!(f, "old"),
        }
    }
}

/// Failure of the per-agent optimization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentSolveError {
    #[error(transparent)]
    Domain(#[from] ModelError),

    #[error("no interior optimum at R = {rate}: utility keeps rising as {corner} consumption goes to zero")]
    NoInteriorOptimum { rate: f64, corner: Corner },

    #[error("utility gradient is not finite at c_young = {c_young}, c_old = {c_old}")]
    NonFiniteObjective { c_young: f64, c_old: f64 },

    #[error("optimizer did not converge: {reason}")]
    NotConverged { reason: String },

    #[error("budget constraint violated by {residual}")]
    BudgetViolation { residual: f64 },

    #[error("first-order condition not met: relative gradient {relative_gradient}")]
    NotStationary { relative_gradient: f64 },
}

/// An agent's optimal plan at given prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub c_young: f64,
    pub c_old: f64,
    /// After-tax young income minus young consumption.
    pub savings: f64,
    pub utility: f64,
    /// After-tax young income.
    pub net_young: f64,
    /// After-tax old income plus transfer, scaled by growth.
    pub net_old: f64,
    pub iterations: usize,
}

impl AgentDecision {
    /// `net_young + net_old / R - c_young - c_old / R`.
    pub fn budget_residual(&self, gross_rate: f64) -> f64 {
        self.net_young + self.net_old / gross_rate - self.c_young - self.c_old / gross_rate
    }
}

/// Solves household problems with fixed numerical settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentSolver {
    settings: OptimizerSettings,
}

impl AgentSolver {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Solve `agent`'s problem at gross rate `R` with endowment growth `g`.
    pub fn solve(
        &self,
        agent: &Agent,
        gross_rate: f64,
        growth: f64,
        fiscal: &FiscalPolicy,
    ) -> Result<AgentDecision, AgentSolveError> {
        validate_gross_rate(gross_rate)?;
        validate_growth_rate(growth)?;

        let line = BudgetLine {
            agent,
            net_young: fiscal.net_young(agent.endowment_young()),
            net_old: fiscal.net_old(agent.endowment_old()) * (1.0 + growth),
            rate: gross_rate,
            step: self.settings.finite_difference_step,
        };

        let (savings, iterations) = self.optimize(&line)?;
        let decision = self.verify(&line, savings, iterations)?;
        debug!(
            "agent {} at R={:.6}: c_young={:.6} c_old={:.6} savings={:.6} ({} iterations)",
            agent.id(),
            gross_rate,
            decision.c_young,
            decision.c_old,
            decision.savings,
            decision.iterations
        );
        Ok(decision)
    }

    /// Locate the zero of the gradient along the budget line.
    ///
    /// Starts where half of young disposable income is consumed, then walks
    /// uphill, halving the distance to the boundary each step, until the
    /// gradient changes sign.
    fn optimize(&self, line: &BudgetLine<'_>) -> Result<(f64, usize), AgentSolveError> {
        let seed = 0.5 * line.net_young;
        let seed_gradient = line.gradient(seed)?;
        if seed_gradient == 0.0 {
            return Ok((seed, 0));
        }

        let (boundary, corner) = if seed_gradient > 0.0 {
            (line.net_young, Corner::Young)
        } else {
            (-line.net_old / line.rate, Corner::Old)
        };

        let mut inner = seed;
        let mut inner_gradient = seed_gradient;
        let mut bracket = None;
        let mut steps = 0;
        while steps < self.settings.max_bracket_steps {
            steps += 1;
            let probe = inner + 0.5 * (boundary - inner);
            if probe == inner || probe == boundary {
                break;
            }
            let probe_gradient = line.gradient(probe)?;
            if probe_gradient == 0.0 {
                return Ok((probe, steps));
            }
            if probe_gradient.signum() != inner_gradient.signum() {
                bracket = Some((inner, probe));
                break;
            }
            inner = probe;
            inner_gradient = probe_gradient;
        }

        let (lower, upper) = bracket.ok_or(AgentSolveError::NoInteriorOptimum {
            rate: line.rate,
            corner,
        })?;

        let estimate = brent(|s| line.gradient(s), lower, upper, &self.settings.root).map_err(
            |err| match err {
                RootFindError::Evaluation(source) => source,
                other => AgentSolveError::NotConverged {
                    reason: other.to_string(),
                },
            },
        )?;
        Ok((estimate.root, steps + estimate.iterations))
    }

    fn verify(
        &self,
        line: &BudgetLine<'_>,
        savings: f64,
        iterations: usize,
    ) -> Result<AgentDecision, AgentSolveError> {
        let (c_young, c_old) = line.consumption(savings);
        let utility = line.agent.evaluate(c_young, c_old);
        if !(c_young > 0.0 && c_old > 0.0 && utility.is_finite()) {
            return Err(AgentSolveError::NonFiniteObjective { c_young, c_old });
        }

        let decision = AgentDecision {
            c_young,
            c_old,
            savings: line.net_young - c_young,
            utility,
            net_young: line.net_young,
            net_old: line.net_old,
            iterations,
        };

        let wealth = line.net_young + line.net_old / line.rate;
        let residual = decision.budget_residual(line.rate);
        if residual.abs() > self.settings.budget_tolerance * (1.0 + wealth) {
            return Err(AgentSolveError::BudgetViolation { residual });
        }

        let relative_gradient = line.relative_gradient(savings)?;
        if relative_gradient > self.settings.stationarity_tolerance {
            return Err(AgentSolveError::NotStationary { relative_gradient });
        }

        Ok(decision)
    }
}

/// Solve one household problem with default optimizer settings.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::core::agent::Agent;
/// use olg_equilibrium::core::utility::LogUtility;
/// use olg_equilibrium::optimization::agent_solver::solve_agent;
/// use olg_equilibrium::sector::fiscal::FiscalPolicy;
/// use std::sync::Arc;
///
/// let saver = Agent::new("saver", Arc::new(LogUtility::new(0.96).unwrap()), 10.0, 3.0).unwrap();
/// let decision = solve_agent(&saver, 1.05, 0.02, &FiscalPolicy::default()).unwrap();
/// assert!(decision.savings > 0.0);
/// assert!(decision.budget_residual(1.05).abs() < 1e-9);
/// ```
pub fn solve_agent(
    agent: &Agent,
    gross_rate: f64,
    growth: f64,
    fiscal: &FiscalPolicy,
) -> Result<AgentDecision, AgentSolveError> {
    AgentSolver::default().solve(agent, gross_rate, growth, fiscal)
}

struct BudgetLine<'a> {
    agent: &'a Agent,
    net_young: f64,
    net_old: f64,
    rate: f64,
    step: f64,
}

impl BudgetLine<'_> {
    fn consumption(&self, savings: f64) -> (f64, f64) {
        (self.net_young - savings, self.net_old + self.rate * savings)
    }

    /// Finite-difference step at a point, small enough that both
    /// consumption levels stay positive.
    fn step_at(&self, c_young: f64, c_old: f64) -> Result<f64, AgentSolveError> {
        if !(c_young > 0.0 && c_old > 0.0) {
            return Err(AgentSolveError::NonFiniteObjective { c_young, c_old });
        }
        Ok(self.step * c_young.min(c_old / self.rate))
    }

    /// dU/ds along the budget line.
    fn gradient(&self, savings: f64) -> Result<f64, AgentSolveError> {
        let (c_young, c_old) = self.consumption(savings);
        let h = self.step_at(c_young, c_old)?;
        let more = self
            .agent
            .evaluate(c_young - h, c_old + self.rate * h);
        let less = self
            .agent
            .evaluate(c_young + h, c_old - self.rate * h);
        let gradient = (more - less) / (2.0 * h);
        if !gradient.is_finite() {
            return Err(AgentSolveError::NonFiniteObjective { c_young, c_old });
        }
        Ok(gradient)
    }

    /// |dU/ds| relative to the size of the marginal utilities it balances.
    fn relative_gradient(&self, savings: f64) -> Result<f64, AgentSolveError> {
        let (c_young, c_old) = self.consumption(savings);
        let h = self.step_at(c_young, c_old)?;
        let young = (self.agent.evaluate(c_young + h, c_old)
            - self.agent.evaluate(c_young - h, c_old))
            / (2.0 * h);
        let old = (self.agent.evaluate(c_young, c_old + self.rate * h)
            - self.agent.evaluate(c_young, c_old - self.rate * h))
            / (2.0 * h);
        let scale = young.abs() + old.abs();
        if !scale.is_finite() || scale == 0.0 {
            return Err(AgentSolveError::NonFiniteObjective { c_young, c_old });
        }
        Ok((old - young).abs() / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utility::{CrraUtility, LogUtility, UtilityFunction};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    const BETA: f64 = 0.96;

    fn log_agent(young: f64, old: f64) -> Agent {
        Agent::new("agent", Arc::new(LogUtility::new(BETA).unwrap()), young, old).unwrap()
    }

    /// Closed form for log utility: c_young = W / (1 + beta).
    fn log_closed_form(net_young: f64, net_old: f64, rate: f64) -> (f64, f64) {
        let wealth = net_young + net_old / rate;
        let c_young = wealth / (1.0 + BETA);
        (c_young, BETA * rate * c_young)
    }

    #[test]
    fn test_log_utility_matches_closed_form() {
        let agent = log_agent(10.0, 3.0);
        for rate in [0.8, 1.0, 1.05, 1.5, 3.0] {
            let decision = solve_agent(&agent, rate, 0.02, &FiscalPolicy::default()).unwrap();
            let (c_young, c_old) = log_closed_form(10.0, 3.0 * 1.02, rate);
            assert_relative_eq!(decision.c_young, c_young, max_relative = 1e-7);
            assert_relative_eq!(decision.c_old, c_old, max_relative = 1e-7);
            assert_relative_eq!(decision.savings, 10.0 - decision.c_young);
        }
    }

    #[test]
    fn test_borrower_has_negative_savings() {
        let decision =
            solve_agent(&log_agent(3.0, 10.0), 1.05, 0.02, &FiscalPolicy::default()).unwrap();
        assert!(decision.savings < 0.0);
        assert!(decision.c_young > 3.0);
    }

    #[test]
    fn test_crra_euler_equation() {
        for sigma in [0.5, 2.0, 4.0] {
            let utility: Arc<dyn UtilityFunction> = Arc::new(CrraUtility::new(BETA, sigma).unwrap());
            let agent = Agent::new("crra", utility, 10.0, 3.0).unwrap();
            let rate = 1.2;
            let decision = solve_agent(&agent, rate, 0.0, &FiscalPolicy::default()).unwrap();
            // c_old / c_young = (beta R)^(1/sigma)
            let growth = (BETA * rate).powf(1.0 / sigma);
            assert_relative_eq!(
                decision.c_old / decision.c_young,
                growth,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn test_savings_measured_from_after_tax_income() {
        let agent = log_agent(10.0, 3.0);
        let fiscal = FiscalPolicy::new(0.2, 0.1, 0.0, 0.5).unwrap();
        let decision = solve_agent(&agent, 1.1, 0.02, &fiscal).unwrap();
        assert_relative_eq!(decision.net_young, 8.0, max_relative = 1e-12);
        assert_relative_eq!(decision.net_old, (3.0 * 0.9 + 0.5) * 1.02, max_relative = 1e-12);
        assert_relative_eq!(decision.savings, 8.0 - decision.c_young, max_relative = 1e-12);
        let (c_young, _) = log_closed_form(decision.net_young, decision.net_old, 1.1);
        assert_relative_eq!(decision.c_young, c_young, max_relative = 1e-7);
    }

    #[test]
    fn test_budget_constraint_holds() {
        let agent = log_agent(4.0, 7.0);
        for rate in [0.3, 0.9, 1.3, 2.5, 10.0] {
            let decision = solve_agent(&agent, rate, 0.05, &FiscalPolicy::default()).unwrap();
            assert!(decision.budget_residual(rate).abs() < 1e-9);
            assert!(decision.c_young > 0.0 && decision.c_old > 0.0);
        }
    }

    #[test]
    fn test_linear_utility_has_no_interior_optimum() {
        let utility: Arc<dyn UtilityFunction> = Arc::new(|c_y: f64, c_o: f64| c_y + c_o);
        let agent = Agent::new("linear", utility, 5.0, 5.0).unwrap();
        let err = solve_agent(&agent, 1.2, 0.0, &FiscalPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            AgentSolveError::NoInteriorOptimum {
                rate: 1.2,
                corner: Corner::Young
            }
        );

        let err = solve_agent(&agent, 0.8, 0.0, &FiscalPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            AgentSolveError::NoInteriorOptimum {
                corner: Corner::Old,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_rate_is_domain_error() {
        let agent = log_agent(10.0, 3.0);
        let err = solve_agent(&agent, 0.0, 0.02, &FiscalPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            AgentSolveError::Domain(ModelError::InvalidInterestRate(0.0))
        );
        let err = solve_agent(&agent, 1.05, -1.5, &FiscalPolicy::default()).unwrap_err();
        assert_eq!(err, AgentSolveError::Domain(ModelError::InvalidGrowthRate(-1.5)));
    }

    #[test]
    fn test_nan_utility_is_reported() {
        let utility: Arc<dyn UtilityFunction> = Arc::new(|_: f64, _: f64| f64::NAN);
        let agent = Agent::new("broken", utility, 5.0, 5.0).unwrap();
        let err = solve_agent(&agent, 1.0, 0.0, &FiscalPolicy::default()).unwrap_err();
        assert!(matches!(err, AgentSolveError::NonFiniteObjective { .. }));
    }

    #[test]
    fn test_tight_iteration_budget_fails_loudly() {
        let settings = OptimizerSettings {
            root: BrentSettings {
                max_iterations: 1,
                ..OptimizerSettings::default().root
            },
            ..OptimizerSettings::default()
        };
        let err = AgentSolver::new(settings)
            .solve(&log_agent(10.0, 3.0), 1.05, 0.02, &FiscalPolicy::default())
            .unwrap_err();
        assert!(matches!(err, AgentSolveError::NotConverged { .. }));
    }

    #[test]
    fn test_repeated_solves_are_identical() {
        let agent = log_agent(10.0, 3.0);
        let a = solve_agent(&agent, 1.07, 0.02, &FiscalPolicy::default()).unwrap();
        let b = solve_agent(&agent, 1.07, 0.02, &FiscalPolicy::default()).unwrap();
        assert_eq!(a, b);
    }
}
