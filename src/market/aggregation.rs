//! Market-clearing condition at a trial interest rate.
//!
//! Every agent type is solved at the trial rate, savings are weighted by
//! population share, and national savings (private plus public) are set
//! against the firm's investment demand. The equilibrium search drives the
//! resulting imbalance to zero.

use crate::core::agent::AgentId;
use crate::core::error::validate_gross_rate;
use crate::core::population::{AggregateEndowments, PopulationMember};
use crate::market::economy::{AgentFailurePolicy, Economy};
use crate::market::equilibrium::EquilibriumError;
use crate::optimization::agent_solver::{AgentDecision, AgentSolveError, AgentSolver};
use crate::parallel::map_slice;
use crate::sector::production::FirmDecision;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// How one agent type fared at the trial rate.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub agent: AgentId,
    pub share: f64,
    /// `None` when the optimizer failed and the agent was zero-substituted.
    pub decision: Option<AgentDecision>,
    /// Rendered optimizer error for a substituted agent.
    pub failure: Option<String>,
}

impl AgentOutcome {
    pub fn failed(&self) -> bool {
        self.decision.is_none()
    }
}

/// Every aggregate behind one evaluation of the clearing condition.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub gross_rate: f64,
    pub growth: f64,
    /// Share-weighted household savings.
    pub private_savings: f64,
    pub tax_revenue: f64,
    pub public_savings: f64,
    pub national_savings: f64,
    /// Firm capital demand; zero in a pure-exchange economy.
    pub investment: f64,
    /// National savings minus investment.
    pub imbalance: f64,
    /// Share-weighted gross endowments of the agents that solved.
    pub endowments: AggregateEndowments,
    pub firm: Option<FirmDecision>,
    pub agents: Vec<AgentOutcome>,
}

impl MarketSnapshot {
    pub fn net_rate(&self) -> f64 {
        self.gross_rate - 1.0
    }

    /// Agents whose optimizer failed and were counted as zero.
    pub fn failed_agents(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.iter().filter(|o| o.failed()).map(|o| &o.agent)
    }

    pub fn is_complete(&self) -> bool {
        self.agents.iter().all(|o| !o.failed())
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Market at R = {:.6} (r = {:.4}%, g = {:.4})",
            self.gross_rate,
            self.net_rate() * 100.0,
            self.growth
        )?;
        writeln!(f, "  private savings:  {:>14.6}", self.private_savings)?;
        writeln!(f, "  tax revenue:      {:>14.6}", self.tax_revenue)?;
        writeln!(f, "  public savings:   {:>14.6}", self.public_savings)?;
        writeln!(f, "  national savings: {:>14.6}", self.national_savings)?;
        writeln!(f, "  investment:       {:>14.6}", self.investment)?;
        writeln!(f, "  imbalance:        {:>14.6e}", self.imbalance)?;
        if let Some(firm) = &self.firm {
            writeln!(
                f,
                "  firm: user cost {:.6}, wage {:.6}, output {:.6}",
                firm.user_cost, firm.wage, firm.output
            )?;
        }
        writeln!(f, "  agents:")?;
        for outcome in &self.agents {
            match (&outcome.decision, &outcome.failure) {
                (Some(d), _) => writeln!(
                    f,
                    "    {:<12} share {:.4}  c_y {:>10.6}  c_o {:>10.6}  s {:>10.6}",
                    outcome.agent, outcome.share, d.c_young, d.c_old, d.savings
                )?,
                (None, reason) => writeln!(
                    f,
                    "    {:<12} share {:.4}  FAILED ({})",
                    outcome.agent,
                    outcome.share,
                    reason.as_deref().unwrap_or("unknown")
                )?,
            }
        }
        Ok(())
    }
}

/// Evaluate the clearing condition at gross rate `R`, keeping every
/// intermediate aggregate.
///
/// Under [`AgentFailurePolicy::ZeroSubstitute`] an agent whose optimizer
/// fails contributes neither savings nor taxable endowment; under
/// [`AgentFailurePolicy::Propagate`] the first failure in population order
/// is returned as [`EquilibriumError::AgentFailure`].
pub fn market_snapshot(
    economy: &Economy,
    gross_rate: f64,
) -> Result<MarketSnapshot, EquilibriumError> {
    validate_gross_rate(gross_rate)?;

    let solver = AgentSolver::new(*economy.optimizer_settings());
    let fiscal = economy.fiscal_policy();
    let growth = economy.growth();

    let results: Vec<Result<AgentDecision, AgentSolveError>> =
        map_slice(economy.population().members(), |member: &PopulationMember| {
            solver.solve(&member.agent, gross_rate, growth, &fiscal)
        });

    let mut private_savings = 0.0;
    let mut endowments = AggregateEndowments::default();
    let mut agents = Vec::with_capacity(results.len());

    for (member, result) in economy.population().members().iter().zip(results) {
        let agent = &member.agent;
        match result {
            Ok(decision) => {
                private_savings += member.share * decision.savings;
                endowments.young += member.share * agent.endowment_young();
                endowments.old += member.share * agent.endowment_old();
                agents.push(AgentOutcome {
                    agent: agent.id().clone(),
                    share: member.share,
                    decision: Some(decision),
                    failure: None,
                });
            }
            Err(err) => match economy.failure_policy() {
                AgentFailurePolicy::Propagate => {
                    return Err(EquilibriumError::AgentFailure {
                        agent: agent.id().clone(),
                        rate: gross_rate,
                        source: err,
                    });
                }
                AgentFailurePolicy::ZeroSubstitute => {
                    warn!(
                        "optimizer failed for agent {} at R={:.6}, g={}: {}; counting zero savings",
                        agent.id(),
                        gross_rate,
                        growth,
                        err
                    );
                    agents.push(AgentOutcome {
                        agent: agent.id().clone(),
                        share: member.share,
                        decision: None,
                        failure: Some(err.to_string()),
                    });
                }
            },
        }
    }

    let firm = economy.technology().map(|t| t.solve(gross_rate - 1.0));
    let investment = firm.map_or(0.0, |f| f.capital_demand);

    let (tax_revenue, public_savings) = match economy.fiscal() {
        Some(policy) => {
            let revenue = policy.tax_revenue(endowments);
            (revenue, policy.public_savings(revenue))
        }
        None => (0.0, 0.0),
    };

    let national_savings = private_savings + public_savings;
    let imbalance = national_savings - investment;

    debug!(
        "market at R={:.6}: private={:.6} public={:.6} investment={:.6} imbalance={:.3e}",
        gross_rate, private_savings, public_savings, investment, imbalance
    );

    Ok(MarketSnapshot {
        gross_rate,
        growth,
        private_savings,
        tax_revenue,
        public_savings,
        national_savings,
        investment,
        imbalance,
        endowments,
        firm,
        agents,
    })
}

/// National savings minus investment at gross rate `R`.
///
/// Zero at equilibrium. Positive means excess savings, so the rate must
/// fall; negative means excess demand for funds.
pub fn market_imbalance(economy: &Economy, gross_rate: f64) -> Result<f64, EquilibriumError> {
    market_snapshot(economy, gross_rate).map(|snapshot| snapshot.imbalance)
}
