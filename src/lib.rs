//! # olg-equilibrium
//!
//! General-equilibrium interest rates in a two-period overlapping
//! generations economy.
//!
//! Households live for two periods, receive an endowment in each, and choose
//! how much to save when young. Given a gross interest rate `R = 1 + r`,
//! every household type solves its lifetime problem numerically; the
//! share-weighted savings, together with government surplus and the firm's
//! capital demand, give the credit-market imbalance. The equilibrium rate is
//! the root of that imbalance, found by a bracketed Brent search.
//!
//! ## Architecture
//!
//! - **core** — Agents, utility functions, populations, domain errors
//! - **sector** — Cobb-Douglas firm and linear fiscal policy
//! - **optimization** — Brent root finding and the per-agent optimizer
//! - **market** — Economy, market-clearing condition, equilibrium search
//! - **config** — JSON model configuration
//! - **simulation** — Comparative statics and random stress populations

pub mod config;
pub mod core;
pub mod market;
pub mod optimization;
pub mod parallel;
pub mod sector;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{ConfigError, ModelConfig};
    pub use crate::core::agent::{Agent, AgentId};
    pub use crate::core::error::ModelError;
    pub use crate::core::population::Population;
    pub use crate::core::utility::{CrraUtility, LogUtility, UtilityFunction};
    pub use crate::market::aggregation::{market_imbalance, market_snapshot, MarketSnapshot};
    pub use crate::market::economy::{AgentFailurePolicy, Economy};
    pub use crate::market::equilibrium::{
        find_equilibrium, Equilibrium, EquilibriumError, EquilibriumSolver,
    };
    pub use crate::optimization::agent_solver::{
        solve_agent, AgentDecision, AgentSolveError, AgentSolver, OptimizerSettings,
    };
    pub use crate::sector::fiscal::FiscalPolicy;
    pub use crate::sector::production::{FirmDecision, ProductionTechnology};
    pub use crate::simulation::comparative_statics::{
        linspace, ComparativeStatics, Parameter, SweepReport,
    };
}
