use crate::core::error::{validate_growth_rate, ModelError};
use crate::core::population::Population;
use crate::optimization::agent_solver::OptimizerSettings;
use crate::sector::fiscal::FiscalPolicy;
use crate::sector::production::ProductionTechnology;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default search interval for a pure-exchange economy.
pub const PURE_EXCHANGE_BRACKET: (f64, f64) = (0.8, 1.5);

/// Default search interval when a production sector is present. Investment
/// demand pushes the equilibrium rate above one.
pub const PRODUCTION_BRACKET: (f64, f64) = (1.01, 1.5);

/// What the aggregation engine does with an agent whose optimization fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentFailurePolicy {
    /// The failed agent contributes nothing to savings or endowments. The
    /// failure is logged and reported in the market snapshot.
    #[default]
    ZeroSubstitute,
    /// The whole market evaluation fails.
    Propagate,
}

impl fmt::Display for AgentFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentFailurePolicy::ZeroSubstitute => write!(f, "zero_substitute"),
            AgentFailurePolicy::Propagate => write!(f, "propagate"),
        }
    }
}

/// A complete OLG economy: households, growth, and optional firm and
/// government.
///
/// An economy is built once per equilibrium computation and never changes
/// afterwards; comparative statics build a fresh one per parameter value.
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
///
/// let economy = Economy::new(population, 0.02)
///     .unwrap()
///     .with_technology(ProductionTechnology::new(1.0, 0.33, 0.05).unwrap());
/// assert_eq!(economy.default_bracket(), (1.01, 1.5));
/// ```
#[derive(Debug, Clone)]
pub struct Economy {
    population: Population,
    growth: f64,
    technology: Option<ProductionTechnology>,
    fiscal: Option<FiscalPolicy>,
    failure_policy: AgentFailurePolicy,
    optimizer: OptimizerSettings,
}

impl Economy {
    /// A pure-exchange economy with net endowment growth rate `growth`.
    pub fn new(population: Population, growth: f64) -> Result<Self, ModelError> {
        validate_growth_rate(growth)?;
        Ok(Self {
            population,
            growth,
            technology: None,
            fiscal: None,
            failure_policy: AgentFailurePolicy::default(),
            optimizer: OptimizerSettings::default(),
        })
    }

    pub fn with_technology(mut self, technology: ProductionTechnology) -> Self {
        self.technology = Some(technology);
        self
    }

    pub fn with_fiscal_policy(mut self, fiscal: FiscalPolicy) -> Self {
        self.fiscal = Some(fiscal);
        self
    }

    pub fn with_failure_policy(mut self, policy: AgentFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_optimizer_settings(mut self, settings: OptimizerSettings) -> Self {
        self.optimizer = settings;
        self
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn growth(&self) -> f64 {
        self.growth
    }

    pub fn technology(&self) -> Option<&ProductionTechnology> {
        self.technology.as_ref()
    }

    /// The attached fiscal policy, if any.
    pub fn fiscal(&self) -> Option<&FiscalPolicy> {
        self.fiscal.as_ref()
    }

    /// The fiscal policy households face; the no-op policy when none is
    /// attached.
    pub fn fiscal_policy(&self) -> FiscalPolicy {
        self.fiscal.unwrap_or_default()
    }

    pub fn failure_policy(&self) -> AgentFailurePolicy {
        self.failure_policy
    }

    pub fn optimizer_settings(&self) -> &OptimizerSettings {
        &self.optimizer
    }

    pub fn is_pure_exchange(&self) -> bool {
        self.technology.is_none()
    }

    /// Search interval used when the caller gives none.
    pub fn default_bracket(&self) -> (f64, f64) {
        if self.is_pure_exchange() {
            PURE_EXCHANGE_BRACKET
        } else {
            PRODUCTION_BRACKET
        }
    }
}
