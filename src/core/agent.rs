use crate::core::error::{check_positive, ModelError};
use crate::core::utility::UtilityFunction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Label for an agent type in a population.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::core::agent::AgentId;
///
/// let saver = AgentId::new("saver");
/// let borrower = AgentId::new("borrower");
/// assert_ne!(saver, borrower);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A two-period household type: endowments in each period of life plus
/// a lifetime utility function.
///
/// Agents are immutable values. The utility function is shared, so cloning
/// an agent is cheap and many agent types may use the same preferences.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::core::agent::Agent;
/// use olg_equilibrium::core::utility::LogUtility;
/// use std::sync::Arc;
///
/// let utility = Arc::new(LogUtility::new(0.96).unwrap());
/// let saver = Agent::new("saver", utility, 10.0, 3.0).unwrap();
/// assert_eq!(saver.endowment_young(), 10.0);
/// ```
#[derive(Clone)]
pub struct Agent {
    id: AgentId,
    endowment_young: f64,
    endowment_old: f64,
    utility: Arc<dyn UtilityFunction>,
}

impl Agent {
    /// Create an agent type.
    ///
    /// Both endowments must be strictly positive and finite.
    pub fn new(
        id: impl Into<AgentId>,
        utility: Arc<dyn UtilityFunction>,
        endowment_young: f64,
        endowment_old: f64,
    ) -> Result<Self, ModelError> {
        if !check_positive(endowment_young) {
            return Err(ModelError::InvalidEndowment {
                field: "young",
                value: endowment_young,
            });
        }
        if !check_positive(endowment_old) {
            return Err(ModelError::InvalidEndowment {
                field: "old",
                value: endowment_old,
            });
        }
        Ok(Self {
            id: id.into(),
            endowment_young,
            endowment_old,
            utility,
        })
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn endowment_young(&self) -> f64 {
        self.endowment_young
    }

    pub fn endowment_old(&self) -> f64 {
        self.endowment_old
    }

    pub fn utility(&self) -> &dyn UtilityFunction {
        self.utility.as_ref()
    }

    /// Lifetime utility of a consumption plan.
    pub fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        self.utility.evaluate(c_young, c_old)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("endowment_young", &self.endowment_young)
            .field("endowment_old", &self.endowment_old)
            .finish_non_exhaustive()
    }
}
