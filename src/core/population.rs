use crate::core::agent::Agent;
use crate::core::error::ModelError;
use serde::Serialize;

/// Tolerance on the sum of population shares.
pub const SHARE_TOLERANCE: f64 = 1e-9;

/// An agent type together with its population share.
#[derive(Debug, Clone)]
pub struct PopulationMember {
    pub agent: Agent,
    pub share: f64,
}

/// Aggregate endowments of a population, weighted by share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateEndowments {
    pub young: f64,
    pub old: f64,
}

/// A fixed set of agent types with population weights.
///
/// Shares are non-negative and sum to one. Order is kept as given but has
/// no economic meaning.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::core::agent::Agent;
/// use olg_equilibrium::core::population::Population;
/// use olg_equilibrium::core::utility::LogUtility;
/// use std::sync::Arc;
///
/// let utility = Arc::new(LogUtility::new(0.96).unwrap());
/// let saver = Agent::new("saver", utility.clone(), 10.0, 3.0).unwrap();
/// let borrower = Agent::new("borrower", utility, 3.0, 10.0).unwrap();
///
/// let population = Population::two_type(saver, borrower, 0.5).unwrap();
/// assert_eq!(population.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<PopulationMember>,
}

impl Population {
    pub fn new(members: impl IntoIterator<Item = (Agent, f64)>) -> Result<Self, ModelError> {
        let members: Vec<PopulationMember> = members
            .into_iter()
            .map(|(agent, share)| PopulationMember { agent, share })
            .collect();

        if members.is_empty() {
            return Err(ModelError::EmptyPopulation);
        }

        for member in &members {
            if !(member.share.is_finite() && member.share >= 0.0) {
                return Err(ModelError::InvalidShare {
                    agent: member.agent.id().to_string(),
                    share: member.share,
                });
            }
        }

        let sum: f64 = members.iter().map(|m| m.share).sum();
        if (sum - 1.0).abs() > SHARE_TOLERANCE {
            return Err(ModelError::SharesDoNotSumToOne { sum });
        }

        Ok(Self { members })
    }

    /// Two agent types with shares `phi` and `1 - phi`.
    pub fn two_type(first: Agent, second: Agent, phi: f64) -> Result<Self, ModelError> {
        Self::new([(first, phi), (second, 1.0 - phi)])
    }

    pub fn members(&self) -> &[PopulationMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Share-weighted gross endowments across all agent types.
    pub fn aggregate_endowments(&self) -> AggregateEndowments {
        self.members
            .iter()
            .fold(AggregateEndowments::default(), |acc, m| AggregateEndowments {
                young: acc.young + m.share * m.agent.endowment_young(),
                old: acc.old + m.share * m.agent.endowment_old(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utility::{LogUtility, UtilityFunction};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn agent(id: &str, young: f64, old: f64) -> Agent {
        let utility: Arc<dyn UtilityFunction> = Arc::new(LogUtility::new(0.96).unwrap());
        Agent::new(id, utility, young, old).unwrap()
    }

    #[test]
    fn test_two_type_population() {
        let population =
            Population::two_type(agent("saver", 10.0, 3.0), agent("borrower", 3.0, 10.0), 0.3)
                .unwrap();
        assert_eq!(population.len(), 2);
        assert_relative_eq!(population.members()[0].share, 0.3);
        assert_relative_eq!(population.members()[1].share, 0.7);
    }

    #[test]
    fn test_aggregate_endowments() {
        let population =
            Population::two_type(agent("saver", 10.0, 3.0), agent("borrower", 3.0, 10.0), 0.5)
                .unwrap();
        let totals = population.aggregate_endowments();
        assert_relative_eq!(totals.young, 6.5);
        assert_relative_eq!(totals.old, 6.5);
    }

    #[test]
    fn test_shares_must_sum_to_one() {
        let err = Population::new([(agent("a", 1.0, 1.0), 0.5), (agent("b", 1.0, 1.0), 0.4)])
            .unwrap_err();
        assert!(matches!(err, ModelError::SharesDoNotSumToOne { .. }));
    }

    #[test]
    fn test_negative_share_rejected() {
        let err = Population::new([(agent("a", 1.0, 1.0), 1.5), (agent("b", 1.0, 1.0), -0.5)])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidShare { .. }));
    }

    #[test]
    fn test_empty_population_rejected() {
        let err = Population::new(Vec::<(Agent, f64)>::new()).unwrap_err();
        assert_eq!(err, ModelError::EmptyPopulation);
    }

    #[test]
    fn test_zero_share_allowed() {
        let population =
            Population::new([(agent("a", 1.0, 1.0), 1.0), (agent("b", 2.0, 2.0), 0.0)]).unwrap();
        assert_eq!(population.len(), 2);
    }
}
