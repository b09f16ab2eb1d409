//! Foundational model types: agents, preferences, population, domain errors.

pub mod agent;
pub mod error;
pub mod population;
pub mod utility;
