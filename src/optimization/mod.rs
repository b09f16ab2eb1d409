//! Numerical building blocks: bracketed root finding and the household
//! optimizer built on it.

pub mod agent_solver;
pub mod root_finding;
