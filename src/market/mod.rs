//! General equilibrium: the economy, the clearing condition and the search
//! for the interest rate that satisfies it.

pub mod aggregation;
pub mod economy;
pub mod equilibrium;
