//! Experiments built on the equilibrium solver.

pub mod comparative_statics;
