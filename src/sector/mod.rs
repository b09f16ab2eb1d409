//! Closed-form sectors consumed by the aggregation engine: the firm's
//! production technology and the government's fiscal rule.

pub mod fiscal;
pub mod production;
