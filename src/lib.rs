//! Plotting and summary statistics for trajectories of market-making
//! reinforcement-learning environments.
//!
//! The environment, the policy and the rollout loop are supplied by the caller
//! through the traits in [`gym`]; this crate only reshapes, reduces and draws
//! what they produce.

pub mod config;
pub mod error;
pub mod gym;
pub mod plot;
pub mod prelude;
pub mod report;
