//! Tabular reinforcement-learning refinement of a seed allocation.
//!
//! Local search around a (typically evolutionary) seed: discretized
//! allocation states, one increase/decrease action per resource, an
//! epsilon-greedy walk with decaying exploration, and a reward-matching
//! Q update. Best results are tracked feasibly and strictly.
//!
//! # Key Types
//!
//! - [`RefineConfig`]: step budget, learning/exploration parameters
//! - [`RefinementAgent`]: the refiner; also a [`crate::policy::Policy`]
//! - [`RefineOutcome`]: refined allocation, reward, confidence

mod agent;
mod config;

pub use agent::{RefineOutcome, RefinementAgent};
pub use config::RefineConfig;
