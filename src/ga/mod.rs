//! Evolutionary search over constrained resource allocations.
//!
//! A fixed-size population of gene vectors (one gene per resource) evolves
//! through tournament selection, uniform crossover, bounded mutation, and
//! elitism. Fitness is the weighted, direction-aware objective score from
//! [`crate::domain::scalarize`], damped by a constant factor when a
//! constraint is violated; infeasible individuals are penalized, never
//! discarded, so the search keeps a gradient back toward feasibility.
//!
//! # Key Types
//!
//! - [`GaConfig`]: algorithm parameters (population, rates, termination)
//! - [`GaEngine`]: executes the evolutionary loop
//! - [`GaOutcome`]: best individual plus run statistics
//! - [`Individual`]: one candidate allocation with fitness and feasibility
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*

mod config;
mod engine;
pub mod operators;
mod types;

pub use config::GaConfig;
pub use engine::{GaEngine, GaOutcome};
pub use types::{Individual, INFEASIBILITY_PENALTY};
