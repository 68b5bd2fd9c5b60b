//! Constrained multi-objective resource-allocation optimization and
//! sequential-decision policies.
//!
//! Given a set of resources with bounds and per-unit cost/emissions/
//! efficiency coefficients, business constraints over those aggregates, and
//! weighted direction-aware objectives, this crate finds an allocation that
//! best satisfies the objectives and refines it by reinforcement-learning
//! local search:
//!
//! - **[`ga`]**: evolutionary global search: tournament selection, uniform
//!   crossover, bounded mutation, elitism, and a constraint-violation
//!   fitness penalty.
//! - **[`refine`]**: tabular epsilon-greedy local refinement of a seed
//!   allocation with a reward-matching Q update.
//! - **[`dqn`]**: an independent deep value-function control policy with
//!   experience replay and a target network, generic over a pluggable
//!   value approximator. Reusable for any MDP, not only allocation.
//! - **[`orchestrator`]**: the end-to-end pipeline (global search → local
//!   refinement → formatted result with an implementation plan).
//!
//! # Example
//!
//! ```
//! use resalloc_optim::domain::{Aggregate, Constraint, ConstraintOp, Objective, Resource};
//! use resalloc_optim::ga::GaConfig;
//! use resalloc_optim::orchestrator::Optimizer;
//! use resalloc_optim::refine::RefineConfig;
//!
//! let resources = vec![
//!     Resource {
//!         name: "solar".into(),
//!         min: 0.0,
//!         max: 10.0,
//!         cost: 1.0,
//!         emissions_factor: 0.1,
//!         efficiency: 1.0,
//!     },
//!     Resource {
//!         name: "wind".into(),
//!         min: 0.0,
//!         max: 10.0,
//!         cost: 1.2,
//!         emissions_factor: 0.05,
//!         efficiency: 1.1,
//!     },
//! ];
//! let constraints = vec![Constraint {
//!     target: Aggregate::Cost,
//!     op: ConstraintOp::LessEq,
//!     value: 15.0,
//! }];
//! let objectives = vec![
//!     Objective { target: Aggregate::Efficiency, weight: 1.0, minimize: false },
//!     Objective { target: Aggregate::Emissions, weight: 0.5, minimize: true },
//! ];
//!
//! let optimizer = Optimizer::new()
//!     .with_ga_config(GaConfig::default().with_seed(42))
//!     .with_refine_config(RefineConfig::default().with_seed(42));
//! let result = optimizer.optimize(resources, constraints, objectives).unwrap();
//! assert_eq!(result.allocation.len(), 2);
//! ```
//!
//! # Concurrency
//!
//! Every engine and agent instance owns its state (population, Q-table,
//! replay buffer, approximator parameters) exclusively; concurrent use of
//! one instance must be serialized by the caller. Seeded configs make runs
//! bit-reproducible.

pub mod domain;
pub mod dqn;
pub mod error;
pub mod ga;
pub mod orchestrator;
pub mod policy;
pub mod random;
pub mod refine;

pub use error::{OptimError, Result};
