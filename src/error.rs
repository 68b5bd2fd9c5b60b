//! Error taxonomy for the optimization engine.
//!
//! Per-individual constraint violations are *not* errors; they are absorbed
//! as fitness penalties inside the evolutionary loop. Only configuration
//! problems, engine-level infeasibility, and numeric corruption surface as
//! [`OptimError`].

use thiserror::Error;

/// Errors produced by the optimization and decision components.
#[derive(Debug, Error)]
pub enum OptimError {
    /// The problem definition or algorithm configuration is invalid.
    ///
    /// Raised before any search begins: empty resource lists, inverted
    /// bounds, dimension mismatches, negative objective weights, and the
    /// like.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The evolutionary engine exhausted its budget without finding any
    /// allocation that satisfies all constraints.
    #[error("no feasible solution found after {generations} generations")]
    NoFeasibleSolution {
        /// Generations executed before giving up.
        generations: usize,
    },

    /// NaN or infinity appeared where a finite value is required.
    ///
    /// Local occurrences (a single individual's fitness, a single reward)
    /// are clamped inside the search loops and never reach this variant;
    /// it is reserved for places where corrupt values would silently
    /// poison learned parameters, such as approximator outputs during a
    /// DQN learning step.
    #[error("numeric instability in {context}")]
    NumericInstability {
        /// Where the non-finite value was detected.
        context: String,
    },

    /// A policy persistence token could not be decoded.
    #[error("invalid policy snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, OptimError>;
