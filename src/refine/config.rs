//! Refinement agent configuration.

use crate::error::{OptimError, Result};

/// Configuration for the tabular refinement agent.
///
/// # Defaults
///
/// ```
/// use resalloc_optim::refine::RefineConfig;
///
/// let config = RefineConfig::default();
/// assert_eq!(config.max_steps, 100);
/// assert!((config.learning_rate - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct RefineConfig {
    /// Fixed step budget; termination is never convergence-based.
    pub max_steps: usize,

    /// Q-value learning rate α.
    pub learning_rate: f64,

    /// Initial exploration rate ε.
    pub exploration_rate: f64,

    /// Multiplicative ε decay applied once per step.
    pub exploration_decay: f64,

    /// Exploration floor. Set to 0.0 to let epsilon decay without bound.
    pub epsilon_min: f64,

    /// Action step size as a fraction of each resource's range.
    pub step_fraction: f64,

    /// Number of discretization buckets per dimension for state keys.
    pub buckets: usize,

    /// Random seed for reproducibility. `None` draws a random seed.
    pub seed: Option<u64>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            learning_rate: 0.1,
            exploration_rate: 0.3,
            exploration_decay: 0.99,
            epsilon_min: 0.01,
            step_fraction: 0.05,
            buckets: 20,
            seed: None,
        }
    }
}

impl RefineConfig {
    /// Sets the step budget.
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.learning_rate = alpha;
        self
    }

    /// Sets the initial exploration rate.
    pub fn with_exploration_rate(mut self, epsilon: f64) -> Self {
        self.exploration_rate = epsilon.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-step exploration decay factor.
    pub fn with_exploration_decay(mut self, decay: f64) -> Self {
        self.exploration_decay = decay;
        self
    }

    /// Sets the exploration floor.
    pub fn with_epsilon_min(mut self, floor: f64) -> Self {
        self.epsilon_min = floor.clamp(0.0, 1.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(OptimError::InvalidConfiguration(
                "max_steps must be at least 1".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(OptimError::InvalidConfiguration(
                "learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.exploration_decay) {
            return Err(OptimError::InvalidConfiguration(
                "exploration_decay must be in [0, 1]".into(),
            ));
        }
        if self.epsilon_min > self.exploration_rate {
            return Err(OptimError::InvalidConfiguration(
                "epsilon_min must not exceed exploration_rate".into(),
            ));
        }
        if !(self.step_fraction > 0.0 && self.step_fraction <= 1.0) {
            return Err(OptimError::InvalidConfiguration(
                "step_fraction must be in (0, 1]".into(),
            ));
        }
        if self.buckets == 0 {
            return Err(OptimError::InvalidConfiguration(
                "buckets must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
