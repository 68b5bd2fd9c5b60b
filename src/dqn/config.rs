//! Deep value-function agent configuration.

use crate::error::{OptimError, Result};

/// Configuration for the deep value-function agent.
///
/// # Defaults
///
/// ```
/// use resalloc_optim::dqn::DqnConfig;
///
/// let config = DqnConfig::new(4, 2);
/// assert_eq!(config.batch_size, 32);
/// assert_eq!(config.buffer_capacity, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct DqnConfig {
    /// Dimensionality of state feature vectors.
    pub state_dim: usize,

    /// Number of discrete actions.
    pub action_count: usize,

    /// Replay buffer capacity (circular overwrite once full).
    pub buffer_capacity: usize,

    /// Experiences per learning batch; learning waits until the buffer
    /// holds at least this many.
    pub batch_size: usize,

    /// Discount factor γ for non-terminal targets.
    pub discount_factor: f64,

    /// Initial exploration rate ε.
    pub epsilon: f64,

    /// Exploration floor.
    pub epsilon_min: f64,

    /// Multiplicative ε decay applied once per learning step.
    pub epsilon_decay: f64,

    /// Learning steps between target-network synchronizations.
    pub target_update_frequency: u64,

    /// Learning rate for the built-in linear approximator.
    pub learning_rate: f64,

    /// Random seed for reproducibility. `None` draws a random seed.
    pub seed: Option<u64>,
}

impl DqnConfig {
    /// Defaults for a given state dimension and action count.
    pub fn new(state_dim: usize, action_count: usize) -> Self {
        Self {
            state_dim,
            action_count,
            buffer_capacity: 10_000,
            batch_size: 32,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.995,
            target_update_frequency: 10,
            learning_rate: 0.05,
            seed: None,
        }
    }

    /// Sets the replay buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the learning batch size.
    pub fn with_batch_size(mut self, batch: usize) -> Self {
        self.batch_size = batch;
        self
    }

    /// Sets the discount factor.
    pub fn with_discount_factor(mut self, gamma: f64) -> Self {
        self.discount_factor = gamma;
        self
    }

    /// Sets the initial exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self
    }

    /// Sets the exploration floor.
    pub fn with_epsilon_min(mut self, floor: f64) -> Self {
        self.epsilon_min = floor.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-learning-step exploration decay.
    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    /// Sets the target-network sync interval in learning steps.
    pub fn with_target_update_frequency(mut self, steps: u64) -> Self {
        self.target_update_frequency = steps;
        self
    }

    /// Sets the built-in approximator's learning rate.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.state_dim == 0 {
            return Err(OptimError::InvalidConfiguration(
                "state_dim must be at least 1".into(),
            ));
        }
        if self.action_count == 0 {
            return Err(OptimError::InvalidConfiguration(
                "action_count must be at least 1".into(),
            ));
        }
        if self.batch_size == 0 || self.batch_size > self.buffer_capacity {
            return Err(OptimError::InvalidConfiguration(
                "batch_size must be in [1, buffer_capacity]".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.discount_factor) {
            return Err(OptimError::InvalidConfiguration(
                "discount_factor must be in [0, 1)".into(),
            ));
        }
        if self.epsilon_min > self.epsilon {
            return Err(OptimError::InvalidConfiguration(
                "epsilon_min must not exceed epsilon".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_decay) {
            return Err(OptimError::InvalidConfiguration(
                "epsilon_decay must be in [0, 1]".into(),
            ));
        }
        if self.target_update_frequency == 0 {
            return Err(OptimError::InvalidConfiguration(
                "target_update_frequency must be at least 1".into(),
            ));
        }
        if !(self.learning_rate > 0.0) {
            return Err(OptimError::InvalidConfiguration(
                "learning_rate must be positive".into(),
            ));
        }
        Ok(())
    }
}
