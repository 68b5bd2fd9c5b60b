//! Pluggable value-function backend.
//!
//! The agent's replay, target-sync, and exploration logic is written against
//! [`ValueApproximator`] only, so the numeric backend can be swapped (e.g.
//! for a tensor-library network) without touching the algorithm. The
//! shipped [`LinearApproximator`] is a per-action linear model trained by
//! SGD, enough for the agent to be usable and testable standalone.

use serde::{Deserialize, Serialize};

use crate::error::{OptimError, Result};

/// Batch predict/fit contract for a state → per-action value function.
pub trait ValueApproximator {
    /// Number of actions (the width of each output vector).
    fn action_count(&self) -> usize;

    /// Predicts per-action values for a batch of states.
    fn predict(&self, states: &[Vec<f64>]) -> Vec<Vec<f64>>;

    /// Performs one training step toward the target vectors.
    ///
    /// # Errors
    /// [`OptimError::NumericInstability`] when a target is non-finite.
    fn fit(&mut self, states: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()>;

    /// Copies `other`'s parameters into `self` verbatim (target-network
    /// synchronization).
    fn copy_parameters_from(&mut self, other: &Self)
    where
        Self: Sized;
}

/// Per-action linear model: `value(s, a) = w[a] · s + b[a]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearApproximator {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
    learning_rate: f64,
    state_dim: usize,
}

impl LinearApproximator {
    /// Zero-initialized model. Zero init keeps seeded runs reproducible and
    /// is sufficient for linear models (no symmetry to break).
    pub fn new(state_dim: usize, action_count: usize, learning_rate: f64) -> Self {
        Self {
            weights: vec![vec![0.0; state_dim]; action_count],
            biases: vec![0.0; action_count],
            learning_rate,
            state_dim,
        }
    }

    fn value(&self, state: &[f64], action: usize) -> f64 {
        debug_assert_eq!(state.len(), self.state_dim);
        let dot: f64 = self.weights[action]
            .iter()
            .zip(state)
            .map(|(w, x)| w * x)
            .sum();
        dot + self.biases[action]
    }
}

impl ValueApproximator for LinearApproximator {
    fn action_count(&self) -> usize {
        self.biases.len()
    }

    fn predict(&self, states: &[Vec<f64>]) -> Vec<Vec<f64>> {
        states
            .iter()
            .map(|s| (0..self.action_count()).map(|a| self.value(s, a)).collect())
            .collect()
    }

    fn fit(&mut self, states: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()> {
        debug_assert_eq!(states.len(), targets.len());
        for (state, target) in states.iter().zip(targets) {
            for action in 0..self.action_count() {
                let t = target[action];
                if !t.is_finite() {
                    return Err(OptimError::NumericInstability {
                        context: "approximator fit target".into(),
                    });
                }
                let error = t - self.value(state, action);
                for (w, x) in self.weights[action].iter_mut().zip(state) {
                    *w += self.learning_rate * error * x;
                }
                self.biases[action] += self.learning_rate * error;
            }
        }
        Ok(())
    }

    fn copy_parameters_from(&mut self, other: &Self) {
        self.weights = other.weights.clone();
        self.biases = other.biases.clone();
    }
}
