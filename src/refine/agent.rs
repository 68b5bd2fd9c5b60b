//! Tabular Q-learning local refiner.
//!
//! The agent walks the allocation space one bounded step at a time: each
//! action nudges a single resource up or down by a fixed fraction of its
//! range, the resulting reward is the plain (unpenalized) objective score,
//! and the Q-table maps discretized allocation states to per-action value
//! estimates.
//!
//! The update rule is deliberately `Q ← Q + α(r − Q)` with **no** discounted
//! next-state bootstrap, a single-step, contextual-bandit-style
//! simplification of Q-learning that is preserved as observed behavior (see
//! `update_is_reward_matching_not_td` below).
//!
//! The Q-table grows one row per visited state with no eviction; for
//! long-running reuse of a single agent across many refinements, a bounded
//! map would be a worthwhile hardening.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::RefineConfig;
use crate::domain::Problem;
use crate::error::{OptimError, Result};
use crate::policy::{Action, Experience, Policy, PolicyStats, State};
use crate::random::rng_from_seed;

/// Result of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineOutcome {
    /// Best feasible allocation found (the seed if nothing improved on it).
    pub allocation: Vec<f64>,
    /// Objective score of `allocation`.
    pub reward: f64,
    /// Heuristic confidence in `[0.5, 0.95]`, driven by improvement count.
    pub confidence: f64,
    /// Steps executed (always the full budget).
    pub steps_run: usize,
    /// Strictly-improving feasible moves observed.
    pub improvements: u64,
}

/// Serialized form of the agent's learned state.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    q_table: HashMap<String, Vec<f64>>,
    epsilon: f64,
    improvements: u64,
    steps: u64,
}

/// Local-search refinement agent over a tabular value function.
///
/// Owns its Q-table, exploration rate, and RNG exclusively; concurrent use
/// from multiple callers must be serialized by the caller.
pub struct RefinementAgent {
    config: RefineConfig,
    q_table: HashMap<String, Vec<f64>>,
    epsilon: f64,
    rng: StdRng,
    improvements: u64,
    steps: u64,
}

impl RefinementAgent {
    /// Creates an agent with a validated configuration.
    pub fn new(config: RefineConfig) -> Result<Self> {
        config.validate()?;
        let rng = rng_from_seed(config.seed);
        let epsilon = config.exploration_rate;
        Ok(Self {
            config,
            q_table: HashMap::new(),
            epsilon,
            rng,
            improvements: 0,
            steps: 0,
        })
    }

    /// Refines a seed allocation by epsilon-greedy local search.
    ///
    /// Every move updates the Q-table, but only feasible moves that strictly
    /// improve on the best-known reward replace the returned allocation; an
    /// infeasible excursion can therefore never leak into the result.
    ///
    /// # Errors
    /// [`OptimError::InvalidConfiguration`] when the seed's dimension does
    /// not match the problem's resource count.
    pub fn refine(&mut self, seed: &[f64], problem: &Problem) -> Result<RefineOutcome> {
        if seed.len() != problem.dimension() {
            return Err(OptimError::InvalidConfiguration(format!(
                "seed has {} genes but the problem has {} resources",
                seed.len(),
                problem.dimension()
            )));
        }

        let resources = problem.resources();
        let action_count = 2 * resources.len();

        // Clamp the seed into bounds so every visited state is valid.
        let mut current: Vec<f64> = seed
            .iter()
            .zip(resources)
            .map(|(v, r)| r.clamp(*v))
            .collect();

        let seed_impact = problem.impact(&current);
        let mut best_allocation = current.clone();
        let mut best_reward = if problem.feasible(&seed_impact) {
            problem.score(&seed_impact)
        } else {
            f64::NEG_INFINITY
        };
        let mut improvements_this_run = 0u64;

        for _ in 0..self.config.max_steps {
            let state_key = allocation_key(&current, problem, self.config.buckets);
            let action = self.select_action(&state_key, action_count);

            // Apply: action 2i raises resource i, 2i+1 lowers it.
            let idx = action / 2;
            let direction = if action % 2 == 0 { 1.0 } else { -1.0 };
            let step = self.config.step_fraction * resources[idx].range();
            current[idx] = resources[idx].clamp(current[idx] + direction * step);

            let impact = problem.impact(&current);
            let reward = problem.score(&impact);
            let feasible = problem.feasible(&impact);

            self.update_q(&state_key, action, action_count, reward);

            if feasible && reward > best_reward {
                best_allocation.copy_from_slice(&current);
                best_reward = reward;
                improvements_this_run += 1;
            }

            self.epsilon = self
                .config
                .epsilon_min
                .max(self.epsilon * self.config.exploration_decay);
            self.steps += 1;
        }

        self.improvements += improvements_this_run;
        let confidence = 0.95f64.min(0.5 + improvements_this_run as f64 / 100.0);

        debug!(
            steps = self.config.max_steps,
            improvements = improvements_this_run,
            reward = best_reward,
            states = self.q_table.len(),
            "refinement finished"
        );

        Ok(RefineOutcome {
            reward: if best_reward.is_finite() {
                best_reward
            } else {
                problem.score(&seed_impact)
            },
            allocation: best_allocation,
            confidence,
            steps_run: self.config.max_steps,
            improvements: improvements_this_run,
        })
    }

    /// Epsilon-greedy over the Q-row for `state_key`; unseen states and
    /// exploration steps pick uniformly, ties among maxima break randomly.
    fn select_action(&mut self, state_key: &str, action_count: usize) -> usize {
        if self.rng.random_range(0.0..1.0) < self.epsilon {
            return self.rng.random_range(0..action_count);
        }
        match self.q_table.get(state_key) {
            None => self.rng.random_range(0..action_count),
            Some(values) => {
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let candidates: Vec<usize> = values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v == max)
                    .map(|(i, _)| i)
                    .collect();
                candidates[self.rng.random_range(0..candidates.len())]
            }
        }
    }

    /// Reward-matching update: `Q ← Q + α(r − Q)`. No bootstrap term.
    fn update_q(&mut self, state_key: &str, action: usize, action_count: usize, reward: f64) {
        let reward = if reward.is_finite() {
            reward
        } else {
            crate::domain::WORST_SCORE
        };
        let row = self
            .q_table
            .entry(state_key.to_string())
            .or_insert_with(|| vec![0.0; action_count]);
        row[action] += self.config.learning_rate * (reward - row[action]);
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of distinct discretized states visited so far.
    pub fn table_size(&self) -> usize {
        self.q_table.len()
    }
}

/// Discretizes an allocation into a composite state key: per-dimension
/// bucket index over the resource range, colon-joined.
fn allocation_key(allocation: &[f64], problem: &Problem, buckets: usize) -> String {
    let parts: Vec<String> = allocation
        .iter()
        .zip(problem.resources())
        .map(|(v, r)| {
            let range = r.range();
            let bucket = if range > 0.0 {
                (((v - r.min) / range * buckets as f64) as usize).min(buckets - 1)
            } else {
                0
            };
            bucket.to_string()
        })
        .collect();
    parts.join(":")
}

/// Discretizes an opaque feature vector for the [`Policy`] facade, in the
/// fixed-precision style of external state hashes.
fn feature_key(features: &[f64]) -> String {
    let parts: Vec<String> = features.iter().map(|f| format!("{f:.2}")).collect();
    parts.join(":")
}

impl Policy for RefinementAgent {
    fn get_action(&mut self, state: &State) -> Result<Action> {
        let action_count = 2 * state.features.len().max(1);
        let key = feature_key(&state.features);
        Ok(Action::index(self.select_action(&key, action_count)))
    }

    fn update_policy(&mut self, experiences: &[Experience]) -> Result<()> {
        for exp in experiences {
            let action_count = 2 * exp.state.features.len().max(1);
            if exp.action.index >= action_count {
                return Err(OptimError::InvalidConfiguration(format!(
                    "action index {} out of range for {} actions",
                    exp.action.index, action_count
                )));
            }
            let key = feature_key(&exp.state.features);
            self.update_q(&key, exp.action.index, action_count, exp.reward);
            self.epsilon = self
                .config
                .epsilon_min
                .max(self.epsilon * self.config.exploration_decay);
            self.steps += 1;
        }
        Ok(())
    }

    fn save(&self) -> Result<String> {
        let snapshot = Snapshot {
            q_table: self.q_table.clone(),
            epsilon: self.epsilon,
            improvements: self.improvements,
            steps: self.steps,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    fn load(&mut self, token: &str) -> Result<()> {
        let snapshot: Snapshot = serde_json::from_str(token)?;
        self.q_table = snapshot.q_table;
        self.epsilon = snapshot.epsilon;
        self.improvements = snapshot.improvements;
        self.steps = snapshot.steps;
        Ok(())
    }

    fn statistics(&self) -> PolicyStats {
        PolicyStats {
            epsilon: self.epsilon,
            buffer_size: 0,
            train_steps: self.steps,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
