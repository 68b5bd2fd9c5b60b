//! Sequential-decision contracts shared by both learning agents.
//!
//! A [`Policy`] is the stable surface of any decision component: pick an
//! action for a state, learn from experience, and round-trip its learned
//! parameters through an opaque snapshot token. Both the tabular refinement
//! agent and the deep value-function agent implement it, so callers can swap
//! one for the other at the seam.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An MDP state: an opaque feature vector plus a terminal flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Feature values. Interpretation is owned by the environment.
    pub features: Vec<f64>,
    /// Whether this state ends the episode.
    pub terminal: bool,
}

impl State {
    /// Non-terminal state from raw features.
    pub fn new(features: Vec<f64>) -> Self {
        Self {
            features,
            terminal: false,
        }
    }

    /// Terminal state from raw features.
    pub fn terminal(features: Vec<f64>) -> Self {
        Self {
            features,
            terminal: true,
        }
    }
}

/// An action: an index into a finite action space, with an optional
/// associated magnitude for environments whose actions carry one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Index into the environment's action space.
    pub index: usize,
    /// Optional magnitude associated with the action.
    pub value: Option<f64>,
}

impl Action {
    /// Plain index action with no associated value.
    pub fn index(index: usize) -> Self {
        Self { index, value: None }
    }
}

/// One atomic learning unit: `(s, a, r, s', done)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: State,
    pub action: Action,
    pub reward: f64,
    pub next_state: State,
    pub done: bool,
}

impl Experience {
    pub fn new(state: State, action: Action, reward: f64, next_state: State, done: bool) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Runtime counters exposed by every policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyStats {
    /// Current exploration rate.
    pub epsilon: f64,
    /// Number of stored experiences (0 for agents without a buffer).
    pub buffer_size: usize,
    /// Learning steps performed so far.
    pub train_steps: u64,
}

/// The stable action-selection / learning contract.
///
/// `save` returns an opaque token; feeding that token to `load` on a
/// freshly constructed agent of the same shape restores equivalent
/// behavior (identical greedy actions for identical inputs).
pub trait Policy {
    /// Selects an action for `state` under the current exploration policy.
    fn get_action(&mut self, state: &State) -> Result<Action>;

    /// Ingests a batch of experiences and triggers learning.
    fn update_policy(&mut self, experiences: &[Experience]) -> Result<()>;

    /// Serializes learned parameters into an opaque token.
    fn save(&self) -> Result<String>;

    /// Restores learned parameters from a token produced by [`save`](Policy::save).
    fn load(&mut self, token: &str) -> Result<()>;

    /// Current exploration/learning counters.
    fn statistics(&self) -> PolicyStats;
}

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: State,
    pub reward: f64,
    pub done: bool,
}

/// An external MDP environment, consumed (never produced) by this crate.
pub trait Environment {
    /// Resets the environment and returns the initial state.
    fn reset(&mut self) -> State;

    /// Applies an action and returns the resulting transition.
    fn step(&mut self, action: Action) -> Transition;

    /// The finite action space.
    fn action_space(&self) -> Vec<Action>;
}
