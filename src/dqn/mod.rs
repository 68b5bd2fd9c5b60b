//! Deep value-function control policy (DQN-style).
//!
//! An epsilon-greedy agent over a pluggable batch value approximator, with
//! experience replay and a periodically synchronized target approximator to
//! stabilize learning targets. Independent of resource allocation: usable
//! wherever a general MDP-style control policy is needed.
//!
//! # Key Types
//!
//! - [`DqnConfig`]: replay, exploration, discount, and sync parameters
//! - [`DqnAgent`]: the agent, generic over [`ValueApproximator`]
//! - [`ReplayBuffer`]: fixed-capacity circular experience store
//! - [`LinearApproximator`]: built-in per-action linear backend
//!
//! # References
//!
//! - Mnih et al. (2015), *Human-level control through deep reinforcement
//!   learning*

mod agent;
mod approximator;
mod config;
mod replay;

pub use agent::DqnAgent;
pub use approximator::{LinearApproximator, ValueApproximator};
pub use config::DqnConfig;
pub use replay::ReplayBuffer;
