//! Deep value-function agent with experience replay and a target network.

use rand::rngs::StdRng;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::approximator::{LinearApproximator, ValueApproximator};
use super::config::DqnConfig;
use super::replay::ReplayBuffer;
use crate::error::{OptimError, Result};
use crate::policy::{Action, Environment, Experience, Policy, PolicyStats, State};
use crate::random::rng_from_seed;

/// Serialized form of the agent's learned state.
///
/// The replay buffer is transient and deliberately not persisted; a restored
/// agent starts with an empty buffer but identical value functions.
#[derive(Serialize, Deserialize)]
struct Snapshot<A> {
    epsilon: f64,
    train_steps: u64,
    online: A,
    target: A,
}

/// Value-function control policy over a general MDP.
///
/// Generic over the numeric backend: replay, epsilon-greedy selection,
/// batched temporal-difference targets, and periodic target synchronization
/// are all written against [`ValueApproximator`] alone. Each instance owns
/// its buffer, approximators, and RNG exclusively.
pub struct DqnAgent<A: ValueApproximator> {
    config: DqnConfig,
    online: A,
    target: A,
    buffer: ReplayBuffer,
    epsilon: f64,
    train_steps: u64,
    rng: StdRng,
}

impl DqnAgent<LinearApproximator> {
    /// Creates an agent backed by the built-in linear approximator.
    pub fn linear(config: DqnConfig) -> Result<Self> {
        let online = LinearApproximator::new(
            config.state_dim,
            config.action_count,
            config.learning_rate,
        );
        let target = online.clone();
        Self::with_approximators(config, online, target)
    }
}

impl<A: ValueApproximator> DqnAgent<A> {
    /// Creates an agent from a validated config and a pre-built backend.
    ///
    /// `target` is immediately synchronized to `online` so both start with
    /// identical parameters.
    pub fn with_approximators(config: DqnConfig, online: A, mut target: A) -> Result<Self> {
        config.validate()?;
        if online.action_count() != config.action_count {
            return Err(OptimError::InvalidConfiguration(format!(
                "approximator has {} actions but config declares {}",
                online.action_count(),
                config.action_count
            )));
        }
        target.copy_parameters_from(&online);
        let rng = rng_from_seed(config.seed);
        let buffer = ReplayBuffer::new(config.buffer_capacity);
        let epsilon = config.epsilon;
        Ok(Self {
            config,
            online,
            target,
            buffer,
            epsilon,
            train_steps: 0,
            rng,
        })
    }

    /// Epsilon-greedy action for `state`; greedy ties break on the first
    /// maximum, and non-finite predicted values always lose.
    pub fn select_action(&mut self, state: &State) -> Result<Action> {
        if state.features.len() != self.config.state_dim {
            return Err(OptimError::InvalidConfiguration(format!(
                "state has {} features but the agent expects {}",
                state.features.len(),
                self.config.state_dim
            )));
        }
        if self.rng.random_range(0.0..1.0) < self.epsilon {
            return Ok(Action::index(
                self.rng.random_range(0..self.config.action_count),
            ));
        }
        let outputs = self.online.predict(std::slice::from_ref(&state.features));
        let values = &outputs[0];
        let mut best = 0usize;
        let mut best_value = f64::NEG_INFINITY;
        for (i, v) in values.iter().enumerate() {
            if v.is_finite() && *v > best_value {
                best = i;
                best_value = *v;
            }
        }
        Ok(Action {
            index: best,
            value: best_value.is_finite().then_some(best_value),
        })
    }

    /// Records a transition in the replay buffer.
    pub fn store(&mut self, experience: Experience) {
        self.buffer.push(experience);
    }

    /// Runs one learning step if enough experiences are stored.
    ///
    /// Returns `Ok(true)` when a step was performed. Non-finite rewards or
    /// approximator outputs surface [`OptimError::NumericInstability`]
    /// before any parameter is touched.
    pub fn learn(&mut self) -> Result<bool> {
        if self.buffer.len() < self.config.batch_size {
            return Ok(false);
        }

        let batch: Vec<Experience> = self
            .buffer
            .sample(self.config.batch_size, &mut self.rng)
            .into_iter()
            .cloned()
            .collect();

        let states: Vec<Vec<f64>> = batch.iter().map(|e| e.state.features.clone()).collect();
        let next_states: Vec<Vec<f64>> =
            batch.iter().map(|e| e.next_state.features.clone()).collect();

        let mut targets = self.online.predict(&states);
        let next_values = self.target.predict(&next_states);

        for (i, exp) in batch.iter().enumerate() {
            if !exp.reward.is_finite() {
                return Err(OptimError::NumericInstability {
                    context: "experience reward".into(),
                });
            }
            let target_value = if exp.done {
                exp.reward
            } else {
                let max_next = next_values[i]
                    .iter()
                    .cloned()
                    .fold(f64::NEG_INFINITY, f64::max);
                if !max_next.is_finite() {
                    return Err(OptimError::NumericInstability {
                        context: "target approximator output".into(),
                    });
                }
                exp.reward + self.config.discount_factor * max_next
            };
            if exp.action.index >= self.config.action_count {
                return Err(OptimError::InvalidConfiguration(format!(
                    "action index {} out of range for {} actions",
                    exp.action.index, self.config.action_count
                )));
            }
            targets[i][exp.action.index] = target_value;
        }

        self.online.fit(&states, &targets)?;
        self.train_steps += 1;

        if self.train_steps % self.config.target_update_frequency == 0 {
            self.target.copy_parameters_from(&self.online);
            trace!(train_steps = self.train_steps, "target network synchronized");
        }

        self.epsilon = self
            .config
            .epsilon_min
            .max(self.epsilon * self.config.epsilon_decay);

        Ok(true)
    }

    /// Drives one full episode against an environment: select, step, store,
    /// learn. Returns the total reward collected.
    pub fn run_episode<E: Environment>(&mut self, env: &mut E, max_steps: usize) -> Result<f64> {
        let mut state = env.reset();
        let mut total_reward = 0.0;
        for _ in 0..max_steps {
            let action = self.select_action(&state)?;
            let transition = env.step(action);
            total_reward += transition.reward;
            self.store(Experience::new(
                state,
                action,
                transition.reward,
                transition.next_state.clone(),
                transition.done,
            ));
            self.learn()?;
            if transition.done {
                break;
            }
            state = transition.next_state;
        }
        debug!(total_reward, epsilon = self.epsilon, "episode finished");
        Ok(total_reward)
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Learning steps performed so far.
    pub fn train_steps(&self) -> u64 {
        self.train_steps
    }

    /// Stored experience count.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl<A> Policy for DqnAgent<A>
where
    A: ValueApproximator + Serialize + DeserializeOwned,
{
    fn get_action(&mut self, state: &State) -> Result<Action> {
        self.select_action(state)
    }

    fn update_policy(&mut self, experiences: &[Experience]) -> Result<()> {
        for exp in experiences {
            self.store(exp.clone());
        }
        self.learn()?;
        Ok(())
    }

    fn save(&self) -> Result<String> {
        let snapshot = Snapshot {
            epsilon: self.epsilon,
            train_steps: self.train_steps,
            online: &self.online,
            target: &self.target,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    fn load(&mut self, token: &str) -> Result<()> {
        let snapshot: Snapshot<A> = serde_json::from_str(token)?;
        self.epsilon = snapshot.epsilon;
        self.train_steps = snapshot.train_steps;
        self.online = snapshot.online;
        self.target = snapshot.target;
        Ok(())
    }

    fn statistics(&self) -> PolicyStats {
        PolicyStats {
            epsilon: self.epsilon,
            buffer_size: self.buffer.len(),
            train_steps: self.train_steps,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Transition;

    /// Two-action bandit: action 0 always pays +1, action 1 always −1.
    /// Every step is terminal.
    struct TwoArmEnv;

    impl Environment for TwoArmEnv {
        fn reset(&mut self) -> State {
            State::new(vec![1.0])
        }

        fn step(&mut self, action: Action) -> Transition {
            let reward = if action.index == 0 { 1.0 } else { -1.0 };
            Transition {
                next_state: State::terminal(vec![1.0]),
                reward,
                done: true,
            }
        }

        fn action_space(&self) -> Vec<Action> {
            vec![Action::index(0), Action::index(1)]
        }
    }

    fn small_config() -> DqnConfig {
        DqnConfig::new(1, 2)
            .with_buffer_capacity(1_000)
            .with_batch_size(16)
            .with_discount_factor(0.9)
            .with_epsilon(1.0)
            .with_epsilon_min(0.05)
            .with_epsilon_decay(0.9)
            .with_target_update_frequency(5)
            .with_learning_rate(0.1)
            .with_seed(42)
    }

    fn reward_experience(reward: f64, action: usize) -> Experience {
        Experience::new(
            State::new(vec![1.0]),
            Action::index(action),
            reward,
            State::terminal(vec![1.0]),
            true,
        )
    }

    #[test]
    fn test_scenario_d_learns_the_rewarding_arm() {
        let mut agent = DqnAgent::linear(small_config()).unwrap();
        let mut env = TwoArmEnv;

        for _ in 0..300 {
            agent.run_episode(&mut env, 1).unwrap();
        }
        assert!((agent.epsilon() - 0.05).abs() < 1e-12, "epsilon at floor");

        let state = State::new(vec![1.0]);
        let mut zero_count = 0u32;
        let trials = 1_000;
        for _ in 0..trials {
            if agent.select_action(&state).unwrap().index == 0 {
                zero_count += 1;
            }
        }
        assert!(
            zero_count as f64 / trials as f64 > 0.9,
            "expected >90% action 0 at epsilon floor, got {zero_count}/{trials}"
        );
    }

    #[test]
    fn test_no_learning_below_batch_size() {
        let mut agent = DqnAgent::linear(small_config()).unwrap();
        for _ in 0..15 {
            agent.store(reward_experience(1.0, 0));
        }
        assert!(!agent.learn().unwrap());
        assert_eq!(agent.train_steps(), 0);
        agent.store(reward_experience(1.0, 0));
        assert!(agent.learn().unwrap());
        assert_eq!(agent.train_steps(), 1);
    }

    #[test]
    fn test_epsilon_decays_monotonically_with_floor() {
        let mut agent = DqnAgent::linear(small_config()).unwrap();
        for _ in 0..16 {
            agent.store(reward_experience(0.5, 0));
        }
        let mut previous = agent.epsilon();
        for _ in 0..100 {
            agent.learn().unwrap();
            let current = agent.epsilon();
            assert!(current <= previous, "epsilon increased: {previous} -> {current}");
            assert!(current >= 0.05 - 1e-12, "epsilon fell below the floor");
            previous = current;
        }
        assert!((previous - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_target_syncs_on_schedule() {
        let config = small_config().with_target_update_frequency(3);
        let mut agent = DqnAgent::linear(config).unwrap();
        for i in 0..16 {
            agent.store(reward_experience(if i % 2 == 0 { 1.0 } else { -1.0 }, i % 2));
        }

        agent.learn().unwrap();
        assert_ne!(
            agent.target, agent.online,
            "target must lag the online net between syncs"
        );
        agent.learn().unwrap();
        agent.learn().unwrap();
        assert_eq!(
            agent.target, agent.online,
            "target must equal the online net right after a sync"
        );
    }

    #[test]
    fn test_greedy_ties_break_on_first_maximum() {
        // Zero-initialized approximator: every action ties at 0.
        let config = small_config().with_epsilon(0.0).with_epsilon_min(0.0);
        let mut agent = DqnAgent::linear(config).unwrap();
        let action = agent.select_action(&State::new(vec![1.0])).unwrap();
        assert_eq!(action.index, 0);
    }

    #[test]
    fn test_nan_reward_surfaces_numeric_instability() {
        let mut agent = DqnAgent::linear(small_config().with_batch_size(4)).unwrap();
        for _ in 0..4 {
            agent.store(reward_experience(f64::NAN, 0));
        }
        let err = agent.learn().unwrap_err();
        assert!(matches!(err, OptimError::NumericInstability { .. }));
    }

    #[test]
    fn test_state_dimension_mismatch_fails_fast() {
        let mut agent = DqnAgent::linear(small_config()).unwrap();
        let err = agent
            .select_action(&State::new(vec![1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, OptimError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_update_policy_ingests_and_learns() {
        let mut agent = DqnAgent::linear(small_config().with_batch_size(8)).unwrap();
        let batch: Vec<Experience> = (0..8).map(|_| reward_experience(1.0, 0)).collect();
        agent.update_policy(&batch).unwrap();
        assert_eq!(agent.statistics().buffer_size, 8);
        assert_eq!(agent.statistics().train_steps, 1);
    }

    #[test]
    fn test_seeded_agents_behave_identically() {
        let make = || {
            let mut agent = DqnAgent::linear(small_config()).unwrap();
            let mut env = TwoArmEnv;
            for _ in 0..50 {
                agent.run_episode(&mut env, 1).unwrap();
            }
            agent
        };
        let a = make();
        let b = make();
        assert_eq!(a.online, b.online);
        assert_eq!(a.epsilon(), b.epsilon());
        assert_eq!(a.save().unwrap(), b.save().unwrap());
    }

    #[test]
    fn test_save_load_round_trips_greedy_behavior() {
        let mut trained = DqnAgent::linear(small_config()).unwrap();
        let mut env = TwoArmEnv;
        for _ in 0..100 {
            trained.run_episode(&mut env, 1).unwrap();
        }
        let token = trained.save().unwrap();

        let mut restored =
            DqnAgent::linear(small_config().with_epsilon(0.0).with_epsilon_min(0.0)).unwrap();
        restored.load(&token).unwrap();

        assert_eq!(restored.online, trained.online);
        assert_eq!(restored.target, trained.target);
        assert_eq!(restored.statistics().train_steps, trained.train_steps());
        // Buffer is transient: not part of the snapshot.
        assert_eq!(restored.statistics().buffer_size, 0);

        // Greedy behavior matches at the same epsilon.
        restored.epsilon = 0.0;
        trained.epsilon = 0.0;
        let state = State::new(vec![1.0]);
        assert_eq!(
            restored.get_action(&state).unwrap().index,
            trained.get_action(&state).unwrap().index
        );
    }
}
