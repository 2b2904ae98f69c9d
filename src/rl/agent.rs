//! Tabular Q-learning agent with prioritized replay
//!
//! This module implements epsilon-greedy action selection over a sparse
//! Q-table and importance-weighted TD updates from replayed transitions.

use anyhow::Result;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::buffer::{Experience, PrioritizedReplayBuffer, SampledBatch};
use super::config::QLearningConfig;
use super::observation::Observation;
use super::persistence::Checkpoint;
use super::q_table::QTable;
use crate::game::Action;

/// Summary of one replay update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateStats {
    /// Mean absolute TD error over the batch
    pub mean_td_error: f32,
    /// Largest absolute TD error in the batch
    pub max_td_error: f32,
}

/// Q-learning agent for reinforcement learning
///
/// Owns the Q-table, the replay buffer and the exploration schedule.
///
/// # Example
///
/// ```rust
/// use just_jump::rl::{Observation, QLearningAgent, QLearningConfig};
///
/// let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), 7);
/// agent.set_epsilon(0.0);
///
/// let state = Observation::new(vec![0, 3400, 1]);
/// let action = agent.get_action(&state);
/// assert_eq!(action.index(), 0); // untrained rows tie; the lowest index wins
/// ```
pub struct QLearningAgent {
    /// State to action-value table
    q_table: QTable,

    /// Prioritized experience replay
    buffer: PrioritizedReplayBuffer,

    /// Hyperparameters
    config: QLearningConfig,

    /// Current exploration rate
    epsilon: f32,

    /// Best episode score seen so far
    best_score: Option<u32>,

    /// Number of replay updates performed
    training_step: usize,

    /// Episode counter
    episodes_trained: usize,

    rng: StdRng,
}

impl QLearningAgent {
    /// Create a new agent with an empty table
    pub fn new(config: QLearningConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Create an agent with reproducible exploration and sampling
    pub fn with_seed(config: QLearningConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: QLearningConfig, rng: StdRng) -> Self {
        Self {
            q_table: QTable::new(),
            buffer: PrioritizedReplayBuffer::new(&config.replay),
            epsilon: config.epsilon,
            config,
            best_score: None,
            training_step: 0,
            episodes_trained: 0,
            rng,
        }
    }

    /// Epsilon-greedy action selection
    ///
    /// With probability epsilon a uniformly random action, otherwise the
    /// greedy action (ties resolve to the lowest index).
    pub fn get_action(&mut self, state: &Observation) -> Action {
        if self.rng.gen_bool(self.epsilon.clamp(0.0, 1.0) as f64) {
            Action::ALL[self.rng.gen_range(0..Action::ALL.len())]
        } else {
            self.q_table.best_action(state)
        }
    }

    /// Store a transition in the replay buffer
    pub fn store_transition(&mut self, experience: Experience) {
        self.buffer.add(experience);
    }

    /// Check whether the buffer holds enough transitions to learn from
    pub fn should_update(&self) -> bool {
        self.buffer.len() >= self.config.learning_starts
    }

    /// Sample a batch and apply one update, once learning has started
    ///
    /// Returns `None` while the buffer is still below `learning_starts`.
    pub fn learn(&mut self) -> Result<Option<UpdateStats>> {
        if !self.should_update() {
            return Ok(None);
        }
        let batch = self.buffer.sample(self.config.batch_size, &mut self.rng)?;
        Ok(Some(self.update(&batch)))
    }

    /// Apply importance-weighted TD updates for a sampled batch
    ///
    /// For each transition the target is `r + gamma * max Q(s')`, or just
    /// `r` when the transition ended the episode. The new priority of each
    /// sampled slot is its absolute TD error.
    pub fn update(&mut self, batch: &SampledBatch) -> UpdateStats {
        let mut td_errors = Vec::with_capacity(batch.len());

        for (experience, &weight) in batch.experiences.iter().zip(&batch.weights) {
            let next_max = self.q_table.max_value(&experience.next_state);
            let future = if experience.done { 0.0 } else { next_max };
            let target = experience.reward + self.config.gamma * future;

            let q = &mut self.q_table.get_or_create(&experience.state)[experience.action.index()];
            let td_error = target - *q;
            *q += self.config.alpha * weight * td_error;

            td_errors.push(td_error.abs());
        }

        self.buffer.update_priorities(&batch.indices, &td_errors);
        self.training_step += 1;

        let stats = UpdateStats {
            mean_td_error: td_errors.iter().sum::<f32>() / td_errors.len().max(1) as f32,
            max_td_error: td_errors.iter().copied().fold(0.0, f32::max),
        };
        debug!(
            "update {}: mean |td| {:.4}, max |td| {:.4}, beta {:.3}",
            self.training_step,
            stats.mean_td_error,
            stats.max_td_error,
            self.buffer.beta()
        );
        stats
    }

    /// Anneal the exploration rate after an episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override the exploration rate (0.0 for greedy evaluation)
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }

    /// Record an episode score; returns true if it is a new best
    pub fn record_score(&mut self, score: u32) -> bool {
        let improved = self.best_score.is_none_or(|best| score > best);
        if improved {
            self.best_score = Some(score);
        }
        improved
    }

    pub fn best_score(&self) -> Option<u32> {
        self.best_score
    }

    /// Snapshot of everything a checkpoint stores
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            q_table: self.q_table.clone(),
            best_score: self.best_score,
        }
    }

    /// Replace the table and best score with a loaded checkpoint
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.q_table = checkpoint.q_table;
        self.best_score = checkpoint.best_score;
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn buffer(&self) -> &PrioritizedReplayBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn training_step(&self) -> usize {
        self.training_step
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    pub fn increment_episode(&mut self) {
        self.episodes_trained += 1;
    }
}
