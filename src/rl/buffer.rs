//! Prioritized experience replay
//!
//! This module implements a fixed-capacity ring of transitions sampled in
//! proportion to their priority, together with the importance-sampling
//! weights that correct for the non-uniform sampling.

use anyhow::{Context, Result, ensure};
use rand::Rng;
use rand::seq::index;

use super::config::ReplayConfig;
use super::observation::Observation;
use crate::game::Action;

/// A single stored transition
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub state: Observation,
    pub action: Action,
    pub reward: f32,
    pub next_state: Observation,
    pub done: bool,
}

/// A batch drawn from the buffer
#[derive(Debug, Clone)]
pub struct SampledBatch {
    /// Sampled transitions
    pub experiences: Vec<Experience>,
    /// Ring positions of the sampled transitions, for priority updates
    pub indices: Vec<usize>,
    /// Importance-sampling weights; the largest is exactly 1.0
    pub weights: Vec<f32>,
}

impl SampledBatch {
    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }
}

/// Replay buffer with proportional prioritization
///
/// Every slot carries a priority; sampling draws distinct slots with
/// probability `priority^alpha / sum(priority^alpha)`. New transitions enter
/// at the current maximum priority so each is likely to be replayed at least
/// once. Once full, the oldest transition is overwritten.
///
/// # Example
///
/// ```rust
/// use just_jump::game::Action;
/// use just_jump::rl::{Experience, Observation, PrioritizedReplayBuffer, ReplayConfig};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut buffer = PrioritizedReplayBuffer::new(&ReplayConfig::default());
/// for depth in 0..8 {
///     buffer.add(Experience {
///         state: Observation::new(vec![0, depth]),
///         action: Action::Stay,
///         reward: 1.0,
///         next_state: Observation::new(vec![0, depth - 1]),
///         done: false,
///     });
/// }
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let batch = buffer.sample(4, &mut rng).unwrap();
/// assert_eq!(batch.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PrioritizedReplayBuffer {
    /// Stored transitions, at most `capacity`
    experiences: Vec<Experience>,

    /// Priority of each stored transition, parallel to `experiences`
    priorities: Vec<f32>,

    /// Next slot to write once the buffer is full
    pos: usize,

    /// Maximum buffer capacity
    capacity: usize,

    /// Prioritization exponent (0 = uniform)
    alpha: f32,

    /// Importance-sampling exponent, annealed toward 1.0
    beta: f32,

    /// Increase of `beta` per `sample` call
    beta_increment: f32,

    /// Added to every updated priority so no slot becomes unreachable
    epsilon: f32,
}

impl PrioritizedReplayBuffer {
    /// Create an empty buffer
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            experiences: Vec::with_capacity(config.capacity),
            priorities: Vec::with_capacity(config.capacity),
            pos: 0,
            capacity: config.capacity,
            alpha: config.alpha,
            beta: config.beta,
            beta_increment: config.beta_increment,
            epsilon: config.epsilon,
        }
    }

    /// Store a transition at the current maximum priority (1.0 when empty)
    pub fn add(&mut self, experience: Experience) {
        let priority = self.max_priority();

        if self.experiences.len() < self.capacity {
            self.experiences.push(experience);
            self.priorities.push(priority);
        } else {
            self.experiences[self.pos] = experience;
            self.priorities[self.pos] = priority;
        }
        self.pos = (self.pos + 1) % self.capacity;
    }

    /// Draw `batch_size` distinct transitions in proportion to their priority
    ///
    /// Fails when fewer than `batch_size` transitions are stored. Each call
    /// anneals `beta` by `beta_increment`, capped at 1.0.
    pub fn sample<R: Rng + ?Sized>(&mut self, batch_size: usize, rng: &mut R) -> Result<SampledBatch> {
        let len = self.experiences.len();
        ensure!(
            batch_size <= len,
            "cannot sample {} transitions from a buffer holding {}",
            batch_size,
            len
        );

        let scaled: Vec<f64> = self
            .priorities
            .iter()
            .map(|&p| (p as f64).powf(self.alpha as f64))
            .collect();
        let total: f64 = scaled.iter().sum();

        let indices = index::sample_weighted(rng, len, |i| scaled[i], batch_size)
            .context("Failed to draw prioritized sample")?
            .into_vec();

        let raw_weights: Vec<f64> = indices
            .iter()
            .map(|&i| (len as f64 * scaled[i] / total).powf(-(self.beta as f64)))
            .collect();
        let max_weight = raw_weights.iter().copied().fold(f64::MIN, f64::max);
        let weights = raw_weights.iter().map(|&w| (w / max_weight) as f32).collect();

        let experiences = indices.iter().map(|&i| self.experiences[i].clone()).collect();

        self.beta = (self.beta + self.beta_increment).min(1.0);

        Ok(SampledBatch {
            experiences,
            indices,
            weights,
        })
    }

    /// Replace the priorities of sampled slots with `priority + epsilon`
    ///
    /// Priorities are expected to be non-negative, e.g. absolute TD errors.
    /// Indices that no longer point at a stored transition are ignored.
    pub fn update_priorities(&mut self, indices: &[usize], priorities: &[f32]) {
        for (&i, &priority) in indices.iter().zip(priorities) {
            if let Some(slot) = self.priorities.get_mut(i) {
                *slot = priority + self.epsilon;
            }
        }
    }

    /// Largest stored priority, 1.0 for an empty buffer
    pub fn max_priority(&self) -> f32 {
        self.priorities.iter().copied().reduce(f32::max).unwrap_or(1.0)
    }

    pub fn priority(&self, index: usize) -> Option<f32> {
        self.priorities.get(index).copied()
    }

    /// Current importance-sampling exponent
    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Get current number of transitions in buffer
    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
