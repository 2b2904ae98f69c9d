//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the prioritized replay buffer
///
/// # Example
///
/// ```rust
/// use just_jump::rl::ReplayConfig;
///
/// let config = ReplayConfig {
///     capacity: 500,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Maximum number of stored transitions
    ///
    /// Default: 10000
    pub capacity: usize,

    /// Prioritization exponent; 0 samples uniformly
    ///
    /// Default: 0.6
    pub alpha: f32,

    /// Initial importance-sampling exponent
    ///
    /// Default: 0.4
    pub beta: f32,

    /// Increase of beta per sample call, until it reaches 1.0
    ///
    /// Default: 0.001
    pub beta_increment: f32,

    /// Added to every updated priority
    ///
    /// Default: 1e-6
    pub epsilon: f32,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            alpha: 0.6,
            beta: 0.4,
            beta_increment: 0.001,
            epsilon: 1e-6,
        }
    }
}

impl ReplayConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be positive".to_string());
        }

        if self.alpha < 0.0 {
            return Err(format!("alpha must be non-negative, got {}", self.alpha));
        }

        if !(0.0..=1.0).contains(&self.beta) {
            return Err(format!("beta must be in [0, 1], got {}", self.beta));
        }

        if self.beta_increment < 0.0 {
            return Err(format!(
                "beta_increment must be non-negative, got {}",
                self.beta_increment
            ));
        }

        if self.epsilon <= 0.0 {
            return Err(format!("epsilon must be positive, got {}", self.epsilon));
        }

        Ok(())
    }
}

/// Configuration for the tabular Q-learning agent
///
/// # Example
///
/// ```rust
/// use just_jump::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     epsilon: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Learning rate of the tabular update
    ///
    /// Default: 0.1
    pub alpha: f32,

    /// Discount factor for future rewards
    ///
    /// Default: 0.95
    pub gamma: f32,

    /// Initial exploration rate
    ///
    /// Default: 1.0
    pub epsilon: f32,

    /// Multiplier applied to epsilon after every episode
    ///
    /// Default: 0.995
    pub epsilon_decay: f32,

    /// Lower bound of the exploration rate
    ///
    /// Default: 0.01
    pub epsilon_min: f32,

    /// Transitions per replay update
    ///
    /// Default: 64
    pub batch_size: usize,

    /// Buffer occupancy at which updates begin
    ///
    /// Default: 5000 (half the default capacity)
    pub learning_starts: usize,

    pub replay: ReplayConfig,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        let replay = ReplayConfig::default();
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            batch_size: 64,
            learning_starts: replay.capacity / 2,
            replay,
        }
    }
}

impl QLearningConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.alpha) || self.alpha == 0.0 {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(format!("epsilon must be in [0, 1], got {}", self.epsilon));
        }

        if !(0.0..=1.0).contains(&self.epsilon_decay) {
            return Err(format!(
                "epsilon_decay must be in [0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(format!(
                "epsilon_min must be in [0, 1], got {}",
                self.epsilon_min
            ));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be positive".to_string());
        }

        self.replay.validate()?;

        if self.batch_size > self.replay.capacity {
            return Err(format!(
                "batch_size ({}) cannot exceed replay capacity ({})",
                self.batch_size, self.replay.capacity
            ));
        }

        if self.learning_starts < self.batch_size || self.learning_starts > self.replay.capacity {
            return Err(format!(
                "learning_starts ({}) must be in [batch_size, capacity] = [{}, {}]",
                self.learning_starts, self.batch_size, self.replay.capacity
            ));
        }

        Ok(())
    }
}
