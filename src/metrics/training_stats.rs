//! Training statistics tracking for Q-learning
//!
//! This module provides utilities for tracking and monitoring training progress,
//! including episode rewards, lengths, scores, and TD errors.

use std::collections::VecDeque;

use crate::rl::UpdateStats;

/// Training statistics tracker with rolling averages
///
/// Tracks episode-level metrics (rewards, lengths, scores) and update-level
/// metrics (mean and max absolute TD error) using rolling windows for
/// smoothed statistics.
///
/// # Example
///
/// ```rust
/// use just_jump::metrics::TrainingStats;
/// use just_jump::rl::UpdateStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// // Record an episode
/// stats.record_episode(215.0, 340, 2);
///
/// // Record a replay update
/// stats.record_update(UpdateStats { mean_td_error: 0.5, max_td_error: 4.0 });
///
/// // Get statistics
/// println!("Mean reward: {}", stats.mean_episode_reward());
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (rolling window)
    episode_scores: VecDeque<u32>,

    /// Mean absolute TD error per update (rolling window)
    td_errors: VecDeque<f32>,

    /// Largest absolute TD error per update (rolling window)
    max_td_errors: VecDeque<f32>,

    /// Best episode score seen
    best_score: u32,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment steps taken
    total_steps: usize,

    /// Total number of replay updates
    total_updates: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new training statistics tracker
    ///
    /// # Arguments
    ///
    /// * `window_size` - Number of recent values to keep for rolling averages
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            td_errors: VecDeque::with_capacity(window_size),
            max_td_errors: VecDeque::with_capacity(window_size),
            best_score: 0,
            total_episodes: 0,
            total_steps: 0,
            total_updates: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    ///
    /// # Arguments
    ///
    /// * `reward` - Total reward accumulated during the episode
    /// * `length` - Number of steps taken in the episode
    /// * `score` - Highest score reached in the episode
    ///
    /// # Example
    ///
    /// ```rust
    /// use just_jump::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_episode(15.5, 150, 5);
    ///
    /// assert_eq!(stats.total_episodes(), 1);
    /// assert_eq!(stats.total_steps(), 150);
    /// ```
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.best_score = self.best_score.max(score);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record a replay update
    pub fn record_update(&mut self, update: UpdateStats) {
        Self::push_deque(&mut self.td_errors, update.mean_td_error, self.window_size);
        Self::push_deque(&mut self.max_td_errors, update.max_td_error, self.window_size);
        self.total_updates += 1;
    }

    /// Get the mean episode reward over the rolling window
    ///
    /// # Returns
    ///
    /// The average reward, or 0.0 if no episodes have been recorded
    pub fn mean_episode_reward(&self) -> f32 {
        self.mean(&self.episode_rewards)
    }

    /// Get the mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        let sum: usize = self.episode_lengths.iter().sum();
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_lengths.len() as f32
        }
    }

    /// Get the mean episode score over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        let sum: u32 = self.episode_scores.iter().sum();
        if self.episode_scores.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_scores.len() as f32
        }
    }

    /// Get the mean absolute TD error over the rolling window
    ///
    /// # Returns
    ///
    /// The average TD error, or 0.0 if no updates have been recorded
    pub fn mean_td_error(&self) -> f32 {
        self.mean(&self.td_errors)
    }

    /// Get the mean of the per-update maximum TD error over the rolling window
    pub fn mean_max_td_error(&self) -> f32 {
        self.mean(&self.max_td_errors)
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Get the total number of episodes completed
    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Get the total number of environment steps taken
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    /// Get the window size for rolling averages
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// # Example
    ///
    /// ```rust
    /// use just_jump::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_episode(15.5, 150, 5);
    ///
    /// println!("{}", stats.format_summary());
    /// // Output: Episodes: 1 | Steps: 150 | Reward: 15.50 | Score: 5.00 | Best: 5 | Len: 150.0 | Updates: 0 | TD: 0.0000 | TD_Max: 0.0000
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Best: {} | Len: {:.1} | Updates: {} | TD: {:.4} | TD_Max: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.best_score,
            self.mean_episode_length(),
            self.total_updates,
            self.mean_td_error(),
            self.mean_max_td_error(),
        )
    }

    /// Helper function to compute mean of a VecDeque<f32>
    fn mean(&self, deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    /// Helper function to push to a deque with size limit
    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
