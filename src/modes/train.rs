//! Training mode for the Q-learning agent
//!
//! This module implements the training loop. It runs episodes in the
//! obstacle-track environment, stores every transition in the prioritized
//! replay buffer, performs one replay update per step once the buffer is warm,
//! and saves the best, periodic and final models.
//!
//! The world is continuous: the environment is reset once when training
//! starts, and each episode picks up where the previous one ended.
//!
//! # Example
//!
//! ```rust,no_run
//! use just_jump::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(1000, PathBuf::from("models/just_jump.bin"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::game::{GameConfig, StepInfo};
use crate::metrics::TrainingStats;
use crate::rl::{
    Experience, JumpEnvironment, QLearningAgent, QLearningConfig, Transition, load_model, save_model,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final trained model
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// End an episode after this many steps even if it has not terminated
    pub max_steps_per_episode: Option<usize>,

    /// Continue from the model at `save_path` if one can be loaded
    pub resume: bool,

    /// Seed for the game and the agent; entropy when `None`
    pub seed: Option<u64>,

    /// Game configuration (geometry, physics, rewards)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub q_config: QLearningConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use just_jump::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(1000, PathBuf::from("models/just_jump.bin"));
    /// assert_eq!(config.checkpoint_frequency, 50);
    /// ```
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            checkpoint_frequency: 50,
            log_frequency: 1,
            max_steps_per_episode: None,
            resume: false,
            seed: None,
            game_config: GameConfig::default(),
            q_config: QLearningConfig::default(),
        }
    }

    /// Where the best model so far is kept: `best_<file name>` next to `save_path`
    pub fn best_model_path(&self) -> PathBuf {
        let file_name = self
            .save_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model.bin".to_string());
        self.model_dir().join(format!("best_{}", file_name))
    }

    /// Path of the periodic checkpoint written after `episode` episodes
    pub fn checkpoint_path(&self, episode: usize) -> PathBuf {
        self.model_dir().join(format!("checkpoint_ep{}.bin", episode))
    }

    fn model_dir(&self) -> &Path {
        self.save_path.parent().unwrap_or(Path::new("."))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.checkpoint_frequency == 0 {
            return Err("checkpoint_frequency must be positive".to_string());
        }
        if self.log_frequency == 0 {
            return Err("log_frequency must be positive".to_string());
        }
        if self.max_steps_per_episode == Some(0) {
            return Err("max_steps_per_episode must be positive".to_string());
        }
        self.game_config.validate()?;
        self.q_config.validate()
    }
}

/// Outcome of one training episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// Total reward collected
    pub reward: f32,
    /// Environment steps taken
    pub steps: usize,
    /// Score reached on the last step
    pub score: u32,
    /// Highest jump of the episode
    pub peak_height: f64,
}

impl EpisodeSummary {
    pub(crate) fn new() -> Self {
        Self {
            reward: 0.0,
            steps: 0,
            score: 0,
            peak_height: 0.0,
        }
    }

    /// Fold one environment step into the summary
    pub(crate) fn record(&mut self, transition: &Transition, info: Option<&StepInfo>) {
        self.reward += transition.reward;
        self.steps += 1;
        self.score = transition.score;
        if let Some(info) = info {
            self.peak_height = self.peak_height.max(info.peak_height);
        }
    }
}

/// Training mode for the Q-learning agent
///
/// Runs the training loop, collecting experiences and updating the agent from
/// prioritized replay. Periodically logs progress and saves checkpoints.
pub struct TrainMode {
    /// Agent being trained
    agent: QLearningAgent,

    /// Environment for experience collection
    env: JumpEnvironment,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,

    /// Total steps across all episodes
    total_steps: usize,
}

impl TrainMode {
    /// Create a new training mode
    ///
    /// With `resume` set, a model at `save_path` is loaded first. A model that
    /// cannot be loaded is reported and training starts from scratch.
    pub fn new(config: TrainConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid training configuration: {}", e))?;

        let (env, mut agent) = match config.seed {
            Some(seed) => (
                JumpEnvironment::with_seed(config.game_config.clone(), seed),
                QLearningAgent::with_seed(config.q_config.clone(), seed.wrapping_add(1)),
            ),
            None => (
                JumpEnvironment::new(config.game_config.clone()),
                QLearningAgent::new(config.q_config.clone()),
            ),
        };

        if config.resume {
            match load_model(&config.save_path) {
                Ok(checkpoint) => {
                    info!(
                        "Resumed from {:?}: {} states, best score {:?}",
                        config.save_path,
                        checkpoint.q_table.len(),
                        checkpoint.best_score
                    );
                    agent.restore(checkpoint);
                }
                Err(e) => warn!("No prior model loaded, starting untrained: {:#}", e),
            }
        }

        // Rolling window of 100 episodes
        let stats = TrainingStats::new(100);

        Ok(Self {
            agent,
            env,
            stats,
            config,
            current_episode: 0,
            total_steps: 0,
        })
    }

    /// Run the training loop
    ///
    /// Trains the agent for the configured number of episodes. The best model
    /// is saved whenever an episode beats the best score, a checkpoint every
    /// `checkpoint_frequency` episodes, and the final model at the end.
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let summary = self.run_episode()?;

            self.stats
                .record_episode(summary.reward, summary.steps, summary.score);
            self.agent.increment_episode();
            self.agent.decay_epsilon();

            if self.agent.record_score(summary.score) {
                let best_path = self.config.best_model_path();
                self.save_or_warn(&best_path, "best model");
            }

            if (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1, &summary);
            }

            if (episode + 1) % self.config.checkpoint_frequency == 0 {
                let checkpoint_path = self.config.checkpoint_path(episode + 1);
                self.save_or_warn(&checkpoint_path, "checkpoint");
            }
        }

        // Final save
        self.save_model()?;

        info!("Training complete!");
        info!("Final model saved to: {:?}", self.config.save_path);
        info!("Final statistics: {}", self.stats.format_summary());

        Ok(())
    }

    /// Run a single training episode
    ///
    /// Starts from the current observation (no reset) and steps until the
    /// episode terminates or the step cap is reached.
    fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let mut state = self.env.get_state();
        let mut summary = EpisodeSummary::new();

        loop {
            let action = self.agent.get_action(&state);
            let transition = self.env.step(action);

            self.agent.store_transition(Experience {
                state,
                action,
                reward: transition.reward,
                next_state: transition.observation.clone(),
                done: transition.done,
            });

            if let Some(update) = self.agent.learn()? {
                self.stats.record_update(update);
            }

            summary.record(&transition, self.env.last_step().map(|(_, result)| &result.info));
            self.total_steps += 1;
            state = transition.observation;

            let capped = self
                .config
                .max_steps_per_episode
                .is_some_and(|max| summary.steps >= max);
            if transition.done || capped {
                break;
            }
        }

        Ok(summary)
    }

    /// Save the current agent, logging instead of failing
    fn save_or_warn(&self, path: &Path, what: &str) {
        match save_model(&self.agent, &self.config.game_config, path) {
            Ok(()) => info!("  {} saved: {:?}", what, path),
            Err(e) => warn!("  Failed to save {} to {:?}: {:#}", what, path, e),
        }
    }

    /// Save the final trained model
    fn save_model(&self) -> Result<()> {
        save_model(&self.agent, &self.config.game_config, &self.config.save_path).with_context(|| {
            format!("Failed to save final model to {:?}", self.config.save_path)
        })
    }

    /// Print training header information
    fn print_header(&self) {
        let game = &self.config.game_config;
        let q = &self.config.q_config;

        info!("{}", "=".repeat(70));
        info!("Q-Learning Training - Just Jump");
        info!("{}", "=".repeat(70));
        info!("Episodes: {}", self.config.num_episodes);
        info!(
            "Game Config: {:?} tiers, {:?} scoring, {:?} termination, {} depth/tick",
            game.height_tiers, game.scoring, game.termination, game.depth_per_tick
        );
        info!("Q-Learning Config:");
        info!("  Alpha: {}", q.alpha);
        info!("  Gamma: {}", q.gamma);
        info!(
            "  Epsilon: {} (decay {}, min {})",
            self.agent.epsilon(),
            q.epsilon_decay,
            q.epsilon_min
        );
        info!("  Batch size: {}", q.batch_size);
        info!(
            "  Replay: capacity {}, alpha {}, beta {} (+{}/sample)",
            q.replay.capacity, q.replay.alpha, q.replay.beta, q.replay.beta_increment
        );
        info!("  Learning starts at: {} transitions", q.learning_starts);
        info!("Checkpoints: Every {} episodes", self.config.checkpoint_frequency);
        info!("Logging: Every {} episodes", self.config.log_frequency);
        info!("Save path: {:?}", self.config.save_path);
        info!("{}", "=".repeat(70));
    }

    /// Print training progress
    fn print_progress(&self, episode: usize, summary: &EpisodeSummary) {
        info!(
            "[Episode {}/{}] Score: {} | Reward: {:.1} | Peak: {:.0} | Epsilon: {:.3} | States: {} | {}",
            episode,
            self.config.num_episodes,
            summary.score,
            summary.reward,
            summary.peak_height,
            self.agent.epsilon(),
            self.agent.q_table().len(),
            self.stats.format_summary()
        );
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}
