//! Evaluation mode for measuring trained agents
//!
//! This module loads a trained model and lets the agent play greedily
//! (no exploration, no learning) for a number of episodes, reporting the
//! score and reward of each episode and a summary at the end.
//!
//! # Example
//!
//! ```rust,no_run
//! use just_jump::modes::{EvaluateConfig, EvaluateMode};
//! use std::path::PathBuf;
//!
//! let config = EvaluateConfig::new(PathBuf::from("models/best_just_jump.bin"), 20);
//! let mut evaluate_mode = EvaluateMode::new(config);
//! let metrics = evaluate_mode.run();
//! println!("{}", metrics.format_summary());
//! ```

use log::{info, warn};
use std::path::PathBuf;

use super::train::EpisodeSummary;
use crate::game::GameConfig;
use crate::metrics::GameMetrics;
use crate::rl::persistence::load_metadata;
use crate::rl::{JumpEnvironment, QLearningAgent, QLearningConfig, load_model};

/// Configuration for evaluation mode
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    /// Model to load
    pub model_path: PathBuf,

    /// Number of episodes to play
    pub num_episodes: usize,

    /// End an episode after this many steps even if it has not terminated
    pub max_steps_per_episode: Option<usize>,

    /// Seed for the game; entropy when `None`
    pub seed: Option<u64>,

    /// Game configuration the agent plays on
    pub game_config: GameConfig,
}

impl EvaluateConfig {
    pub fn new(model_path: PathBuf, num_episodes: usize) -> Self {
        Self {
            model_path,
            num_episodes,
            max_steps_per_episode: Some(10_000),
            seed: None,
            game_config: GameConfig::default(),
        }
    }
}

/// Greedy play of a trained agent
pub struct EvaluateMode {
    agent: QLearningAgent,
    env: JumpEnvironment,
    config: EvaluateConfig,
    /// Whether a trained model was loaded
    trained: bool,
}

impl EvaluateMode {
    /// Create a new evaluation mode
    ///
    /// A model that cannot be loaded is reported and the agent plays
    /// untrained.
    pub fn new(config: EvaluateConfig) -> Self {
        let env = match config.seed {
            Some(seed) => JumpEnvironment::with_seed(config.game_config.clone(), seed),
            None => JumpEnvironment::new(config.game_config.clone()),
        };

        let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), config.seed.unwrap_or(0));
        agent.set_epsilon(0.0);

        let trained = match load_model(&config.model_path) {
            Ok(checkpoint) => {
                info!(
                    "Loaded model {:?}: {} states, best training score {:?}",
                    config.model_path,
                    checkpoint.q_table.len(),
                    checkpoint.best_score
                );
                agent.restore(checkpoint);
                true
            }
            Err(e) => {
                warn!("No model loaded, playing untrained: {:#}", e);
                false
            }
        };

        if let Ok(metadata) = load_metadata(&config.model_path) {
            let trained_on = &metadata.game_config;
            if trained_on.height_tiers != config.game_config.height_tiers
                || trained_on.scoring != config.game_config.scoring
            {
                warn!(
                    "Model was trained on {:?}/{:?} but is evaluated on {:?}/{:?}",
                    trained_on.height_tiers,
                    trained_on.scoring,
                    config.game_config.height_tiers,
                    config.game_config.scoring
                );
            }
        }

        Self {
            agent,
            env,
            config,
            trained,
        }
    }

    /// Play the configured number of episodes and return the tallies
    pub fn run(&mut self) -> GameMetrics {
        let mut metrics = GameMetrics::new();

        for episode in 0..self.config.num_episodes {
            let summary = self.run_episode();
            metrics.on_game_over(summary.score, summary.reward, summary.steps);
            info!(
                "[Episode {}/{}] Score: {} | Reward: {:.1} | Steps: {} | Peak: {:.0}",
                episode + 1,
                self.config.num_episodes,
                summary.score,
                summary.reward,
                summary.steps,
                summary.peak_height
            );
        }

        info!("Evaluation complete: {}", metrics.format_summary());
        metrics
    }

    /// Play one greedy episode, continuing from the current world state
    fn run_episode(&mut self) -> EpisodeSummary {
        let mut state = self.env.get_state();
        let mut summary = EpisodeSummary::new();

        loop {
            let action = self.agent.get_action(&state);
            let transition = self.env.step(action);

            summary.record(&transition, self.env.last_step().map(|(_, result)| &result.info));
            let done = transition.done;
            state = transition.observation;

            let capped = self
                .config
                .max_steps_per_episode
                .is_some_and(|max| summary.steps >= max);
            if done || capped {
                return summary;
            }
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }
}
