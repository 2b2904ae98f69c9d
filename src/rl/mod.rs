//! Reinforcement learning for the obstacle track
//!
//! Provides:
//! - Integer observation vectors used directly as Q-table keys
//! - An RL environment interface over the game engine
//! - Prioritized experience replay
//! - A tabular Q-learning agent and its hyperparameter configuration
//! - Compressed checkpoint persistence

pub mod agent;
pub mod buffer;
pub mod config;
pub mod environment;
pub mod observation;
pub mod persistence;
pub mod q_table;

pub use agent::{QLearningAgent, UpdateStats};
pub use buffer::{Experience, PrioritizedReplayBuffer, SampledBatch};
pub use config::{QLearningConfig, ReplayConfig};
pub use environment::{JumpEnvironment, Transition};
pub use observation::{Observation, create_observation, observation_size};
pub use persistence::{Checkpoint, ModelMetadata, load_model, save_model};
pub use q_table::{ActionValues, QTable};
