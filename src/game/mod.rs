//! Core game logic for the obstacle track
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! It is driven programmatically by the RL environment and the evaluation mode.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;
pub mod track;

// Re-export commonly used types
pub use action::{ACTION_COUNT, Action};
pub use config::{GameConfig, HeightTiers, Rewards, ScoringPolicy, SpawnRules, TerminationPolicy};
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{GameState, HeightTier, Obstacle, Player};
pub use track::ObstacleTrack;
