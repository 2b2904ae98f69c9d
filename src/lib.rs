//! Just Jump - an obstacle-track arcade game with a tabular Q-learning trainer
//!
//! This library provides:
//! - Core game logic: obstacle track, player physics, scoring and rewards (game module)
//! - RL infrastructure: observations, prioritized replay, Q-learning agent, persistence (rl module)
//! - Training and evaluation modes (modes module)
//! - Training and play statistics (metrics module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
