use super::observation::{Observation, create_observation};
use crate::game::{Action, GameConfig, GameEngine, GameState, StepResult};

/// Outcome of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    /// Score reached during the step, before a terminating reset
    pub score: u32,
}

/// Obstacle-track environment for reinforcement learning
///
/// Wraps the game engine and provides the RL interface:
/// - Integer observation vectors (see [`create_observation`])
/// - Discrete action space (4 actions: Left, Stay, Right, Jump)
/// - Standard RL interface (reset, step, get_state)
///
/// The environment never draws. A presentation layer polls [`Self::state`]
/// and [`Self::last_step`] after each `step` call.
pub struct JumpEnvironment {
    engine: GameEngine,
    state: GameState,
    last_step: Option<(Action, StepResult)>,
}

impl JumpEnvironment {
    /// Create a new environment
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }

    /// Create an environment whose obstacle sequence is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_engine(GameEngine::with_seed(config, seed))
    }

    fn from_engine(mut engine: GameEngine) -> Self {
        let state = engine.reset();
        Self {
            engine,
            state,
            last_step: None,
        }
    }

    /// Reset the environment and return initial observation
    pub fn reset(&mut self) -> Observation {
        self.state = self.engine.reset();
        self.last_step = None;
        self.get_state()
    }

    /// Step the environment with an action
    ///
    /// Returns the next observation, the reward, whether the episode ended
    /// and the score reached during the step.
    pub fn step(&mut self, action: Action) -> Transition {
        let result = self.engine.step(&mut self.state, action);
        let transition = Transition {
            observation: self.get_state(),
            reward: result.reward,
            done: result.terminated,
            score: result.score,
        };
        self.last_step = Some((action, result));
        transition
    }

    /// Get current observation without stepping
    pub fn get_state(&self) -> Observation {
        create_observation(&self.state, self.engine.config())
    }

    /// Get reference to current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The most recent action and its result, if any step happened since reset
    pub fn last_step(&self) -> Option<&(Action, StepResult)> {
        self.last_step.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::observation::observation_size;

    #[test]
    fn test_environment_creation() {
        let env = JumpEnvironment::with_seed(GameConfig::default(), 1);

        assert_eq!(env.state().score, 0);
        assert_eq!(env.state().steps, 0);
        assert!(env.last_step().is_none());
    }

    #[test]
    fn test_reset_returns_valid_observation() {
        let config = GameConfig::default();
        let mut env = JumpEnvironment::with_seed(config.clone(), 2);

        let obs = env.reset();
        assert_eq!(obs.len(), observation_size(&config));
        assert_eq!(obs.values()[1], config.spawn.first_depth);
    }

    #[test]
    fn test_get_state_is_idempotent() {
        let mut env = JumpEnvironment::with_seed(GameConfig::pluck_stars(), 3);
        env.step(Action::Right);

        assert_eq!(env.get_state(), env.get_state());
    }

    #[test]
    fn test_step_matches_get_state() {
        let mut env = JumpEnvironment::with_seed(GameConfig::default(), 4);

        let transition = env.step(Action::Stay);
        assert_eq!(transition.observation, env.get_state());
        assert!(!transition.done);
        assert_eq!(env.state().steps, 1);

        let (action, result) = env.last_step().unwrap();
        assert_eq!(*action, Action::Stay);
        assert_eq!(result.reward, transition.reward);
    }

    #[test]
    fn test_head_approaches_each_grounded_step() {
        let config = GameConfig::default();
        let mut env = JumpEnvironment::with_seed(config.clone(), 5);
        let before = env.get_state().values()[1];

        let after = env.step(Action::Left).observation.values()[1];
        assert_eq!(before - after, config.depth_per_tick);
    }

    #[test]
    fn test_one_tier_episode_ends_when_stars_pass() {
        let mut env = JumpEnvironment::with_seed(GameConfig::pluck_stars(), 6);

        let mut done = false;
        let mut steps = 0;
        while !done && steps < 1000 {
            done = env.step(Action::Stay).done;
            steps += 1;
        }

        // Standing still never touches a star; the first one retires after 340 ticks
        assert!(done);
        assert_eq!(steps, 340);
        assert_eq!(env.state().score, 0);
    }

    #[test]
    fn test_reset_clears_last_step() {
        let mut env = JumpEnvironment::with_seed(GameConfig::default(), 7);
        env.step(Action::Jump);
        assert!(env.last_step().is_some());

        env.reset();
        assert!(env.last_step().is_none());
        assert_eq!(env.state().steps, 0);
    }
}
