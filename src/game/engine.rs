use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    action::Action,
    config::{GameConfig, ScoringPolicy, TerminationPolicy},
    state::{GameState, HeightTier, Player},
    track::ObstacleTrack,
};

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Physics sub-steps spent airborne (0 for grounded actions)
    pub airborne_ticks: u32,
    /// Highest point reached during a jump
    pub peak_height: f64,
    /// Whether the head obstacle was scored during this step
    pub scored: bool,
    /// Whether the player collided with an obstacle
    pub collided: bool,
    /// Number of obstacles that left the track
    pub retired: usize,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the episode has ended
    pub terminated: bool,
    /// Score reached during this step, before any reset caused by termination
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Progress of a single jump
#[derive(Debug, Clone, Default)]
struct Jump {
    reward: f32,
    /// Highest score reached so far in the jump
    score: u32,
    /// Vertical distance above the obstacle top at first clearance
    clearance_gap: Option<f64>,
    info: StepInfo,
    terminated: bool,
}

/// The game engine that handles all game logic
///
/// The engine never draws anything; a presentation layer polls the state
/// after each `step`.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine whose obstacle sequence is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let track = ObstacleTrack::new(&self.config, &mut self.rng);
        GameState::new(Player::new(self.config.jump_speed), track)
    }

    /// Execute one action
    ///
    /// Lateral actions take a single tick. A jump runs physics sub-steps
    /// until the player lands again.
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        let result = match action {
            Action::Jump => self.jump(state),
            Action::Left | Action::Stay | Action::Right => self.move_laterally(state, action),
        };
        state.steps += 1;
        result
    }

    fn move_laterally(&mut self, state: &mut GameState, action: Action) -> StepResult {
        let head = *state.track.head();
        let offset = state.head_offset();
        let mut reward = self.lateral_reward(action, offset, head.tier);

        state.player.shift(
            action.lateral_direction() * self.config.lateral_speed,
            self.config.player_bound(),
        );
        state.track.advance(self.config.depth_per_tick);

        let score = state.score;
        let mut info = StepInfo::default();
        let mut terminated = false;

        if self.config.termination == TerminationPolicy::OnCollision && self.collides(state) {
            reward += self.config.rewards.collision_penalty;
            state.score = 0;
            state.track.pop_head();
            info.collided = true;
            terminated = true;
        }

        terminated |= self.retire_and_refill(state, &mut info);

        StepResult {
            reward,
            terminated,
            score,
            info,
        }
    }

    /// Reward for a grounded action given the head obstacle's offset
    /// (obstacle x minus player x, measured before the move)
    ///
    /// Small obstacles should be straddled, tall ones dodged. The tall-tier
    /// thresholds are not mirror images of each other: at zero offset both
    /// Left and Right earn the dodge reward.
    fn lateral_reward(&self, action: Action, offset: i32, tier: HeightTier) -> f32 {
        let window = self.config.scoring_window;
        let rewards = &self.config.rewards;

        match (action, tier) {
            (Action::Stay, tier) => {
                let sign = tier.signum() as f32;
                if offset.abs() <= window {
                    rewards.align_reward * sign
                } else {
                    -rewards.align_reward * sign
                }
            }
            (Action::Left, HeightTier::Small) => {
                if offset >= window {
                    -rewards.align_reward
                } else if offset <= -window {
                    rewards.align_reward
                } else {
                    0.0
                }
            }
            (Action::Right, HeightTier::Small) => {
                if offset <= -window {
                    -rewards.align_reward
                } else if offset >= window {
                    rewards.align_reward
                } else {
                    0.0
                }
            }
            (Action::Left, HeightTier::Tall) => {
                if -window < offset && offset < 0 {
                    -rewards.dodge_reward
                } else if (0..window).contains(&offset) {
                    rewards.dodge_reward
                } else {
                    0.0
                }
            }
            (Action::Right, HeightTier::Tall) => {
                if 0 < offset && offset < window {
                    -rewards.dodge_reward
                } else if -window < offset && offset <= 0 {
                    rewards.dodge_reward
                } else {
                    0.0
                }
            }
            (Action::Jump, _) => 0.0,
        }
    }

    fn jump(&mut self, state: &mut GameState) -> StepResult {
        state.player.velocity_y = self.config.jump_speed;
        let mut jump = Jump {
            score: state.score,
            ..Jump::default()
        };

        while !self.airborne_tick(state, &mut jump) {}

        StepResult {
            reward: jump.reward,
            terminated: jump.terminated,
            score: jump.score,
            info: jump.info,
        }
    }

    /// Run one physics sub-step of a jump; returns true once landed
    fn airborne_tick(&mut self, state: &mut GameState, jump: &mut Jump) -> bool {
        jump.info.airborne_ticks += 1;
        state.track.advance(self.config.depth_per_tick);

        let player = &mut state.player;
        player.velocity_y -= self.config.gravity;
        player.y += player.velocity_y;
        jump.info.peak_height = jump.info.peak_height.max(player.y);

        if !jump.terminated {
            match self.config.scoring {
                ScoringPolicy::Touch => self.check_touch(state, jump),
                ScoringPolicy::Clear => self.check_clearance(state, jump),
            }
        }

        if self.config.termination == TerminationPolicy::OnCollision && self.collides(state) {
            jump.info.collided = true;
        }

        let landed = state.player.is_grounded();
        if landed {
            state.player.y = 0.0;
            self.land(state, jump);
        }

        jump.terminated |= self.retire_and_refill(state, &mut jump.info);
        landed
    }

    /// Score the head obstacle the moment it is touched
    fn check_touch(&self, state: &mut GameState, jump: &mut Jump) {
        let player = state.player;
        let head = state.track.head_mut();
        let vertical_gap = (player.y - head.base as f64).abs();

        if !head.scored
            && head.depth == 0
            && vertical_gap <= self.config.touch_window
            && (player.x - head.x).abs() <= self.config.scoring_window
        {
            head.scored = true;
            state.score += 1;
            jump.score = state.score;
            jump.reward = self.scoring_reward(vertical_gap);
            jump.info.scored = true;
        }
    }

    /// Flag the first pass over the head obstacle; it is scored on landing
    fn check_clearance(&self, state: &GameState, jump: &mut Jump) {
        let head = state.track.head();
        let gap = state.player.y - head.top(&self.config) as f64;

        if jump.clearance_gap.is_none() && gap > 0.0 && head.overlaps(state.player.x, &self.config) {
            jump.clearance_gap = Some(gap);
        }
    }

    fn land(&self, state: &mut GameState, jump: &mut Jump) {
        let rewards = &self.config.rewards;

        match self.config.scoring {
            ScoringPolicy::Touch => {
                if !jump.info.scored {
                    jump.reward = rewards.wasted_jump_penalty;
                }
            }
            ScoringPolicy::Clear => match jump.clearance_gap {
                Some(gap) if !jump.info.collided => {
                    jump.reward = self.scoring_reward(gap);
                    state.score += 1;
                    jump.score = state.score;
                    jump.info.scored = true;
                }
                Some(_) => {}
                None => jump.reward = rewards.wasted_jump_penalty,
            },
        }

        if jump.info.collided {
            jump.reward += rewards.collision_penalty;
            state.score = 0;
            state.track.pop_head();
            jump.terminated = true;
        }
    }

    /// Score reward plus a bonus that shrinks linearly with the vertical gap
    fn scoring_reward(&self, vertical_gap: f64) -> f32 {
        let closeness = (1.0 - vertical_gap / self.config.touch_window).max(0.0);
        self.config.rewards.score_reward + self.config.rewards.proximity_bonus * closeness as f32
    }

    /// Whether the player is inside any obstacle without being above it
    fn collides(&self, state: &GameState) -> bool {
        state.track.iter().any(|obstacle| {
            obstacle.overlaps(state.player.x, &self.config)
                && state.player.y <= obstacle.top(&self.config) as f64
        })
    }

    /// Retire passed obstacles and top the track up again
    ///
    /// Returns true when a retirement ends the episode.
    fn retire_and_refill(&mut self, state: &mut GameState, info: &mut StepInfo) -> bool {
        let retired = state.track.retire(&self.config);
        info.retired += retired.len();
        state.track.refill(&self.config, &mut self.rng);

        let missed = retired.iter().any(|obstacle| !obstacle.scored);
        if self.config.termination == TerminationPolicy::OnRetirement && missed {
            state.score = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Obstacle;

    fn state_with(config: &GameConfig, obstacles: Vec<Obstacle>) -> GameState {
        GameState::new(Player::new(config.jump_speed), ObstacleTrack::from_obstacles(obstacles))
    }

    #[test]
    fn test_reset() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1);
        let state = engine.reset();

        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.player.x, 0);
        assert_eq!(state.player.y, 0.0);
        assert_eq!(state.track.len(), 2);
    }

    #[test]
    fn test_lateral_bounds_hold() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 3);
        let mut state = engine.reset();
        let bound = engine.config().player_bound();

        for i in 0..400 {
            let action = if i < 200 { Action::Left } else { Action::Right };
            engine.step(&mut state, action);
            assert!(state.player.x >= -bound && state.player.x <= bound);
        }
        assert_eq!(state.player.x, bound);
    }

    #[test]
    fn test_pluck_stars_retirement_ends_episode() {
        let config = GameConfig::pluck_stars();
        let mut engine = GameEngine::with_seed(config.clone(), 5);
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(0, 500, 100, HeightTier::Small),
                Obstacle::new(200, 1500, 100, HeightTier::Small),
            ],
        );

        for tick in 1..=50 {
            let result = engine.step(&mut state, Action::Stay);
            if tick < 50 {
                assert!(!result.terminated, "terminated early at tick {}", tick);
                assert_eq!(result.reward, 5.0);
            } else {
                assert!(result.terminated);
                assert_eq!(result.score, 0);
                assert_eq!(result.info.retired, 1);
            }
        }
        assert_eq!(state.score, 0);
        assert_eq!(state.track.head().x, 200);
    }

    #[test]
    fn test_jump_lands_exactly_on_ground() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 9);
        let mut state = state_with(&config, vec![Obstacle::new(400, 3000, 0, HeightTier::Small)]);
        state.player.velocity_y = config.jump_speed;

        let mut jump = Jump::default();
        let mut heights = Vec::new();
        loop {
            let landed = engine.airborne_tick(&mut state, &mut jump);
            heights.push(state.player.y);
            if landed {
                break;
            }
        }

        assert!((39..=40).contains(&heights.len()), "landed after {} sub-steps", heights.len());
        assert_eq!(*heights.last().unwrap(), 0.0);

        let peak = heights
            .iter()
            .enumerate()
            .fold(0, |best, (i, &h)| if h > heights[best] { i } else { best });
        assert!(heights[..=peak].windows(2).all(|w| w[0] <= w[1]));
        assert!(heights[peak..].windows(2).all(|w| w[0] >= w[1]));
        assert!(heights[peak] > 100.0);
    }

    #[test]
    fn test_jump_returns_to_ground_once() {
        let mut engine = GameEngine::with_seed(GameConfig::just_jump(), 11);
        let mut state = engine.reset();

        let result = engine.step(&mut state, Action::Jump);
        assert!(result.info.airborne_ticks >= 39);
        assert!(state.player.is_grounded());
        assert_eq!(state.player.y, 0.0);
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_wasted_jump_penalty() {
        let mut engine = GameEngine::with_seed(GameConfig::just_jump(), 13);
        let mut state = engine.reset();

        let result = engine.step(&mut state, Action::Jump);
        assert_eq!(result.reward, -50.0);
        assert!(!result.terminated);
        assert!(!result.info.scored);
    }

    #[test]
    fn test_clearing_small_obstacle_scores_on_landing() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 17);
        // Reaches the overlap window mid-jump while the player is high up
        let mut state = state_with(&config, vec![Obstacle::new(0, 300, 0, HeightTier::Small)]);

        let result = engine.step(&mut state, Action::Jump);
        assert!(result.info.scored);
        assert!(!result.info.collided);
        assert!(!result.terminated);
        assert_eq!(result.reward, 100.0);
        assert_eq!(result.score, 1);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_tall_obstacle_collision_mid_jump() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 19);
        let mut state = state_with(&config, vec![Obstacle::new(0, 300, 0, HeightTier::Tall)]);
        state.score = 4;

        let result = engine.step(&mut state, Action::Jump);
        assert!(result.info.collided);
        assert!(result.terminated);
        assert_eq!(result.reward, -100.0);
        assert_eq!(result.score, 4);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_step_counter_outlasts_u32() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 17);
        let mut state = engine.reset();
        state.steps = u64::from(u32::MAX);

        engine.step(&mut state, Action::Stay);
        assert_eq!(state.steps, u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_clearance_then_collision_forfeits_score() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 21);
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(0, 300, 0, HeightTier::Small),
                Obstacle::new(0, 600, 0, HeightTier::Tall),
                Obstacle::new(300, 2000, 0, HeightTier::Small),
            ],
        );
        state.score = 3;

        let result = engine.step(&mut state, Action::Jump);
        assert!(result.info.collided);
        assert!(result.terminated);
        assert!(!result.info.scored);
        // No clearance reward, only the collision penalty
        assert_eq!(result.reward, -50.0);
        assert_eq!(result.score, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.track.head().x, 300);
    }

    #[test]
    fn test_ground_collision_ends_episode() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 23);
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(0, 30, 0, HeightTier::Small),
                Obstacle::new(300, 1000, 0, HeightTier::Small),
            ],
        );
        state.score = 2;

        let result = engine.step(&mut state, Action::Stay);
        assert!(result.info.collided);
        assert!(result.terminated);
        // Aligned with a small obstacle (+10) then the collision penalty
        assert_eq!(result.reward, -40.0);
        assert_eq!(result.score, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.track.head().x, 300);
    }

    #[test]
    fn test_just_jump_retirement_is_routine() {
        let config = GameConfig::just_jump();
        let mut engine = GameEngine::with_seed(config.clone(), 29);
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(400, -55, 0, HeightTier::Small),
                Obstacle::new(0, 2000, 0, HeightTier::Small),
            ],
        );

        let result = engine.step(&mut state, Action::Stay);
        assert_eq!(result.info.retired, 1);
        assert!(!result.terminated);
    }

    #[test]
    fn test_touch_scores_with_proximity_bonus() {
        let config = GameConfig::pluck_stars();
        let mut engine = GameEngine::with_seed(config.clone(), 31);
        // At 10 per sub-step the star reaches depth 0 on the 10th sub-step,
        // when the player is at 14*10 - 0.7*55 = 101.5
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(0, 100, 100, HeightTier::Small),
                Obstacle::new(0, 1500, 100, HeightTier::Small),
            ],
        );

        let result = engine.step(&mut state, Action::Jump);
        assert!(result.info.scored);
        assert!(!result.terminated);
        assert_eq!(result.score, 1);
        assert_eq!(state.score, 1);
        let expected = 100.0 + 10.0 * (1.0 - 1.5 / 40.0);
        assert!((result.reward - expected as f32).abs() < 1e-3);
    }

    #[test]
    fn test_missed_touch_ends_pluck_stars_episode() {
        let config = GameConfig::pluck_stars();
        let mut engine = GameEngine::with_seed(config.clone(), 37);
        let mut state = state_with(
            &config,
            vec![
                Obstacle::new(200, 100, 100, HeightTier::Small),
                Obstacle::new(0, 1500, 100, HeightTier::Small),
            ],
        );

        let result = engine.step(&mut state, Action::Jump);
        assert!(!result.info.scored);
        assert!(result.terminated);
        assert_eq!(result.reward, -50.0);
    }

    #[test]
    fn test_small_tier_lateral_rewards() {
        let engine = GameEngine::with_seed(GameConfig::just_jump(), 0);
        let small = HeightTier::Small;

        assert_eq!(engine.lateral_reward(Action::Left, 40, small), -10.0);
        assert_eq!(engine.lateral_reward(Action::Left, -40, small), 10.0);
        assert_eq!(engine.lateral_reward(Action::Left, 0, small), 0.0);
        assert_eq!(engine.lateral_reward(Action::Right, -40, small), -10.0);
        assert_eq!(engine.lateral_reward(Action::Right, 60, small), 10.0);
        assert_eq!(engine.lateral_reward(Action::Stay, 40, small), 10.0);
        assert_eq!(engine.lateral_reward(Action::Stay, 41, small), -10.0);
    }

    #[test]
    fn test_tall_tier_lateral_rewards() {
        let engine = GameEngine::with_seed(GameConfig::just_jump(), 0);
        let tall = HeightTier::Tall;

        assert_eq!(engine.lateral_reward(Action::Left, -20, tall), -5.0);
        assert_eq!(engine.lateral_reward(Action::Left, 0, tall), 5.0);
        assert_eq!(engine.lateral_reward(Action::Left, 20, tall), 5.0);
        assert_eq!(engine.lateral_reward(Action::Left, 40, tall), 0.0);
        assert_eq!(engine.lateral_reward(Action::Right, 20, tall), -5.0);
        assert_eq!(engine.lateral_reward(Action::Right, 0, tall), 5.0);
        assert_eq!(engine.lateral_reward(Action::Right, -20, tall), 5.0);
        assert_eq!(engine.lateral_reward(Action::Stay, 0, tall), -10.0);
        assert_eq!(engine.lateral_reward(Action::Stay, 100, tall), 10.0);
    }

    #[test]
    fn test_single_tier_uses_smaller_align_reward() {
        let engine = GameEngine::with_seed(GameConfig::pluck_stars(), 0);
        assert_eq!(engine.lateral_reward(Action::Stay, 0, HeightTier::Small), 5.0);
        assert_eq!(engine.lateral_reward(Action::Right, 40, HeightTier::Small), 5.0);
    }

    #[test]
    fn test_track_invariants_over_random_play() {
        use rand::Rng;

        for config in [GameConfig::just_jump(), GameConfig::pluck_stars()] {
            let mut engine = GameEngine::with_seed(config.clone(), 41);
            let mut state = engine.reset();
            let mut rng = StdRng::seed_from_u64(43);

            for _ in 0..2000 {
                let action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
                engine.step(&mut state, action);

                assert!(!state.track.is_empty());
                assert!(state.track.len() <= config.spawn.max_obstacles);
                assert!(state.track.is_depth_sorted());
                assert!(state.player.y >= 0.0);
            }
        }
    }
}
