use serde::{Deserialize, Serialize};

/// How many obstacle height tiers the track draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightTiers {
    /// Every obstacle is small
    Single,
    /// Obstacles are small or tall
    SmallAndTall,
}

/// What counts as scoring an obstacle during a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringPolicy {
    /// Touch a floating obstacle exactly as it reaches the player plane;
    /// rewarded immediately with a proximity bonus
    Touch,
    /// Pass over the obstacle top while inside its footprint; rewarded on
    /// landing
    Clear,
}

/// What ends an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationPolicy {
    /// Obstacles retire on reaching the player plane, and retiring one that
    /// was never scored ends the episode
    OnRetirement,
    /// Obstacles retire once fully behind the player; only a collision ends
    /// the episode
    OnCollision,
}

/// Obstacle spawning rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRules {
    /// Minimum depth gap between consecutive obstacles
    pub min_gap: i32,
    /// Maximum depth gap between consecutive obstacles
    pub max_gap: i32,
    /// Spawn depths are clipped to this value
    pub depth_limit: i32,
    /// Spawn depths are multiples of this step above the window start
    pub depth_step: i32,
    /// Lateral positions are multiples of this step above the window start
    pub lateral_step: i32,
    /// Half-width of the lateral window around the previous obstacle
    pub lateral_reach: i32,
    /// Extra distance kept from the track edge
    pub lateral_inset: i32,
    /// Half-width of the excluded zone around the previous obstacle
    pub dead_zone: Option<i32>,
    /// Depth of the first obstacle of a fresh track
    pub first_depth: i32,
    /// Width of the window, from the left edge, the first obstacle is drawn from
    pub first_lateral_span: i32,
    /// Probability that an obstacle is small (two-tier tracks only)
    pub small_probability: f64,
    /// Maximum number of live obstacles
    pub max_obstacles: usize,
    /// A new obstacle is spawned while the tail is closer than this depth
    pub spawn_trigger_depth: i32,
}

/// Reward shaping constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rewards {
    /// Lateral reward magnitude for a small obstacle
    pub align_reward: f32,
    /// Lateral reward magnitude for a tall obstacle
    pub dodge_reward: f32,
    /// Reward for scoring an obstacle
    pub score_reward: f32,
    /// Maximum bonus added to `score_reward` for a close vertical match
    pub proximity_bonus: f32,
    /// Reward for a jump that scored nothing
    pub wasted_jump_penalty: f32,
    /// Added to the landing reward when a collision happened
    pub collision_penalty: f32,
}

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Full lateral width of the track
    pub track_width: i32,
    /// Depth of the visible track
    pub track_depth: i32,
    /// Radius of the player ball
    pub player_radius: i32,
    /// Lateral distance covered by one Left/Right action
    pub lateral_speed: i32,
    /// Distance the player keeps from the track edge
    pub lateral_margin: i32,
    pub obstacle_width: i32,
    pub obstacle_length: i32,
    /// Height of the obstacle bottom above the ground
    pub obstacle_base: i32,
    pub small_height: i32,
    pub tall_height: i32,
    /// Depth every obstacle moves toward the player per tick
    pub depth_per_tick: i32,
    /// Initial vertical velocity of a jump
    pub jump_speed: f64,
    pub gravity: f64,
    /// Lateral half-width inside which the player counts as aligned
    pub scoring_window: i32,
    /// Vertical half-width of a touch
    pub touch_window: f64,

    pub height_tiers: HeightTiers,
    pub scoring: ScoringPolicy,
    pub termination: TerminationPolicy,

    pub spawn: SpawnRules,
    pub rewards: Rewards,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::just_jump()
    }
}

impl GameConfig {
    /// Two height tiers, jump over small obstacles and dodge tall ones
    pub fn just_jump() -> Self {
        Self {
            track_width: 1000,
            track_depth: 4000,
            player_radius: 20,
            lateral_speed: 20,
            lateral_margin: 20,
            obstacle_width: 40,
            obstacle_length: 40,
            obstacle_base: 0,
            small_height: 50,
            tall_height: 300,
            depth_per_tick: 15,
            jump_speed: 14.0,
            gravity: 0.7,
            scoring_window: 40,
            touch_window: 40.0,
            height_tiers: HeightTiers::SmallAndTall,
            scoring: ScoringPolicy::Clear,
            termination: TerminationPolicy::OnCollision,
            spawn: SpawnRules {
                min_gap: 500,
                max_gap: 1500,
                depth_limit: 3900,
                depth_step: 10,
                lateral_step: 20,
                lateral_reach: 300,
                lateral_inset: 0,
                dead_zone: Some(100),
                first_depth: 3400,
                first_lateral_span: 60,
                small_probability: 0.7,
                max_obstacles: 8,
                spawn_trigger_depth: 3400,
            },
            rewards: Rewards {
                align_reward: 10.0,
                dodge_reward: 5.0,
                score_reward: 100.0,
                proximity_bonus: 0.0,
                wasted_jump_penalty: -50.0,
                collision_penalty: -50.0,
            },
        }
    }

    /// One height tier of floating stars to be touched mid-jump
    pub fn pluck_stars() -> Self {
        let base = Self::just_jump();
        Self {
            obstacle_length: 10,
            obstacle_base: 100,
            small_height: 40,
            tall_height: 40,
            depth_per_tick: 10,
            height_tiers: HeightTiers::Single,
            scoring: ScoringPolicy::Touch,
            termination: TerminationPolicy::OnRetirement,
            spawn: SpawnRules {
                lateral_inset: 30,
                dead_zone: None,
                ..base.spawn.clone()
            },
            rewards: Rewards {
                align_reward: 5.0,
                dodge_reward: 5.0,
                score_reward: 100.0,
                proximity_bonus: 10.0,
                wasted_jump_penalty: -50.0,
                collision_penalty: -50.0,
            },
            ..base
        }
    }

    /// Largest lateral distance of the player from the track centre
    pub fn player_bound(&self) -> i32 {
        self.track_width / 2 - self.lateral_margin
    }

    /// Lateral range obstacles may spawn in
    pub fn obstacle_lateral_range(&self) -> (i32, i32) {
        let edge = self.track_width / 2 - self.obstacle_width / 2 - self.spawn.lateral_inset;
        (-edge, edge)
    }

    /// Lateral half-width inside which the player overlaps an obstacle
    pub fn footprint_half_width(&self) -> i32 {
        self.obstacle_width / 2 + self.player_radius
    }

    /// Depth range, inclusive, in which an obstacle overlaps the player
    pub fn overlap_depth_range(&self) -> (i32, i32) {
        (-(self.player_radius + self.obstacle_length), self.player_radius)
    }

    /// Whether an obstacle at `depth` has left the track
    pub fn is_retired(&self, depth: i32) -> bool {
        match self.termination {
            TerminationPolicy::OnRetirement => depth <= 0,
            TerminationPolicy::OnCollision => depth < self.overlap_depth_range().0,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.track_width <= 0 || self.track_depth <= 0 {
            return Err(format!(
                "track dimensions must be positive, got {}x{}",
                self.track_width, self.track_depth
            ));
        }

        if self.player_bound() <= 0 {
            return Err(format!(
                "lateral_margin ({}) leaves no room on a track of width {}",
                self.lateral_margin, self.track_width
            ));
        }

        let (min_x, max_x) = self.obstacle_lateral_range();
        if min_x > max_x {
            return Err("obstacles do not fit laterally on the track".to_string());
        }

        if self.lateral_speed <= 0 {
            return Err(format!("lateral_speed must be positive, got {}", self.lateral_speed));
        }

        if self.depth_per_tick <= 0 {
            return Err(format!("depth_per_tick must be positive, got {}", self.depth_per_tick));
        }

        if self.jump_speed <= 0.0 {
            return Err(format!("jump_speed must be positive, got {}", self.jump_speed));
        }

        if self.gravity <= 0.0 {
            return Err(format!("gravity must be positive, got {}", self.gravity));
        }

        if self.touch_window <= 0.0 {
            return Err(format!("touch_window must be positive, got {}", self.touch_window));
        }

        let spawn = &self.spawn;
        if spawn.min_gap <= 0 || spawn.min_gap > spawn.max_gap {
            return Err(format!(
                "gap window must satisfy 0 < min_gap <= max_gap, got [{}, {}]",
                spawn.min_gap, spawn.max_gap
            ));
        }

        if spawn.depth_step <= 0 || spawn.lateral_step <= 0 {
            return Err("spawn steps must be positive".to_string());
        }

        if spawn.lateral_reach <= 0 {
            return Err(format!("lateral_reach must be positive, got {}", spawn.lateral_reach));
        }

        if spawn.first_lateral_span <= spawn.lateral_inset {
            return Err(format!(
                "first_lateral_span ({}) must exceed lateral_inset ({})",
                spawn.first_lateral_span, spawn.lateral_inset
            ));
        }

        if !(0.0..=1.0).contains(&spawn.small_probability) {
            return Err(format!(
                "small_probability must be in [0, 1], got {}",
                spawn.small_probability
            ));
        }

        if spawn.max_obstacles < 2 {
            return Err(format!(
                "max_obstacles must be at least 2, got {}",
                spawn.max_obstacles
            ));
        }

        if spawn.first_depth > spawn.depth_limit || spawn.first_depth <= 0 {
            return Err(format!(
                "first_depth must be in (0, {}], got {}",
                spawn.depth_limit, spawn.first_depth
            ));
        }

        Ok(())
    }
}
