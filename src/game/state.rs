use super::config::GameConfig;
use super::track::ObstacleTrack;

/// Height class of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightTier {
    /// Low enough to jump over
    Small,
    /// Too tall to clear; has to be dodged
    Tall,
}

impl HeightTier {
    /// Encoding used in the observation vector: `1` small, `-1` tall
    pub fn signum(&self) -> i32 {
        match self {
            HeightTier::Small => 1,
            HeightTier::Tall => -1,
        }
    }
}

/// An obstacle on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Lateral position of the obstacle centre
    pub x: i32,
    /// Distance in front of the player; shrinks every tick
    pub depth: i32,
    /// Height of the obstacle bottom above the ground
    pub base: i32,
    pub tier: HeightTier,
    /// Set once the player has scored this obstacle
    pub scored: bool,
}

impl Obstacle {
    pub fn new(x: i32, depth: i32, base: i32, tier: HeightTier) -> Self {
        Self {
            x,
            depth,
            base,
            tier,
            scored: false,
        }
    }

    /// Height of the obstacle itself
    pub fn height(&self, config: &GameConfig) -> i32 {
        match self.tier {
            HeightTier::Small => config.small_height,
            HeightTier::Tall => config.tall_height,
        }
    }

    /// Height of the obstacle top above the ground
    pub fn top(&self, config: &GameConfig) -> i32 {
        self.base + self.height(config)
    }

    /// Whether the obstacle overlaps the player's lateral footprint and depth extent
    pub fn overlaps(&self, player_x: i32, config: &GameConfig) -> bool {
        let (near, far) = config.overlap_depth_range();
        (self.x - player_x).abs() <= config.footprint_half_width()
            && (near..=far).contains(&self.depth)
    }
}

/// The player ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Lateral position; multiples of the lateral speed
    pub x: i32,
    /// Height above the ground, never negative outside a jump sub-step
    pub y: f64,
    pub velocity_y: f64,
}

impl Player {
    pub fn new(jump_speed: f64) -> Self {
        Self {
            x: 0,
            y: 0.0,
            velocity_y: jump_speed,
        }
    }

    /// Whether the player is on the ground
    pub fn is_grounded(&self) -> bool {
        self.y <= 0.0
    }

    /// Move laterally by `delta`, clamped to `[-bound, bound]`
    pub fn shift(&mut self, delta: i32, bound: i32) {
        self.x = (self.x + delta).clamp(-bound, bound);
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub track: ObstacleTrack,
    /// Obstacles scored in the current episode
    pub score: u32,
    /// Actions applied since the last reset
    pub steps: u64,
}

impl GameState {
    pub fn new(player: Player, track: ObstacleTrack) -> Self {
        Self {
            player,
            track,
            score: 0,
            steps: 0,
        }
    }

    /// Signed lateral offset of the head obstacle relative to the player
    pub fn head_offset(&self) -> i32 {
        self.track.head().x - self.player.x
    }
}
