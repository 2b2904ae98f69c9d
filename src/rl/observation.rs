use serde::{Deserialize, Serialize};

use crate::game::{GameConfig, GameState, HeightTiers};

/// Compact state vector observed by the agent
///
/// Layout:
/// - 0: lateral offset of the head obstacle relative to the player
/// - 1: depth of the head obstacle
/// - 2: height tier of the head obstacle (`1` small, `-1` tall), two-tier tracks only
///
/// The vector is used verbatim as the Q-table key, so no binning happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation(Vec<i32>);

impl Observation {
    pub fn new(values: Vec<i32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Number of entries in an observation for the given configuration
pub fn observation_size(config: &GameConfig) -> usize {
    match config.height_tiers {
        HeightTiers::Single => 2,
        HeightTiers::SmallAndTall => 3,
    }
}

/// Create the observation vector from game state
pub fn create_observation(state: &GameState, config: &GameConfig) -> Observation {
    let head = state.track.head();
    let mut values = Vec::with_capacity(observation_size(config));
    values.push(state.head_offset());
    values.push(head.depth);

    if config.height_tiers == HeightTiers::SmallAndTall {
        values.push(head.tier.signum());
    }

    Observation(values)
}
