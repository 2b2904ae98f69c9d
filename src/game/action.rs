/// Number of discrete actions available to the player
pub const ACTION_COUNT: usize = 4;

/// Action that can be taken in the game
///
/// The discriminant order is the action-value order used by the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Step one lateral unit to the left
    Left,
    /// Keep the current lateral position
    Stay,
    /// Step one lateral unit to the right
    Right,
    /// Leave the ground and stay airborne until landing
    Jump,
}

impl Action {
    /// All actions, in index order
    pub const ALL: [Action; ACTION_COUNT] = [Action::Left, Action::Stay, Action::Right, Action::Jump];

    /// Index of this action in an action-value vector
    pub fn index(&self) -> usize {
        match self {
            Action::Left => 0,
            Action::Stay => 1,
            Action::Right => 2,
            Action::Jump => 3,
        }
    }

    /// Convert an action-value index back to an action
    ///
    /// Returns `None` for indices outside `0..ACTION_COUNT`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lateral direction of a grounded action (-1, 0 or 1)
    ///
    /// Jump has no lateral component.
    pub fn lateral_direction(&self) -> i32 {
        match self {
            Action::Left => -1,
            Action::Right => 1,
            Action::Stay | Action::Jump => 0,
        }
    }
}
