use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::observation::Observation;
use crate::game::{ACTION_COUNT, Action};

/// Action values of one state, in [`Action`] index order
pub type ActionValues = [f32; ACTION_COUNT];

/// Sparse table of action values keyed by the exact observation vector
///
/// Rows are created zero-filled on first visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: HashMap<Observation, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `state`, inserting a zero row if it was never visited
    pub fn get_or_create(&mut self, state: &Observation) -> &mut ActionValues {
        self.values
            .entry(state.clone())
            .or_insert([0.0; ACTION_COUNT])
    }

    pub fn get(&self, state: &Observation) -> Option<&ActionValues> {
        self.values.get(state)
    }

    /// Largest action value of `state`, creating the row if needed
    pub fn max_value(&mut self, state: &Observation) -> f32 {
        self.get_or_create(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Greedy action for `state`; ties resolve to the lowest index
    pub fn best_action(&mut self, state: &Observation) -> Action {
        let row = self.get_or_create(state);
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Observation, &ActionValues)> {
        self.values.iter()
    }
}
