//! Material terms
//!
//! Live hands are the game's "pieces": losing both ends the game, so the
//! hand count carries most of the weight. Live value sum is a small tiebreak.

use crate::types::{GameState, Side};

/// Live hands of `side` minus live hands of its opponent
pub fn alive_differential(state: &GameState, side: Side) -> i64 {
    state.alive_count(side) as i64 - state.alive_count(side.opponent()) as i64
}

/// Live value sum of `side` minus that of its opponent
pub fn value_differential(state: &GameState, side: Side) -> i64 {
    state.alive_sum(side) as i64 - state.alive_sum(side.opponent()) as i64
}
