//! Tactical terms
//!
//! Counted per side; the evaluator takes differentials.

use crate::constants::MAX_LIVE_VALUE;
use crate::move_gen::{attack_result, enumerate_splits};
use crate::types::{is_alive, GameState, Side};

/// Results of every attack `side` could make right now
fn attack_results(state: &GameState, side: Side) -> impl Iterator<Item = u8> {
    let own = state.hands(side);
    let opp = state.hands(side.opponent());
    own.into_iter()
        .filter(|&v| is_alive(v))
        .flat_map(move |src| {
            opp.into_iter()
                .filter(|&v| is_alive(v))
                .map(move |dst| attack_result(src, dst))
        })
}

/// Attacks by `side` that would kill the target hand
pub fn kill_count(state: &GameState, side: Side) -> i64 {
    attack_results(state, side).filter(|&r| r == 0).count() as i64
}

/// Attacks by `side` that would leave the target one point from death
pub fn threat_count(state: &GameState, side: Side) -> i64 {
    attack_results(state, side)
        .filter(|&r| r == MAX_LIVE_VALUE)
        .count() as i64
}

/// Number of splits open to `side`
pub fn split_flexibility(state: &GameState, side: Side) -> i64 {
    enumerate_splits(state, side).len() as i64
}

/// Hands of `side` sitting at 4
pub fn brink_count(state: &GameState, side: Side) -> i64 {
    state
        .hands(side)
        .iter()
        .filter(|&&v| v == MAX_LIVE_VALUE)
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_count() {
        // 4 kills either 1; 1 onto 1 does not
        let state = GameState::new([4, 1], [1, 1]).unwrap();
        assert_eq!(kill_count(&state, Side::Player), 2);
        // Cpu's 1s kill the player's 4
        assert_eq!(kill_count(&state, Side::Cpu), 2);
    }

    #[test]
    fn test_threat_count() {
        let state = GameState::new([3, 0], [1, 2]).unwrap();
        // 3+1 = 4 is a threat, 3+2 = 0 is a kill
        assert_eq!(threat_count(&state, Side::Player), 1);
        assert_eq!(kill_count(&state, Side::Player), 1);
    }

    #[test]
    fn test_no_attacks_against_eliminated_side() {
        let state = GameState::new([2, 3], [0, 0]).unwrap();
        assert_eq!(kill_count(&state, Side::Player), 0);
        assert_eq!(threat_count(&state, Side::Player), 0);
    }

    #[test]
    fn test_brink_and_flexibility() {
        let state = GameState::new([4, 4], [2, 0]).unwrap();
        assert_eq!(brink_count(&state, Side::Player), 2);
        // Total 8 only splits as [4,4], which is the current distribution
        assert_eq!(split_flexibility(&state, Side::Player), 0);
        // Cpu [2,0] can go to [1,1]
        assert_eq!(split_flexibility(&state, Side::Cpu), 1);
    }
}
