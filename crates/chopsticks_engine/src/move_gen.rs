//! Move generation and application
//!
//! Attacks pair a live own hand with a live opponent hand. Splits spread the
//! owner's live total over both hands; every split must land in `1..=4` on
//! both sides and must actually change the distribution (a swap counts as no
//! change).
//!
//! All functions here take `GameState` by value and return new states.

use crate::constants::{HAND_MODULUS, MAX_LIVE_VALUE};
use crate::error::{EngineError, EngineResult};
use crate::types::{is_alive, is_dead, GameState, Move, Side};

/// Wraparound addition. The result is always canonical: an exact 5 becomes 0.
#[inline]
pub fn wrap(sum: u8) -> u8 {
    sum % HAND_MODULUS
}

/// Value a target hand ends up with after being hit by `source`
///
/// Depends only on the two values involved.
#[inline]
pub fn attack_result(source: u8, target: u8) -> u8 {
    wrap(source + target)
}

/// All attacks available to `owner`
pub fn enumerate_attacks(state: &GameState, owner: Side) -> Vec<Move> {
    let own = state.hands(owner);
    let opp = state.hands(owner.opponent());
    let mut moves = Vec::with_capacity(4);

    for src in 0..2u8 {
        if is_dead(own[src as usize]) {
            continue;
        }
        for dst in 0..2u8 {
            if is_alive(opp[dst as usize]) {
                moves.push(Move::Attack { src, dst });
            }
        }
    }

    moves
}

/// All splits available to `owner`
pub fn enumerate_splits(state: &GameState, owner: Side) -> Vec<Move> {
    let hands = state.hands(owner);
    let sum = state.alive_sum(owner);
    if sum < 2 {
        return Vec::new();
    }

    (1..=MAX_LIVE_VALUE)
        .filter_map(|left| {
            let right = sum.checked_sub(left)?;
            if !(1..=MAX_LIVE_VALUE).contains(&right) {
                return None;
            }
            let unchanged = [left, right] == hands || [right, left] == hands;
            (!unchanged).then_some(Move::Split { left, right })
        })
        .collect()
}

/// Attacks first, then splits
pub fn legal_moves(state: &GameState, owner: Side) -> Vec<Move> {
    let mut moves = enumerate_attacks(state, owner);
    moves.extend(enumerate_splits(state, owner));
    moves
}

/// Apply a move without validating it. Search code only feeds generated moves.
///
/// # Panics
///
/// Panics if an attack names a hand index above 1. Untrusted moves should go
/// through [`validate_move`] first, or through [`crate::api::play`], which
/// does both.
pub fn apply_move(state: GameState, owner: Side, mv: Move) -> GameState {
    match mv {
        Move::Attack { src, dst } => {
            let target_side = owner.opponent();
            let source = state.hands(owner)[src as usize];
            let mut target = state.hands(target_side);
            target[dst as usize] = attack_result(source, target[dst as usize]);
            state.with_hands(target_side, target)
        }
        Move::Split { left, right } => state.with_hands(owner, [left, right]),
    }
}

/// Explain why `mv` is not playable for `owner`, or return `Ok(())`
pub fn validate_move(state: &GameState, owner: Side, mv: Move) -> EngineResult<()> {
    if state.is_terminal() {
        return Err(EngineError::GameOver);
    }

    match mv {
        Move::Attack { src, dst } => {
            if src > 1 {
                return Err(EngineError::InvalidHandIndex { index: src });
            }
            if dst > 1 {
                return Err(EngineError::InvalidHandIndex { index: dst });
            }
            if is_dead(state.hands(owner)[src as usize]) {
                return Err(EngineError::DeadSource { side: owner, src });
            }
            if is_dead(state.hands(owner.opponent())[dst as usize]) {
                return Err(EngineError::DeadTarget { side: owner, dst });
            }
            Ok(())
        }
        Move::Split { left, right } => {
            if enumerate_splits(state, owner).contains(&mv) {
                Ok(())
            } else {
                Err(EngineError::InvalidSplit {
                    side: owner,
                    left,
                    right,
                })
            }
        }
    }
}

/// Check if a move is legal
pub fn is_legal_move(state: &GameState, owner: Side, mv: Move) -> bool {
    validate_move(state, owner, mv).is_ok()
}
