//! Move ordering for alpha-beta pruning
//!
//! Candidates are sorted by the static value of the position they lead to,
//! seen from the mover. Immediate wins sort first. The sort is stable, so
//! equal candidates keep generation order.

use crate::constants::WIN_SCORE;
use crate::evaluation::Evaluator;
use crate::move_gen::apply_move;
use crate::types::{GameState, Move, Side};

/// Order moves for better alpha-beta pruning
pub fn order_moves(state: &GameState, mover: Side, moves: &mut [Move], evaluator: &dyn Evaluator) {
    moves.sort_by_cached_key(|&mv| {
        let next = apply_move(*state, mover, mv);
        let value = match next.winner() {
            Some(winner) if winner == mover => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => evaluator.evaluate(&next, mover),
        };
        std::cmp::Reverse(value)
    });
}
