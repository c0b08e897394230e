//! Static evaluation of non-terminal positions
//!
//! Scores are always relative to a perspective side and antisymmetric:
//! `evaluate(s, p) == -evaluate(s, p.opponent())`. That keeps minimax
//! consistent whichever side the search is rooted at.
//!
//! ## Module Organization
//!
//! - `material` - live hand count and live value sum
//! - `tactics` - kill chances, threats, split flexibility, hands on the brink
//!
//! Two strategies share the [`Evaluator`] seam: [`TacticalEvaluator`] (the
//! full weight table, used everywhere by default) and [`MaterialEvaluator`]
//! (material terms only).

mod material;
mod tactics;

use crate::constants::WIN_SCORE;
use crate::types::{GameState, Side};

pub use material::{alive_differential, value_differential};
pub use tactics::{brink_count, kill_count, split_flexibility, threat_count};

/// Weight table for the tactical evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalWeights {
    /// Per live hand over the opponent
    pub alive: i64,
    /// Per point of live value over the opponent
    pub value: i64,
    /// Per attack that would kill an opponent hand right now
    pub kill: i64,
    /// Per attack that would leave an opponent hand at 4
    pub threat: i64,
    /// Per available split (tempo proxy)
    pub flexibility: i64,
    /// Per own hand sitting at 4 (charged), per opponent hand at 4 (credited)
    pub brink: i64,
}

impl EvalWeights {
    pub const TACTICAL: EvalWeights = EvalWeights {
        alive: 1400,
        value: 90,
        kill: 520,
        threat: 260,
        flexibility: 110,
        brink: 180,
    };

    pub const MATERIAL: EvalWeights = EvalWeights {
        alive: 1400,
        value: 90,
        kill: 0,
        threat: 0,
        flexibility: 0,
        brink: 0,
    };
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self::TACTICAL
    }
}

/// Heuristic scoring strategy used at the search horizon
pub trait Evaluator: Send + Sync {
    /// Score a non-terminal state for `perspective`
    fn evaluate(&self, state: &GameState, perspective: Side) -> i64;
}

/// Weighted sum of every material and tactical feature
#[derive(Debug, Clone, Copy, Default)]
pub struct TacticalEvaluator {
    pub weights: EvalWeights,
}

impl TacticalEvaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }
}

impl Evaluator for TacticalEvaluator {
    fn evaluate(&self, state: &GameState, perspective: Side) -> i64 {
        let w = &self.weights;
        let opp = perspective.opponent();
        let diff = |f: fn(&GameState, Side) -> i64| f(state, perspective) - f(state, opp);

        w.alive * alive_differential(state, perspective)
            + w.value * value_differential(state, perspective)
            + w.kill * diff(kill_count)
            + w.threat * diff(threat_count)
            + w.flexibility * diff(split_flexibility)
            - w.brink * diff(brink_count)
    }
}

/// Live hands and live value only
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, state: &GameState, perspective: Side) -> i64 {
        let w = EvalWeights::MATERIAL;
        w.alive * alive_differential(state, perspective)
            + w.value * value_differential(state, perspective)
    }
}

/// Score of a decided position, or `None` while both sides still have a hand
///
/// Scaled by `remaining_depth + 1` so that wins reached sooner (more depth
/// left) and losses reached later score better.
pub fn terminal_score(state: &GameState, perspective: Side, remaining_depth: u32) -> Option<i64> {
    let scale = remaining_depth as i64 + 1;
    state.winner().map(|winner| {
        if winner == perspective {
            WIN_SCORE * scale
        } else {
            -WIN_SCORE * scale
        }
    })
}

/// Evaluate a position with the default tactical weights
pub fn evaluate_state(state: &GameState, perspective: Side) -> i64 {
    TacticalEvaluator::default().evaluate(state, perspective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position_is_balanced() {
        assert_eq!(evaluate_state(&GameState::initial(), Side::Cpu), 0);
        assert_eq!(evaluate_state(&GameState::initial(), Side::Player), 0);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        for p0 in 0..5 {
            for p1 in 0..5 {
                for c0 in 0..5 {
                    for c1 in 0..5 {
                        let state = GameState::new([p0, p1], [c0, c1]).unwrap();
                        assert_eq!(
                            evaluate_state(&state, Side::Player),
                            -evaluate_state(&state, Side::Cpu),
                            "asymmetric at {}",
                            state
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_extra_live_hand_dominates() {
        let state = GameState::new([1, 1], [0, 4]).unwrap();
        assert!(evaluate_state(&state, Side::Player) > 0);
    }

    #[test]
    fn test_terminal_score_prefers_fast_wins() {
        let won = GameState::new([2, 0], [0, 0]).unwrap();
        let fast = terminal_score(&won, Side::Player, 5).unwrap();
        let slow = terminal_score(&won, Side::Player, 1).unwrap();
        assert!(fast > slow);
        assert_eq!(terminal_score(&won, Side::Cpu, 0), Some(-WIN_SCORE));
        assert_eq!(terminal_score(&GameState::initial(), Side::Cpu, 3), None);
    }

    #[test]
    fn test_material_evaluator_ignores_tactics() {
        // Same material, different kill chances
        let a = GameState::new([4, 1], [1, 1]).unwrap();
        let b = GameState::new([3, 2], [1, 1]).unwrap();
        assert_eq!(
            MaterialEvaluator.evaluate(&a, Side::Player),
            MaterialEvaluator.evaluate(&b, Side::Player)
        );
        assert_ne!(
            evaluate_state(&a, Side::Player),
            evaluate_state(&b, Side::Player)
        );
    }
}
