//! Minimax search with alpha-beta pruning and loop detection
//!
//! Every search is rooted at a *perspective* side: scores are good for that
//! side when positive, and the search maximizes on its turns and minimizes on
//! the opponent's. A [`Searcher`] owns the per-call state (memo, path set,
//! statistics) and is thrown away after one top-level call.
//!
//! ## Module Organization
//!
//! - `alphabeta` - the recursive minimax core
//! - `ordering` - one-ply move ordering used by the hint search
//! - `iterative` - iterative deepening for the background scheduler

mod alphabeta;
mod iterative;
mod ordering;

pub use iterative::{deepen, DeepeningControl, DeepeningLimits, DeepeningReport, StopReason};
pub use ordering::order_moves;

use crate::constants::SCORE_INF;
use crate::evaluation::{Evaluator, TacticalEvaluator};
use crate::hash::{NodeSet, TranspositionMemo};
use crate::move_gen::apply_move;
use crate::types::{GameState, Move, Outcome, SearchResult, Side};

/// Behavior switches for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Sort candidates by one-ply heuristic before recursing
    pub order_moves: bool,
    /// Keep the full principal line instead of just the first move
    pub track_line: bool,
}

impl SearchOptions {
    /// Plain minimax used by the CPU selector
    pub const SELECTOR: SearchOptions = SearchOptions {
        order_moves: false,
        track_line: false,
    };

    /// Ordered full-line search used by the hint engine
    pub const HINT: SearchOptions = SearchOptions {
        order_moves: true,
        track_line: true,
    };
}

/// Node counters for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
    pub memo_hits: u64,
    pub loop_hits: u64,
}

/// Value of a searched node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeValue {
    pub score: i64,
    pub outcome: Outcome,
    /// Plies from this node until the line is decided (or cut off)
    pub steps: u32,
    /// Best line from this node; only the first move unless lines are tracked
    pub line: Vec<Move>,
}

impl NodeValue {
    pub(crate) fn leaf(score: i64, outcome: Outcome) -> Self {
        Self {
            score,
            outcome,
            steps: 0,
            line: Vec::new(),
        }
    }
}

/// State for a single top-level search call
pub struct Searcher<'e> {
    perspective: Side,
    options: SearchOptions,
    evaluator: &'e dyn Evaluator,
    memo: TranspositionMemo,
    path: NodeSet,
    /// Nodes expanded since the innermost open frame started
    visited: NodeSet,
    stats: SearchStats,
}

impl<'e> Searcher<'e> {
    pub fn new(perspective: Side, options: SearchOptions, evaluator: &'e dyn Evaluator) -> Self {
        Self {
            perspective,
            options,
            evaluator,
            memo: TranspositionMemo::new(),
            path: NodeSet::new(),
            visited: NodeSet::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn perspective(&self) -> Side {
        self.perspective
    }

    /// Search `state` with `turn` to move, full window
    pub fn search_root(&mut self, state: GameState, turn: Side, depth: u32) -> SearchResult {
        let node = self.search(state, depth, turn, -SCORE_INF, SCORE_INF);
        into_result(node)
    }

    /// Value of playing `mv` for `turn`, searched `depth - 1` plies beyond the move
    ///
    /// The mover's own state is placed on the path first, so a reply that
    /// walks straight back into it counts as a loop.
    pub fn score_move(&mut self, state: GameState, turn: Side, mv: Move, depth: u32) -> NodeValue {
        let child = apply_move(state, turn, mv);
        let root_key = (state.key(), turn);
        let inserted = self.path.insert(root_key);
        let value = self.search(
            child,
            depth.saturating_sub(1),
            turn.opponent(),
            -SCORE_INF,
            SCORE_INF,
        );
        if inserted {
            self.path.remove(&root_key);
        }
        value.extend(mv, true)
    }
}

fn into_result(node: NodeValue) -> SearchResult {
    let first_move = node.line.first().copied();
    SearchResult {
        outcome: node.outcome,
        steps: node.steps.saturating_sub(1),
        score: node.score,
        first_move,
        line: node.line,
    }
}

/// One-shot search of `state` rooted at `perspective`
pub fn search_position(
    state: GameState,
    turn: Side,
    perspective: Side,
    depth: u32,
    options: SearchOptions,
) -> SearchResult {
    let evaluator = TacticalEvaluator::default();
    Searcher::new(perspective, options, &evaluator).search_root(state, turn, depth)
}

/// One-shot score of a single candidate move, from the mover's perspective
///
/// Each call uses a fresh memo, so the value is a pure function of its inputs.
pub fn evaluate_move(state: GameState, turn: Side, mv: Move, depth: u32) -> NodeValue {
    let evaluator = TacticalEvaluator::default();
    Searcher::new(turn, SearchOptions::SELECTOR, &evaluator).score_move(state, turn, mv, depth)
}
