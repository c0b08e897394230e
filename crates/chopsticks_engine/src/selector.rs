//! CPU move selection per difficulty tier
//!
//! | Mode    | Behavior                                                     |
//! |---------|--------------------------------------------------------------|
//! | weakest | depth 12, picks the *lowest* scoring move, avoids repeats    |
//! | normal  | 20% random, 30% depth 1, 50% depth 6, repeat penalty         |
//! | hard    | 10% random, otherwise depth 6 with repeat penalty            |
//! | strong  | depth 12, picks the highest scoring move, avoids repeats     |
//!
//! Each candidate is scored from the cpu's perspective with its own fresh
//! search, so a candidate's score never depends on the order candidates
//! were examined in.

use crate::config::SelectorConfig;
use crate::constants::FALLBACK_SEARCH_DEPTH;
use crate::move_gen::{apply_move, legal_moves};
use crate::search::evaluate_move;
use crate::types::{CpuMode, GameState, Move, Outcome, Side, StateKey};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which end of the score range a mode is aiming for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Min,
    Max,
}

impl Direction {
    /// Whether `a` is strictly preferred to `b`
    #[inline]
    pub fn prefers(self, a: i64, b: i64) -> bool {
        match self {
            Direction::Min => a < b,
            Direction::Max => a > b,
        }
    }
}

/// What a mode decided to do for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPlan {
    /// Uniformly random legal move
    Random,
    /// Fixed-depth minimax over the cpu's candidates
    Search {
        depth: u32,
        direction: Direction,
        /// Shift scores by the repeat penalty
        penalize_repeats: bool,
        /// Drop candidates that revisit recent history, unless that drops all of them
        avoid_repeats: bool,
    },
}

/// A scored cpu candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    pub key: StateKey,
    pub raw: i64,
    pub adjusted: i64,
    pub repeats: usize,
    pub outcome: Outcome,
}

/// Roll the dice for `mode`
pub fn plan_selection<R: Rng + ?Sized>(mode: CpuMode, cfg: &SelectorConfig, rng: &mut R) -> SelectionPlan {
    let penalized = |depth| SelectionPlan::Search {
        depth,
        direction: Direction::Max,
        penalize_repeats: true,
        avoid_repeats: false,
    };

    match mode {
        CpuMode::Weakest => SelectionPlan::Search {
            depth: cfg.deep_depth,
            direction: Direction::Min,
            penalize_repeats: false,
            avoid_repeats: true,
        },
        CpuMode::Strong => SelectionPlan::Search {
            depth: cfg.deep_depth,
            direction: Direction::Max,
            penalize_repeats: false,
            avoid_repeats: true,
        },
        CpuMode::Hard => {
            if rng.random_bool(cfg.hard_random_chance) {
                SelectionPlan::Random
            } else {
                penalized(cfg.shallow_depth)
            }
        }
        CpuMode::Normal => {
            let roll: f64 = rng.random();
            if roll < cfg.normal_random_chance {
                SelectionPlan::Random
            } else if roll < cfg.normal_random_chance + cfg.normal_greedy_chance {
                penalized(cfg.greedy_depth)
            } else {
                penalized(cfg.shallow_depth)
            }
        }
    }
}

/// Occurrences of `key` in the recent history
pub fn repeat_count(history: &[StateKey], key: StateKey) -> usize {
    history.iter().filter(|&&k| k == key).count()
}

/// Raw score shifted by `repeats × penalty`: added when maximizing, subtracted when minimizing
pub fn apply_repeat_penalty(raw: i64, repeats: usize, penalty: i64, direction: Direction) -> i64 {
    let shift = repeats as i64 * penalty;
    match direction {
        Direction::Max => raw + shift,
        Direction::Min => raw - shift,
    }
}

/// Score every move in `moves` for the cpu at `depth`
pub fn evaluate_candidates(
    state: GameState,
    moves: &[Move],
    depth: u32,
    direction: Direction,
    history: &[StateKey],
    penalty: Option<i64>,
) -> Vec<Candidate> {
    moves
        .iter()
        .map(|&mv| {
            let key = apply_move(state, Side::Cpu, mv).key();
            let value = evaluate_move(state, Side::Cpu, mv, depth);
            let repeats = repeat_count(history, key);
            let adjusted = match penalty {
                Some(p) => apply_repeat_penalty(value.score, repeats, p, direction),
                None => value.score,
            };
            Candidate {
                mv,
                key,
                raw: value.score,
                adjusted,
                repeats,
                outcome: value.outcome,
            }
        })
        .collect()
}

/// Best candidate for `direction` by adjusted score; ties keep the earliest
pub fn pick_best(candidates: &[Candidate], direction: Direction) -> Option<&Candidate> {
    candidates.iter().fold(None, |best: Option<&Candidate>, c| match best {
        Some(b) if !direction.prefers(c.adjusted, b.adjusted) => Some(b),
        _ => Some(c),
    })
}

/// Candidates whose resulting state is not in `history`, or all of them if none qualify
pub fn fresh_moves(state: GameState, moves: &[Move], history: &[StateKey]) -> Vec<Move> {
    let fresh: Vec<Move> = moves
        .iter()
        .copied()
        .filter(|&mv| !history.contains(&apply_move(state, Side::Cpu, mv).key()))
        .collect();
    if fresh.is_empty() {
        moves.to_vec()
    } else {
        fresh
    }
}

/// Run a plan at an explicit depth and return the chosen candidate
#[allow(clippy::too_many_arguments)]
pub fn search_candidates(
    state: GameState,
    moves: &[Move],
    depth: u32,
    direction: Direction,
    penalize_repeats: bool,
    avoid_repeats: bool,
    history: &[StateKey],
    cfg: &SelectorConfig,
) -> Option<Candidate> {
    let pool = if avoid_repeats {
        fresh_moves(state, moves, history)
    } else {
        moves.to_vec()
    };
    let penalty = penalize_repeats.then_some(cfg.repeat_penalty);
    let candidates = evaluate_candidates(state, &pool, depth, direction, history, penalty);
    pick_best(&candidates, direction).cloned()
}

/// Quick replacement move when the chosen one is unusable
///
/// A shallow penalized search, or the first legal move if even that finds
/// nothing. `None` only when the cpu has no move at all.
pub fn fallback_move(state: GameState, history: &[StateKey], cfg: &SelectorConfig) -> Option<Move> {
    let moves = legal_moves(&state, Side::Cpu);
    search_candidates(
        state,
        &moves,
        FALLBACK_SEARCH_DEPTH,
        Direction::Max,
        true,
        false,
        history,
        cfg,
    )
    .map(|c| c.mv)
    .or_else(|| moves.first().copied())
}

/// Carry out `plan` for the cpu
pub fn execute_plan<R: Rng + ?Sized>(
    state: GameState,
    plan: SelectionPlan,
    history: &[StateKey],
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Option<Move> {
    let moves = legal_moves(&state, Side::Cpu);
    if moves.is_empty() {
        info!("[AI] cpu has no legal move at {}; passing", state);
        return None;
    }

    match plan {
        SelectionPlan::Random => {
            let mv = moves.choose(rng).copied();
            debug!("[AI] random pick {:?}", mv);
            mv
        }
        SelectionPlan::Search {
            depth,
            direction,
            penalize_repeats,
            avoid_repeats,
        } => {
            let best = search_candidates(
                state,
                &moves,
                depth,
                direction,
                penalize_repeats,
                avoid_repeats,
                history,
                cfg,
            )?;
            debug!(
                "[AI] depth {} {:?} pick {} (raw {}, adjusted {}, {})",
                depth, direction, best.mv, best.raw, best.adjusted, best.outcome
            );
            Some(best.mv)
        }
    }
}

/// Choose the cpu's move for `mode` with explicit tuning
pub fn choose_cpu_move_with<R: Rng + ?Sized>(
    state: GameState,
    mode: CpuMode,
    history: &[StateKey],
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Option<Move> {
    let plan = plan_selection(mode, cfg, rng);
    execute_plan(state, plan, history, cfg, rng)
}

/// Choose the cpu's move for `mode`; `None` means the cpu must pass
pub fn choose_cpu_move<R: Rng + ?Sized>(
    state: GameState,
    mode: CpuMode,
    history: &[StateKey],
    rng: &mut R,
) -> Option<Move> {
    choose_cpu_move_with(state, mode, history, &SelectorConfig::default(), rng)
}
