//! Public API for the chopsticks engine
//!
//! One-shot helpers for callers that do not need a full [`Session`]: move
//! listing, validated move application, a single cpu decision and a hint.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::hint::compute_hint_at;
use crate::move_gen::{apply_move, legal_moves, validate_move};
use crate::scheduler::SearchScheduler;
use crate::selector::choose_cpu_move_with;
use crate::session::Session;
use crate::types::{CpuMode, GameState, Move, SearchResult, Side, StateKey};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a match with the default configuration
///
/// # Errors
///
/// Only fails if the default configuration is invalid, which would be a bug.
pub fn new_session(mode: CpuMode) -> EngineResult<Session> {
    Session::new(EngineConfig::default(), mode)
}

/// Legal moves for `side`, attacks first
pub fn moves_for(state: &GameState, side: Side) -> Vec<Move> {
    legal_moves(state, side)
}

/// Validate and apply a move
///
/// # Errors
///
/// Returns the reason the move is illegal (dead source, dead target, bad
/// split) or [`crate::EngineError::GameOver`] for a decided position.
///
/// # Examples
///
/// ```rust,ignore
/// let next = play(GameState::initial(), Side::Player, Move::Attack { src: 0, dst: 1 })?;
/// assert_eq!(next.cpu(), [1, 2]);
/// ```
pub fn play(state: GameState, side: Side, mv: Move) -> EngineResult<GameState> {
    validate_move(&state, side, mv)?;
    Ok(apply_move(state, side, mv))
}

/// The cpu's choice for `state` under `mode`
///
/// `seed` fixes the dice for the randomized tiers. `None` means the cpu
/// has no legal move and passes.
pub fn best_move(
    state: GameState,
    mode: CpuMode,
    history: &[StateKey],
    config: &EngineConfig,
    seed: Option<u64>,
) -> Option<Move> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    choose_cpu_move_with(state, mode, history, &config.selector, &mut rng)
}

/// The cpu's choice through the scheduler, deepening for the modes that do
///
/// Blocks until the move is released, honoring the mode's think window.
pub fn scheduled_move(state: GameState, mode: CpuMode, config: &EngineConfig) -> Option<Move> {
    let mut scheduler = SearchScheduler::new(config.clone());
    scheduler.request_move(state, mode, &[]);
    scheduler.wait().and_then(|released| released.mv)
}

/// Best line for the player at the configured hint depth
pub fn hint(state: GameState, config: &EngineConfig) -> SearchResult {
    compute_hint_at(state, config.hint_depth)
}
