//! Worker protocol
//!
//! Requests flow from the scheduler to the worker thread and responses flow
//! back. Every job carries the id it was issued under; the scheduler drops
//! any response whose id is no longer the latest of its kind.

use crate::config::ModeProfile;
use crate::search::StopReason;
use crate::types::{CpuMode, GameState, Move, StateKey};

/// Monotonic job identifier
pub type JobId = u64;

/// Everything the worker needs to pick one cpu reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveJob {
    pub job: JobId,
    pub state: GameState,
    pub mode: CpuMode,
    pub history: Vec<StateKey>,
    pub profile: ModeProfile,
}

/// Speculative replies to each candidate player move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PonderJob {
    pub job: JobId,
    /// Position with the player to move
    pub state: GameState,
    pub mode: CpuMode,
    pub history: Vec<StateKey>,
    pub profile: ModeProfile,
    pub player_moves: Vec<Move>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    ComputeMove(MoveJob),
    PonderMoves(PonderJob),
    Cancel,
    Reset,
    Shutdown,
}

/// Worker's answer for a move job
///
/// Deepening jobs report after every iteration with `complete == false` and
/// once more at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedMove {
    pub job: JobId,
    pub state_key: StateKey,
    pub mv: Option<Move>,
    pub depth_used: u32,
    pub elapsed_ms: u64,
    pub complete: bool,
    pub stop: Option<StopReason>,
}

/// Precomputed reply for the position a player move leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PonderEntry {
    pub job: JobId,
    pub player_move: Move,
    /// Position after the player move, cpu to move
    pub state_key: StateKey,
    pub mode: CpuMode,
    pub mv: Option<Move>,
    pub depth_used: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResponse {
    MoveComputed(ComputedMove),
    PonderReady(PonderEntry),
}
