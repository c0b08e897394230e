//! Error types for the chopsticks engine
//!
//! Covers state construction, move validation and the background search
//! worker. Running out of legal moves is not an error: callers get `None`
//! and treat it as a pass.

use crate::types::{Move, Side};
use thiserror::Error;

/// Errors that can occur in the chopsticks engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Hand value outside the 0..=5 range
    #[error("Invalid hand value: {value} (must be 0-5)")]
    InvalidHandValue { value: u8 },

    /// Hand index outside 0..=1
    #[error("Invalid hand index: {index} (must be 0 or 1)")]
    InvalidHandIndex { index: u8 },

    /// Attack launched from a dead hand
    #[error("{side} cannot attack from dead hand {src}")]
    DeadSource { side: Side, src: u8 },

    /// Attack aimed at a dead hand
    #[error("{side} cannot attack dead opponent hand {dst}")]
    DeadTarget { side: Side, dst: u8 },

    /// Split that breaks conservation, produces a dead hand or is a no-op
    #[error("{side} cannot split into [{left}, {right}]")]
    InvalidSplit { side: Side, left: u8, right: u8 },

    /// Move attempted after one side already lost
    #[error("Game is already over")]
    GameOver,

    /// Move attempted by the side that is not on turn
    #[error("It is not {side}'s turn")]
    NotYourTurn { side: Side },

    /// Move rejected by the illegal-move defense
    #[error("Illegal move for {side}: {mv}")]
    IllegalMove { side: Side, mv: Move },

    /// Configuration value out of range
    #[error("Invalid engine configuration: {message}")]
    InvalidConfig { message: String },

    /// Background worker could not be reached
    #[error("Search worker unavailable: {message}")]
    WorkerUnavailable { message: String },
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
