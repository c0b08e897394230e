//! # Engine Constants - Scores, Depths and Tuning Parameters
//!
//! ## Score Scale
//!
//! Heuristic scores stay in the low thousands (see [`crate::evaluation::EvalWeights`]).
//! A decided game scores `WIN_SCORE * (remaining_depth + 1)`, so every terminal
//! value dwarfs every heuristic value, and a win found with more depth left
//! (i.e. sooner) outranks a slower one. Losses mirror this, so the search also
//! prefers the slowest available loss.
//!
//! ## Depths
//!
//! Fixed depths for the synchronous selector and the hint engine. The
//! iterative-deepening profiles in [`crate::config`] start lower and work up
//! to their own caps.

/// Highest stored hand value; 5 only appears in input and normalizes to 0
pub const MAX_HAND_VALUE: u8 = 5;

/// Hands wrap modulo this value
pub const HAND_MODULUS: u8 = 5;

/// Largest value a live hand may hold
pub const MAX_LIVE_VALUE: u8 = 4;

/// Base terminal score, scaled by `(remaining_depth + 1)`
pub const WIN_SCORE: i64 = 1_000_000;

/// Any score at or above this is a forced win (below its negation, a forced loss)
pub const WIN_THRESHOLD: i64 = WIN_SCORE / 2;

/// Alpha-beta window bound
pub const SCORE_INF: i64 = i64::MAX / 4;

/// Depth used by `weakest` and `strong`
pub const DEEP_SEARCH_DEPTH: u32 = 12;

/// Depth used by `hard` and the deep branch of `normal`
pub const SHALLOW_SEARCH_DEPTH: u32 = 6;

/// Depth used by the quick branch of `normal`
pub const GREEDY_SEARCH_DEPTH: u32 = 1;

/// Depth of the full-line hint search
pub const HINT_SEARCH_DEPTH: u32 = 15;

/// Added per history occurrence when maximizing, subtracted when minimizing.
/// Negative, so repeats are discouraged in both directions.
pub const REPEAT_PENALTY: i64 = -250;

/// Recent state keys remembered for repeat avoidance
pub const HISTORY_LEN: usize = 12;

/// Chance that `hard` plays a uniformly random move
pub const HARD_RANDOM_CHANCE: f64 = 0.10;

/// `normal` dispatch: random below the first bound, greedy below the second
pub const NORMAL_RANDOM_CHANCE: f64 = 0.20;
pub const NORMAL_GREEDY_CHANCE: f64 = 0.30;

/// Depth the worker fallback uses when the background search is unavailable
pub const FALLBACK_SEARCH_DEPTH: u32 = 2;
