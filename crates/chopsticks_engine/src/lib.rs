//! # Chopsticks Engine
//!
//! CPU opponent and hint engine for the two-hand finger game.
//!
//! ## Module Organization
//!
//! - `types` - hands, states, moves, outcomes and cpu modes
//! - `move_gen` - legal moves, validation and move application
//! - `evaluation` - static scoring behind the [`Evaluator`] trait
//! - `hash` - per-search transposition memo
//! - `search` - minimax with alpha-beta, loop detection and iterative deepening
//! - `selector` - cpu move choice per difficulty tier
//! - `hint` - full-line search for the human player
//! - `scheduler` - background worker, pondering and think-time pacing
//! - `session` - one match: live state, history, caches and scheduler
//! - `config` - tunable depths, probabilities and per-mode profiles
//! - `api` - one-shot helpers

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluation;
pub mod hash;
pub mod hint;
pub mod move_gen;
pub mod scheduler;
pub mod search;
pub mod selector;
pub mod session;
pub mod types;

pub use config::{EngineConfig, ModeProfile, ModeProfiles, SelectorConfig};
pub use error::{EngineError, EngineResult};
pub use evaluation::{EvalWeights, Evaluator, MaterialEvaluator, TacticalEvaluator};
pub use hint::{compute_hint, HintCache};
pub use move_gen::{apply_move, is_legal_move, legal_moves, validate_move};
pub use scheduler::{ScheduledMove, SearchScheduler};
pub use search::{search_position, SearchOptions};
pub use selector::choose_cpu_move;
pub use session::{CpuTurn, Session};
pub use types::{CpuMode, GameState, Move, Outcome, SearchResult, Side, StateKey};
