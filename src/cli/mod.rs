//! Terminal front end: input parsing, text rendering and the match loop

pub mod parse;
pub mod play;
pub mod render;

pub use parse::{parse_command, parse_move, parse_side, parse_state, Command};
pub use play::{run_match, MatchSummary, PlayOptions};
pub use render::{render_cpu_turn, render_hint, render_moves, render_state};
