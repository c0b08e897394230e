//! Plain-text rendering for the terminal front end

use chopsticks_engine::{CpuTurn, GameState, Move, Outcome, SearchResult, Side};
use std::fmt::Write as _;

fn hand(value: u8) -> String {
    if value == 0 {
        " x ".to_string()
    } else {
        format!("[{}]", value)
    }
}

/// Two-row board, cpu on top
pub fn render_state(state: &GameState) -> String {
    let cpu = state.cpu();
    let player = state.player();
    format!(
        "  cpu     {} {}\n  player  {} {}\n",
        hand(cpu[0]),
        hand(cpu[1]),
        hand(player[0]),
        hand(player[1])
    )
}

/// Numbered move list
pub fn render_moves(moves: &[Move]) -> String {
    let mut out = String::new();
    for (i, mv) in moves.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", i + 1, mv);
    }
    out
}

/// One-line hint summary plus the expected line
pub fn render_hint(hint: &SearchResult) -> String {
    let Some(first) = hint.first_move else {
        return "hint: no legal move, you must pass\n".to_string();
    };
    let verdict = match hint.outcome {
        Outcome::Win => format!("wins in {} more plies", hint.steps),
        Outcome::Lose => format!("loses in {} more plies at best", hint.steps),
        Outcome::Loop => "leads into a repetition".to_string(),
        Outcome::Draw => format!("undecided (score {})", hint.score),
    };
    let line: Vec<String> = hint.line.iter().map(ToString::to_string).collect();
    format!("hint: {} ({})\n  line: {}\n", first, verdict, line.join(", "))
}

/// What the cpu just did
pub fn render_cpu_turn(turn: &CpuTurn) -> String {
    let mut out = match turn.played {
        Some(mv) => format!("cpu plays {}", mv),
        None => "cpu has no legal move and passes".to_string(),
    };
    if let Some(scheduled) = &turn.scheduled {
        let source = if scheduled.from_ponder { "pondered" } else { "searched" };
        let _ = write!(
            out,
            " ({}, depth {}, {} ms)",
            source, scheduled.depth_used, scheduled.elapsed_ms
        );
    }
    if turn.was_replaced() {
        out.push_str(" [replaced an illegal proposal]");
    }
    out.push('\n');
    out
}

/// Final banner
pub fn render_winner(winner: Side) -> String {
    match winner {
        Side::Player => "You win!\n".to_string(),
        Side::Cpu => "The cpu wins.\n".to_string(),
    }
}

pub const HELP: &str = "\
commands:
  attack SRC DST   (a 0 1)  tap cpu hand DST with your hand SRC
  split L R        (s 1 3)  rearrange your fingers as L and R
  hint  / hint!             suggest a move (hint! recomputes)
  moves                     list legal moves
  mode NAME                 weakest | normal | hard | strong
  reset                     start over
  quit
";
