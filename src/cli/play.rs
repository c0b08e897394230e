//! Interactive match loop
//!
//! Generic over the reader and writer so matches can be scripted in tests.

use super::parse::{parse_command, Command};
use super::render::{render_cpu_turn, render_hint, render_moves, render_state, render_winner, HELP};
use crate::core::error::AppResult;
use chopsticks_engine::{legal_moves, CpuMode, Session, Side, StateKey};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Front-end switches
#[derive(Debug, Clone, Copy)]
pub struct PlayOptions {
    /// Search cpu replies while waiting for input
    pub ponder: bool,
    /// Print a hint before every player turn
    pub auto_hint: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            ponder: true,
            auto_hint: false,
        }
    }
}

/// How a match loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    pub winner: Option<Side>,
    pub plies: u32,
    /// Input ran out or the player quit before the game was decided
    pub abandoned: bool,
}

/// Run one match until it is decided, the player quits or input ends
pub fn run_match<R: BufRead, W: Write>(
    session: &mut Session,
    mut input: R,
    out: &mut W,
    options: PlayOptions,
) -> AppResult<MatchSummary> {
    writeln!(out, "chopsticks vs the {} cpu. Type 'help' for commands.", session.mode())?;
    let mut show_board = true;
    // Position and mode the worker is already pondering
    let mut pondering: Option<(StateKey, CpuMode)> = None;

    loop {
        if show_board {
            write!(out, "{}", render_state(&session.state()))?;
        }
        show_board = true;

        if let Some(winner) = session.winner() {
            write!(out, "{}", render_winner(winner))?;
            return Ok(MatchSummary {
                winner: Some(winner),
                plies: session.plies(),
                abandoned: false,
            });
        }

        if session.turn() == Side::Cpu {
            session.request_cpu_move()?;
            match session.wait_cpu_move() {
                Some(turn) => write!(out, "{}", render_cpu_turn(&turn))?,
                None => {
                    warn!("[AI] scheduled move was dropped; choosing synchronously");
                    let turn = session.cpu_move_sync()?;
                    write!(out, "{}", render_cpu_turn(&turn))?;
                }
            }
            // A move request stops pondering, even if the position comes round again
            pondering = None;
            continue;
        }

        let position = (session.state().key(), session.mode());
        if options.ponder && pondering != Some(position) && session.start_pondering() {
            debug!("[AI] pondering {}", session.state());
            pondering = Some(position);
        }
        if options.auto_hint {
            write!(out, "{}", render_hint(&session.hint(false)?))?;
        }

        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(abandoned(session));
        }
        if line.trim().is_empty() {
            show_board = false;
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Play(mv)) => {
                if let Err(e) = session.apply_player_move(mv) {
                    writeln!(out, "illegal move: {}", e)?;
                    show_board = false;
                }
            }
            Ok(Command::Hint { force }) => {
                write!(out, "{}", render_hint(&session.hint(force)?))?;
                show_board = false;
            }
            Ok(Command::Moves) => {
                write!(out, "{}", render_moves(&legal_moves(&session.state(), Side::Player)))?;
                show_board = false;
            }
            Ok(Command::Mode(mode)) => {
                session.set_mode(mode);
                writeln!(out, "cpu mode is now {}", mode)?;
                show_board = false;
            }
            Ok(Command::Reset) => {
                session.reset();
                pondering = None;
                writeln!(out, "new game")?;
            }
            Ok(Command::Help) => {
                write!(out, "{}", HELP)?;
                show_board = false;
            }
            Ok(Command::Quit) => return Ok(abandoned(session)),
            Err(e) => {
                writeln!(out, "{}", e)?;
                show_board = false;
            }
        }
    }
}

fn abandoned(session: &mut Session) -> MatchSummary {
    session.cancel_cpu_move();
    MatchSummary {
        winner: None,
        plies: session.plies(),
        abandoned: true,
    }
}
