//! Text input for the terminal front end
//!
//! States are written `P0,P1:C0,C1` (player hands, then cpu hands), e.g.
//! `1,1:1,1`. Whitespace may replace the commas. Moves are `attack SRC DST`
//! or `split LEFT RIGHT`, abbreviated `a` and `s`.

use crate::core::error::{AppError, AppResult};
use chopsticks_engine::{CpuMode, GameState, Move, Side};

/// A line typed during a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play(Move),
    Hint { force: bool },
    Moves,
    Mode(CpuMode),
    Reset,
    Help,
    Quit,
}

fn parse_digit(what: &'static str, input: &str, token: &str) -> AppResult<u8> {
    token
        .parse::<u8>()
        .map_err(|e| AppError::parse(what, input, format!("'{}': {}", token, e)))
}

fn parse_pair(input: &str, half: &str) -> AppResult<[u8; 2]> {
    let tokens: Vec<&str> = half
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    match tokens.as_slice() {
        [a, b] => Ok([parse_digit("state", input, a)?, parse_digit("state", input, b)?]),
        _ => Err(AppError::parse("state", input, "each side needs exactly two hands")),
    }
}

/// Parse `P0,P1:C0,C1`
pub fn parse_state(input: &str) -> AppResult<GameState> {
    let (player, cpu) = input
        .trim()
        .split_once([':', '/'])
        .ok_or_else(|| AppError::parse("state", input, "expected PLAYER:CPU"))?;
    let state = GameState::new(parse_pair(input, player)?, parse_pair(input, cpu)?)?;
    Ok(state)
}

/// Parse `player`/`p` or `cpu`/`c`
pub fn parse_side(input: &str) -> AppResult<Side> {
    match input.trim().to_ascii_lowercase().as_str() {
        "player" | "p" | "human" => Ok(Side::Player),
        "cpu" | "c" | "computer" => Ok(Side::Cpu),
        _ => Err(AppError::parse("side", input, "expected 'player' or 'cpu'")),
    }
}

/// Parse `attack SRC DST` or `split LEFT RIGHT`
pub fn parse_move(input: &str) -> AppResult<Move> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    match tokens.as_slice() {
        [kind, x, y] => {
            let x = parse_digit("move", input, x)?;
            let y = parse_digit("move", input, y)?;
            match kind.to_ascii_lowercase().as_str() {
                "a" | "attack" => Ok(Move::Attack { src: x, dst: y }),
                "s" | "split" => Ok(Move::Split { left: x, right: y }),
                other => Err(AppError::parse("move", input, format!("unknown move kind '{}'", other))),
            }
        }
        _ => Err(AppError::parse("move", input, "expected 'attack SRC DST' or 'split LEFT RIGHT'")),
    }
}

/// Parse one line of match input
pub fn parse_command(input: &str) -> AppResult<Command> {
    let trimmed = input.trim();
    let mut words = trimmed.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    match head.as_str() {
        "hint" | "h" => Ok(Command::Hint { force: false }),
        "hint!" | "h!" => Ok(Command::Hint { force: true }),
        "moves" | "m" => Ok(Command::Moves),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "mode" => {
            let name = words
                .next()
                .ok_or_else(|| AppError::parse("mode", input, "expected a mode name"))?;
            let mode = name
                .parse::<CpuMode>()
                .map_err(|reason| AppError::parse("mode", input, reason))?;
            Ok(Command::Mode(mode))
        }
        _ => parse_move(trimmed).map(Command::Play),
    }
}
