//! # Core Types - State, Moves and Search Results
//!
//! ## Hand Encoding
//!
//! Each side holds two hands. A hand is a `u8` in `0..=4`; `0` is a dead hand.
//! External input may say `5` for a dead hand (that is how the finger count
//! reads at the table), but [`GameState::new`] normalizes it to `0`. Keeping a
//! single dead code means one position has exactly one [`StateKey`], which the
//! memo, the repetition history, the hint cache and the ponder cache all rely on.
//!
//! ## Immutability
//!
//! [`GameState`] is `Copy` and has no mutating methods. Every transformation in
//! [`crate::move_gen`] returns a fresh value, so search code can hold snapshots
//! without worrying about aliasing the live match state.

use crate::constants::{HAND_MODULUS, MAX_HAND_VALUE};
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A side of the table. Also used as the turn marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Cpu,
}

impl Side {
    /// The other side
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Cpu,
            Side::Cpu => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Cpu => write!(f, "cpu"),
        }
    }
}

/// Returns `true` if a stored or raw hand value is dead (0 or 5)
#[inline]
pub fn is_dead(value: u8) -> bool {
    value % HAND_MODULUS == 0
}

/// Returns `true` if a hand value can attack, be attacked or be split into
#[inline]
pub fn is_alive(value: u8) -> bool {
    !is_dead(value)
}

/// Compact, canonical key for a position (turn not included)
///
/// Base-6 digits in the order player[0], player[1], cpu[0], cpu[1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(pub u16);

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:04}", self.0)
    }
}

/// Immutable snapshot of both sides' hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    player: [u8; 2],
    cpu: [u8; 2],
}

#[derive(Deserialize)]
struct RawGameState {
    player: [u8; 2],
    cpu: [u8; 2],
}

impl TryFrom<RawGameState> for GameState {
    type Error = EngineError;

    fn try_from(raw: RawGameState) -> EngineResult<Self> {
        GameState::new(raw.player, raw.cpu)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState {
    /// Build a state from raw hand values, rejecting anything above 5
    pub fn new(player: [u8; 2], cpu: [u8; 2]) -> EngineResult<Self> {
        for &value in player.iter().chain(cpu.iter()) {
            if value > MAX_HAND_VALUE {
                return Err(EngineError::InvalidHandValue { value });
            }
        }
        Ok(Self {
            player: normalize(player),
            cpu: normalize(cpu),
        })
    }

    /// Opening position: one finger on every hand
    pub const fn initial() -> Self {
        Self {
            player: [1, 1],
            cpu: [1, 1],
        }
    }

    #[inline]
    pub fn player(&self) -> [u8; 2] {
        self.player
    }

    #[inline]
    pub fn cpu(&self) -> [u8; 2] {
        self.cpu
    }

    /// Hands belonging to `side`
    #[inline]
    pub fn hands(&self, side: Side) -> [u8; 2] {
        match side {
            Side::Player => self.player,
            Side::Cpu => self.cpu,
        }
    }

    /// Copy of this state with `side`'s hands replaced (values already canonical)
    pub(crate) fn with_hands(self, side: Side, hands: [u8; 2]) -> Self {
        match side {
            Side::Player => Self {
                player: hands,
                ..self
            },
            Side::Cpu => Self { cpu: hands, ..self },
        }
    }

    /// Number of live hands for `side`
    pub fn alive_count(&self, side: Side) -> u8 {
        self.hands(side).iter().filter(|&&v| is_alive(v)).count() as u8
    }

    /// Sum of `side`'s live hand values
    pub fn alive_sum(&self, side: Side) -> u8 {
        self.hands(side).iter().filter(|&&v| is_alive(v)).sum()
    }

    /// A side is eliminated once both of its hands are dead
    pub fn is_eliminated(&self, side: Side) -> bool {
        self.alive_count(side) == 0
    }

    /// The winning side, if the game is decided
    pub fn winner(&self) -> Option<Side> {
        if self.is_eliminated(Side::Cpu) {
            Some(Side::Player)
        } else if self.is_eliminated(Side::Player) {
            Some(Side::Cpu)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    pub fn key(&self) -> StateKey {
        let [p0, p1] = self.player;
        let [c0, c1] = self.cpu;
        StateKey(p0 as u16 * 216 + p1 as u16 * 36 + c0 as u16 * 6 + c1 as u16)
    }
}

fn normalize(hands: [u8; 2]) -> [u8; 2] {
    [hands[0] % HAND_MODULUS, hands[1] % HAND_MODULUS]
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "player [{}, {}] | cpu [{}, {}]",
            self.player[0], self.player[1], self.cpu[0], self.cpu[1]
        )
    }
}

/// A single move by the side on turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    /// Add own hand `src` onto opponent hand `dst`
    Attack { src: u8, dst: u8 },
    /// Redistribute own live total as `[left, right]`
    Split { left: u8, right: u8 },
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Attack { src, dst } => write!(f, "attack {}->{}", src, dst),
            Move::Split { left, right } => write!(f, "split {}/{}", left, right),
        }
    }
}

/// How a searched line ends, from the searching side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Opponent fully eliminated
    Win,
    /// Depth ran out; scored heuristically
    Draw,
    /// Line revisits a position already on the path; scored heuristically
    Loop,
    /// Perspective side fully eliminated
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Win => "win",
            Outcome::Draw => "draw",
            Outcome::Loop => "loop",
            Outcome::Lose => "lose",
        };
        f.write_str(label)
    }
}

/// Result of a top-level search
///
/// `steps` counts plies played after `first_move` until the line is decided,
/// so an immediately winning first move reports `steps == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub steps: u32,
    pub score: i64,
    pub first_move: Option<Move>,
    pub line: Vec<Move>,
}

/// CPU difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CpuMode {
    /// Deliberately plays the worst move it can find
    Weakest,
    /// Mix of random, greedy and shallow play
    #[default]
    Normal,
    /// Shallow search with an occasional random move
    Hard,
    /// Deep search, no randomness
    Strong,
}

impl CpuMode {
    pub const ALL: [CpuMode; 4] = [
        CpuMode::Weakest,
        CpuMode::Normal,
        CpuMode::Hard,
        CpuMode::Strong,
    ];

    /// Lower-case name used in config files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            CpuMode::Weakest => "weakest",
            CpuMode::Normal => "normal",
            CpuMode::Hard => "hard",
            CpuMode::Strong => "strong",
        }
    }
}

impl fmt::Display for CpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CpuMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CpuMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown cpu mode '{}'", s))
    }
}
