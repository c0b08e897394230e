//! Integration tests for full chopsticks matches
//!
//! Drives sessions through the public engine API the way a front end does:
//! player moves, background cpu replies, pondering, hints and mode switches.

use chopsticks_engine::{
    is_legal_move, legal_moves, CpuMode, EngineConfig, EngineError, GameState, Move, Session, Side,
};
use std::thread;
use std::time::{Duration, Instant};

/// Settings with a fixed seed and no artificial think delay
fn test_config(background: bool) -> EngineConfig {
    let mut config = EngineConfig {
        rng_seed: Some(2024),
        background_search: background,
        ..EngineConfig::default()
    };
    for mode in CpuMode::ALL {
        let profile = config.profiles.get_mut(mode);
        *profile = profile.without_pacing();
    }
    config
}

/// Play the player's first legal move, then let the cpu answer
fn play_round(session: &mut Session) -> Option<Move> {
    let mv = legal_moves(&session.state(), Side::Player)[0];
    session.apply_player_move(mv).unwrap();
    if session.is_over() {
        return None;
    }
    session.request_cpu_move().unwrap();
    let turn = session.wait_cpu_move().expect("cpu move should be released");
    turn.played
}

// ============================================================================
// Turn Flow
// ============================================================================

#[test]
fn test_new_session_starts_at_initial_position() {
    let session = Session::inline(test_config(false), CpuMode::Normal).unwrap();
    assert_eq!(session.state(), GameState::initial());
    assert_eq!(session.turn(), Side::Player);
    assert_eq!(session.plies(), 0);
    assert!(session.history().is_empty());
}

/// Requesting a cpu move out of turn is an error, not a silent no-op
#[test]
fn test_cpu_cannot_move_on_player_turn() {
    let mut session = Session::inline(test_config(false), CpuMode::Strong).unwrap();
    assert!(matches!(
        session.request_cpu_move(),
        Err(EngineError::NotYourTurn { side: Side::Cpu })
    ));
}

/// Several rounds against the worker thread with pondering in between
///
/// Every cpu move must be legal in the position it was played from and
/// the session must hand the turn back to the player each time.
#[test]
fn test_background_match_plays_legal_moves() {
    let mut session = Session::new(test_config(true), CpuMode::Hard).unwrap();
    for _ in 0..4 {
        if session.is_over() {
            break;
        }
        session.start_pondering();
        let before_player = session.state();
        let mv = legal_moves(&before_player, Side::Player)[0];
        session.apply_player_move(mv).unwrap();
        if session.is_over() {
            break;
        }
        let before_cpu = session.state();
        session.request_cpu_move().unwrap();
        let turn = session.wait_cpu_move().expect("cpu move should be released");
        if let Some(played) = turn.played {
            assert!(is_legal_move(&before_cpu, Side::Cpu, played));
        }
        assert!(session.is_over() || session.turn() == Side::Player);
    }
}

/// A player who thinks without the front end polling still gets the pondered reply
#[test]
fn test_pondered_reply_is_served_after_idle_thinking() {
    let mut session = Session::new(test_config(true), CpuMode::Hard).unwrap();
    let player_moves = legal_moves(&session.state(), Side::Player);
    assert!(session.start_pondering());

    // Nothing touches the session while the worker ponders every player move
    let deadline = Instant::now() + Duration::from_secs(60);
    while session.search_invocations() < player_moves.len() as u64 {
        assert!(Instant::now() < deadline, "pondering did not finish");
        thread::sleep(Duration::from_millis(25));
    }
    let before = session.search_invocations();

    session.apply_player_move(player_moves[0]).unwrap();
    session.request_cpu_move().unwrap();
    let turn = session.wait_cpu_move().expect("cpu move should be released");
    let scheduled = turn.scheduled.expect("scheduled move details");
    assert!(scheduled.from_ponder);
    assert_eq!(session.search_invocations(), before);
}

#[test]
fn test_history_is_bounded() {
    let mut config = test_config(false);
    config.history_len = 3;
    let mut session = Session::inline(config, CpuMode::Weakest).unwrap();
    for _ in 0..4 {
        if session.is_over() {
            break;
        }
        play_round(&mut session);
    }
    assert!(session.history().len() <= 3);
}

// ============================================================================
// Hints And Modes
// ============================================================================

#[test]
fn test_hint_finds_immediate_win() {
    let state = GameState::new([4, 1], [1, 0]).unwrap();
    let mut session = Session::from_position(test_config(false), CpuMode::Strong, state, Side::Player).unwrap();
    let hint = session.hint(false).unwrap();
    assert_eq!(hint.first_move, Some(Move::Attack { src: 0, dst: 0 }));
    assert_eq!(hint.steps, 0);
}

#[test]
fn test_hint_is_refused_on_cpu_turn() {
    let mut session =
        Session::from_position(test_config(false), CpuMode::Strong, GameState::initial(), Side::Cpu).unwrap();
    assert!(session.hint(false).is_err());
}

/// With a kill available, the strong cpu ends the game at once
#[test]
fn test_strong_cpu_takes_winning_attack() {
    let state = GameState::new([1, 0], [4, 1]).unwrap();
    let mut session = Session::from_position(test_config(false), CpuMode::Strong, state, Side::Cpu).unwrap();
    session.request_cpu_move().unwrap();
    let turn = session.wait_cpu_move().unwrap();
    assert_eq!(turn.played, Some(Move::Attack { src: 0, dst: 0 }));
    assert_eq!(session.winner(), Some(Side::Cpu));
}

#[test]
fn test_mode_switch_keeps_position() {
    let mut session = Session::inline(test_config(false), CpuMode::Normal).unwrap();
    play_round(&mut session);
    let state = session.state();
    session.set_mode(CpuMode::Strong);
    assert_eq!(session.mode(), CpuMode::Strong);
    assert_eq!(session.state(), state);
}

#[test]
fn test_reset_returns_to_opening() {
    let mut session = Session::inline(test_config(false), CpuMode::Normal).unwrap();
    play_round(&mut session);
    session.reset();
    assert_eq!(session.state(), GameState::initial());
    assert_eq!(session.turn(), Side::Player);
    assert_eq!(session.plies(), 0);
}
