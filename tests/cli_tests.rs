//! Integration tests for the terminal front end
//!
//! Scripts whole matches through `run_match` with in-memory input and output.

use chopsticks::cli::{parse_state, run_match, PlayOptions};
use chopsticks_engine::{CpuMode, EngineConfig, GameState, Session, Side};
use std::io::Cursor;

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig {
        rng_seed: Some(5),
        background_search: false,
        ..EngineConfig::default()
    };
    for mode in CpuMode::ALL {
        let profile = config.profiles.get_mut(mode);
        *profile = profile.without_pacing();
    }
    config
}

fn options() -> PlayOptions {
    PlayOptions {
        ponder: false,
        auto_hint: false,
    }
}

/// The player finishes a won position and the loop reports it
#[test]
fn test_scripted_win() {
    let state = parse_state("4,1:1,0").unwrap();
    let mut session = Session::from_position(quiet_config(), CpuMode::Normal, state, Side::Player).unwrap();
    let mut out = Vec::new();
    let summary = run_match(&mut session, Cursor::new("attack 0 0\n"), &mut out, options()).unwrap();

    assert_eq!(summary.winner, Some(Side::Player));
    assert_eq!(summary.plies, 1);
    assert!(String::from_utf8(out).unwrap().contains("You win!"));
}

#[test]
fn test_cpu_opens_when_it_has_the_move() {
    let mut session =
        Session::from_position(quiet_config(), CpuMode::Strong, GameState::initial(), Side::Cpu).unwrap();
    let mut out = Vec::new();
    let summary = run_match(&mut session, Cursor::new(""), &mut out, options()).unwrap();

    assert!(summary.abandoned);
    assert_eq!(summary.plies, 1);
    assert!(String::from_utf8(out).unwrap().contains("cpu plays"));
}

#[test]
fn test_auto_hint_prints_before_each_turn() {
    let mut session = Session::inline(quiet_config(), CpuMode::Weakest).unwrap();
    let mut out = Vec::new();
    let opts = PlayOptions {
        auto_hint: true,
        ..options()
    };
    run_match(&mut session, Cursor::new("quit\n"), &mut out, opts).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("hint: "));
}

#[test]
fn test_blank_and_bad_lines_do_not_advance() {
    let mut session = Session::inline(quiet_config(), CpuMode::Normal).unwrap();
    let mut out = Vec::new();
    let summary = run_match(&mut session, Cursor::new("\n\nsplit 9 9\nmode wild\nquit\n"), &mut out, options()).unwrap();
    assert_eq!(summary.plies, 0);
    assert_eq!(session.state(), GameState::initial());
}
