//! One match of chopsticks against the cpu
//!
//! The session is the only place the live game state changes. It validates
//! every move before applying it, keeps the bounded history the selector
//! uses for repeat avoidance, caches hints and owns the search scheduler.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::hint::HintCache;
use crate::move_gen::{apply_move, legal_moves, validate_move};
use crate::scheduler::{JobId, ScheduledMove, SearchScheduler};
use crate::selector::{choose_cpu_move_with, fallback_move};
use crate::types::{CpuMode, GameState, Move, SearchResult, Side, StateKey};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// What happened on a cpu turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTurn {
    /// Move actually applied; `None` is a pass
    pub played: Option<Move>,
    /// Move the selector or scheduler came up with
    pub proposed: Option<Move>,
    /// Timing details when the move came from the scheduler
    pub scheduled: Option<ScheduledMove>,
}

impl CpuTurn {
    /// Whether the proposed move was rejected and replaced
    pub fn was_replaced(&self) -> bool {
        self.proposed.is_some() && self.played != self.proposed
    }
}

pub struct Session {
    config: EngineConfig,
    state: GameState,
    turn: Side,
    mode: CpuMode,
    history: VecDeque<StateKey>,
    hints: HintCache,
    scheduler: SearchScheduler,
    rng: StdRng,
    plies: u32,
}

impl Session {
    /// New match from the initial position, player to move
    pub fn new(config: EngineConfig, mode: CpuMode) -> EngineResult<Self> {
        Self::from_position(config, mode, GameState::initial(), Side::Player)
    }

    /// Session starting from an arbitrary position
    pub fn from_position(config: EngineConfig, mode: CpuMode, state: GameState, turn: Side) -> EngineResult<Self> {
        config.validate()?;
        let scheduler = SearchScheduler::new(config.clone());
        Ok(Self::assemble(config, mode, state, turn, scheduler))
    }

    /// Session whose cpu searches always run on the caller's thread
    pub fn inline(config: EngineConfig, mode: CpuMode) -> EngineResult<Self> {
        config.validate()?;
        let scheduler = SearchScheduler::inline(config.clone());
        Ok(Self::assemble(config, mode, GameState::initial(), Side::Player, scheduler))
    }

    fn assemble(config: EngineConfig, mode: CpuMode, state: GameState, turn: Side, scheduler: SearchScheduler) -> Self {
        Self {
            rng: session_rng(config.rng_seed),
            hints: HintCache::new(config.hint_depth),
            history: VecDeque::with_capacity(config.history_len),
            config,
            state,
            turn,
            mode,
            scheduler,
            plies: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn mode(&self) -> CpuMode {
        self.mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plies applied since the session started or was reset
    pub fn plies(&self) -> u32 {
        self.plies
    }

    /// Recent state keys, oldest first
    pub fn history(&self) -> Vec<StateKey> {
        self.history.iter().copied().collect()
    }

    pub fn winner(&self) -> Option<Side> {
        self.state.winner()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn scheduler(&self) -> &SearchScheduler {
        &self.scheduler
    }

    pub fn search_invocations(&self) -> u64 {
        self.scheduler.search_invocations()
    }

    /// Back to the initial position with every cache cleared
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.state = GameState::initial();
        self.turn = Side::Player;
        self.history.clear();
        self.hints.clear();
        self.rng = session_rng(self.config.rng_seed);
        self.plies = 0;
        info!("[SESSION] reset ({})", self.mode);
    }

    /// Switch difficulty; pending and pondered cpu work is discarded
    pub fn set_mode(&mut self, mode: CpuMode) {
        if mode == self.mode {
            return;
        }
        self.scheduler.reset();
        info!("[SESSION] mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    fn expect_turn(&self, side: Side) -> EngineResult<()> {
        if self.is_over() {
            return Err(EngineError::GameOver);
        }
        if self.turn != side {
            return Err(EngineError::NotYourTurn { side });
        }
        Ok(())
    }

    fn commit(&mut self, side: Side, mv: Move) {
        self.state = apply_move(self.state, side, mv);
        self.turn = side.opponent();
        self.plies += 1;
        self.history.push_back(self.state.key());
        while self.history.len() > self.config.history_len {
            self.history.pop_front();
        }
        self.hints.clear();
        debug!("[SESSION] {} played {} -> {}", side, mv, self.state);
        if let Some(winner) = self.state.winner() {
            info!("[SESSION] {} wins after {} plies", winner, self.plies);
        }
    }

    /// Validate and apply the human player's move
    pub fn apply_player_move(&mut self, mv: Move) -> EngineResult<GameState> {
        self.expect_turn(Side::Player)?;
        validate_move(&self.state, Side::Player, mv)?;
        self.commit(Side::Player, mv);
        Ok(self.state)
    }

    /// Apply the cpu's proposal, replacing it if it is unusable
    ///
    /// An illegal proposal is logged and swapped for a fresh legal move. A
    /// missing proposal with moves available gets the same treatment; with
    /// no moves at all the cpu passes.
    pub(crate) fn resolve_cpu_move(&mut self, proposed: Option<Move>) -> Option<Move> {
        let history = self.history();
        let played = match proposed {
            Some(mv) => match validate_move(&self.state, Side::Cpu, mv) {
                Ok(()) => Some(mv),
                Err(e) => {
                    error!("[SESSION] rejected cpu move {} at {}: {}", mv, self.state, e);
                    fallback_move(self.state, &history, &self.config.selector)
                }
            },
            None if legal_moves(&self.state, Side::Cpu).is_empty() => None,
            None => {
                warn!("[SESSION] cpu produced no move at {}; using fallback", self.state);
                fallback_move(self.state, &history, &self.config.selector)
            }
        };

        match played {
            Some(mv) => self.commit(Side::Cpu, mv),
            None => {
                info!("[SESSION] cpu has no legal move at {}; passing", self.state);
                self.turn = Side::Player;
            }
        }
        played
    }

    /// Choose and apply the cpu's move on the caller's thread
    pub fn cpu_move_sync(&mut self) -> EngineResult<CpuTurn> {
        self.expect_turn(Side::Cpu)?;
        let history = self.history();
        let proposed = choose_cpu_move_with(self.state, self.mode, &history, &self.config.selector, &mut self.rng);
        let played = self.resolve_cpu_move(proposed);
        Ok(CpuTurn {
            played,
            proposed,
            scheduled: None,
        })
    }

    /// Hand the cpu's move to the scheduler; collect it with `poll_cpu_move`
    pub fn request_cpu_move(&mut self) -> EngineResult<JobId> {
        self.expect_turn(Side::Cpu)?;
        let history = self.history();
        Ok(self.scheduler.request_move(self.state, self.mode, &history))
    }

    /// Apply the scheduled cpu move if it has been released
    pub fn poll_cpu_move(&mut self) -> Option<CpuTurn> {
        let released = self.scheduler.poll()?;
        self.accept_scheduled(released)
    }

    /// Block until the scheduled cpu move is released and apply it
    pub fn wait_cpu_move(&mut self) -> Option<CpuTurn> {
        let released = self.scheduler.wait()?;
        self.accept_scheduled(released)
    }

    fn accept_scheduled(&mut self, released: ScheduledMove) -> Option<CpuTurn> {
        if self.turn != Side::Cpu || self.is_over() || released.state_key != self.state.key() {
            warn!("[SESSION] dropping cpu move for job {} computed for another position", released.job);
            return None;
        }
        let proposed = released.mv;
        let played = self.resolve_cpu_move(proposed);
        Some(CpuTurn {
            played,
            proposed,
            scheduled: Some(released),
        })
    }

    /// Abandon the scheduled cpu move
    pub fn cancel_cpu_move(&mut self) {
        self.scheduler.cancel();
    }

    /// Ponder cpu replies while the player thinks; `false` if nothing was started
    pub fn start_pondering(&mut self) -> bool {
        if self.turn != Side::Player || self.is_over() {
            return false;
        }
        let history = self.history();
        self.scheduler.ponder(self.state, self.mode, &history)
    }

    /// Best line for the player from the current position
    pub fn hint(&mut self, force: bool) -> EngineResult<SearchResult> {
        self.expect_turn(Side::Player)?;
        Ok(self.hints.get_or_compute(self.state, force))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("turn", &self.turn)
            .field("mode", &self.mode)
            .field("plies", &self.plies)
            .field("history", &self.history)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        // Offset so the session and the worker do not replay the same stream
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_gen::is_legal_move;
    use crate::types::Outcome;

    fn config() -> EngineConfig {
        let mut config = EngineConfig {
            rng_seed: Some(99),
            background_search: false,
            ..EngineConfig::default()
        };
        for mode in CpuMode::ALL {
            let profile = config.profiles.get_mut(mode);
            *profile = profile.without_pacing();
        }
        config
    }

    fn session_at(state: GameState, turn: Side, mode: CpuMode) -> Session {
        Session::from_position(config(), mode, state, turn).unwrap()
    }

    #[test]
    fn test_new_session_starts_at_initial_position() {
        let session = Session::new(config(), CpuMode::Normal).unwrap();
        assert_eq!(session.state(), GameState::initial());
        assert_eq!(session.turn(), Side::Player);
        assert!(session.history().is_empty());
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config();
        bad.history_len = 0;
        assert!(matches!(
            Session::new(bad, CpuMode::Normal),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_illegal_player_move_leaves_state_alone() {
        let mut session = session_at(GameState::new([0, 2], [1, 3]).unwrap(), Side::Player, CpuMode::Hard);
        let before = session.state();
        let err = session
            .apply_player_move(Move::Attack { src: 0, dst: 1 })
            .unwrap_err();
        assert_eq!(err, EngineError::DeadSource { side: Side::Player, src: 0 });
        assert_eq!(session.state(), before);
        assert_eq!(session.turn(), Side::Player);
    }

    #[test]
    fn test_turn_order_is_enforced() {
        let mut session = Session::new(config(), CpuMode::Normal).unwrap();
        assert_eq!(
            session.cpu_move_sync().unwrap_err(),
            EngineError::NotYourTurn { side: Side::Cpu }
        );
        session.apply_player_move(Move::Attack { src: 0, dst: 0 }).unwrap();
        assert_eq!(session.turn(), Side::Cpu);
        assert_eq!(
            session.apply_player_move(Move::Attack { src: 0, dst: 0 }).unwrap_err(),
            EngineError::NotYourTurn { side: Side::Player }
        );
    }

    #[test]
    fn test_cpu_sync_move_is_legal_and_flips_turn() {
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        for mode in CpuMode::ALL {
            let mut session = session_at(state, Side::Cpu, mode);
            let turn = session.cpu_move_sync().unwrap();
            let played = turn.played.unwrap();
            assert!(is_legal_move(&state, Side::Cpu, played));
            assert!(!turn.was_replaced());
            assert_eq!(session.turn(), Side::Player);
            assert_eq!(session.history(), vec![session.state().key()]);
        }
    }

    #[test]
    fn test_illegal_cpu_proposal_is_replaced() {
        let state = GameState::new([2, 3], [0, 4]).unwrap();
        let mut session = session_at(state, Side::Cpu, CpuMode::Strong);
        // Hand 0 is dead
        let bad = Move::Attack { src: 0, dst: 0 };
        let played = session.resolve_cpu_move(Some(bad)).unwrap();
        assert_ne!(played, bad);
        assert!(is_legal_move(&state, Side::Cpu, played));
        assert_eq!(session.state(), apply_move(state, Side::Cpu, played));
    }

    #[test]
    fn test_missing_cpu_proposal_uses_fallback() {
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        let mut session = session_at(state, Side::Cpu, CpuMode::Normal);
        let played = session.resolve_cpu_move(None).unwrap();
        assert!(is_legal_move(&state, Side::Cpu, played));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut cfg = config();
        cfg.history_len = 3;
        let mut session = Session::from_position(cfg, CpuMode::Hard, GameState::initial(), Side::Player).unwrap();
        for _ in 0..4 {
            if session.is_over() {
                break;
            }
            let mv = legal_moves(&session.state(), Side::Player)[0];
            session.apply_player_move(mv).unwrap();
            if session.is_over() {
                break;
            }
            session.cpu_move_sync().unwrap();
        }
        assert!(session.history().len() <= 3);
        assert_eq!(session.history().last().copied(), Some(session.state().key()));
    }

    #[test]
    fn test_scheduled_move_is_applied() {
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        let mut session = session_at(state, Side::Cpu, CpuMode::Hard);
        session.request_cpu_move().unwrap();
        let turn = session.wait_cpu_move().unwrap();
        assert!(turn.scheduled.is_some());
        assert!(is_legal_move(&state, Side::Cpu, turn.played.unwrap()));
        assert_eq!(session.turn(), Side::Player);
    }

    #[test]
    fn test_cancelled_cpu_move_is_never_applied() {
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        let mut session = session_at(state, Side::Cpu, CpuMode::Hard);
        session.request_cpu_move().unwrap();
        session.cancel_cpu_move();
        assert!(session.poll_cpu_move().is_none());
        assert!(session.wait_cpu_move().is_none());
        assert_eq!(session.state(), state);
        assert_eq!(session.turn(), Side::Cpu);
    }

    #[test]
    fn test_mode_change_drops_pending_move() {
        let state = GameState::new([2, 3], [1, 4]).unwrap();
        let mut session = session_at(state, Side::Cpu, CpuMode::Hard);
        session.request_cpu_move().unwrap();
        session.set_mode(CpuMode::Strong);
        assert_eq!(session.mode(), CpuMode::Strong);
        assert!(!session.scheduler().has_pending());
        assert!(session.poll_cpu_move().is_none());
    }

    #[test]
    fn test_hint_is_cached_until_state_changes() {
        let mut cfg = config();
        cfg.hint_depth = 6;
        let mut session = Session::from_position(cfg, CpuMode::Normal, GameState::initial(), Side::Player).unwrap();
        let hint = session.hint(false).unwrap();
        assert_eq!(session.hint(false).unwrap(), hint);
        assert_eq!(session.hint(true).unwrap(), hint);

        session.apply_player_move(hint.first_move.unwrap()).unwrap();
        assert_eq!(session.hint(false).unwrap_err(), EngineError::NotYourTurn { side: Side::Player });
    }

    #[test]
    fn test_hint_reports_win_in_one() {
        let state = GameState::new([4, 1], [1, 0]).unwrap();
        let mut session = session_at(state, Side::Player, CpuMode::Normal);
        let hint = session.hint(false).unwrap();
        assert_eq!(hint.outcome, Outcome::Win);
        assert_eq!(hint.steps, 0);
        session.apply_player_move(hint.first_move.unwrap()).unwrap();
        assert_eq!(session.winner(), Some(Side::Player));
        assert_eq!(session.cpu_move_sync().unwrap_err(), EngineError::GameOver);
    }

    #[test]
    fn test_reset_restores_initial_position() {
        let mut session = Session::new(config(), CpuMode::Normal).unwrap();
        session.apply_player_move(Move::Attack { src: 0, dst: 1 }).unwrap();
        session.cpu_move_sync().unwrap();
        session.reset();
        assert_eq!(session.state(), GameState::initial());
        assert_eq!(session.turn(), Side::Player);
        assert_eq!(session.plies(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_strong_cpu_plays_a_whole_match_legally() {
        let mut session = Session::new(config(), CpuMode::Strong).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        while !session.is_over() && session.plies() < 30 {
            let moves = legal_moves(&session.state(), Side::Player);
            let mv = *rand::seq::IndexedRandom::choose(moves.as_slice(), &mut rng).unwrap();
            session.apply_player_move(mv).unwrap();
            if session.is_over() {
                break;
            }
            let before = session.state();
            let turn = session.cpu_move_sync().unwrap();
            assert!(is_legal_move(&before, Side::Cpu, turn.played.unwrap()));
        }
    }
}
