//! Background search scheduling
//!
//! The scheduler runs cpu searches off the caller's thread, paces the
//! result between a mode's `min_think_ms` and `max_think_ms`, and ponders
//! replies to every player move while the player is still deciding.
//!
//! ## Module Organization
//!
//! - `messages` - request/response enums exchanged with the worker
//! - `worker` - the worker thread and shared job tokens
//! - `ponder` - cache of precomputed replies
//!
//! Without a worker (disabled in config or failed to spawn) move jobs run
//! inline on the caller's thread and pondering is skipped.

mod messages;
mod ponder;
mod worker;

pub use messages::{ComputedMove, JobId, MoveJob, PonderEntry, PonderJob, SearchRequest, SearchResponse};
pub use ponder::PonderCache;
pub use worker::{spawn_worker, JobTokens, WorkerHandle};

use crate::config::{EngineConfig, ModeProfile};
use crate::move_gen::legal_moves;
use crate::search::DeepeningLimits;
use crate::selector::fallback_move;
use crate::types::{CpuMode, GameState, Move, Side, StateKey};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use futures_lite::future::block_on;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use web_time::Instant;
use worker::{compute_reply, make_rng};

/// How long a blocking wait sleeps between checks
const WAIT_SLICE: Duration = Duration::from_millis(5);

/// A cpu move released by the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMove {
    pub job: JobId,
    /// State the move was computed for
    pub state_key: StateKey,
    /// `None` means the cpu passes
    pub mv: Option<Move>,
    pub depth_used: u32,
    pub elapsed_ms: u64,
    pub min_think_ms: u64,
    pub max_think_ms: u64,
    pub from_ponder: bool,
}

#[derive(Debug)]
struct PendingMove {
    job: JobId,
    state: GameState,
    history: Vec<StateKey>,
    profile: ModeProfile,
    issued: Instant,
    from_ponder: bool,
    /// Best result reported so far by a deepening job
    progress: Option<ComputedMove>,
    /// Final result, held back until `min_think_ms`
    ready: Option<ComputedMove>,
}

impl PendingMove {
    fn release(self, result: ComputedMove) -> ScheduledMove {
        ScheduledMove {
            job: self.job,
            state_key: self.state.key(),
            mv: result.mv,
            depth_used: result.depth_used,
            elapsed_ms: self.issued.elapsed().as_millis() as u64,
            min_think_ms: self.profile.min_think_ms,
            max_think_ms: self.profile.max_think_ms,
            from_ponder: self.from_ponder,
        }
    }
}

/// Owns the worker, job tokens, ponder cache and the pending move job
pub struct SearchScheduler {
    config: EngineConfig,
    tokens: Arc<JobTokens>,
    worker: Option<WorkerHandle>,
    inline_rng: StdRng,
    ponder: PonderCache,
    ponder_job: Option<JobId>,
    pending: Option<PendingMove>,
}

impl SearchScheduler {
    /// Scheduler with a background worker when the config asks for one
    pub fn new(config: EngineConfig) -> Self {
        let tokens = Arc::new(JobTokens::default());
        let worker = if config.background_search {
            match spawn_worker(config.clone(), Arc::clone(&tokens)) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("[AI] {}; searching on the caller's thread", e);
                    None
                }
            }
        } else {
            None
        };
        Self::with_worker(config, tokens, worker)
    }

    /// Scheduler that always searches on the caller's thread
    pub fn inline(config: EngineConfig) -> Self {
        Self::with_worker(config, Arc::new(JobTokens::default()), None)
    }

    fn with_worker(config: EngineConfig, tokens: Arc<JobTokens>, worker: Option<WorkerHandle>) -> Self {
        Self {
            inline_rng: make_rng(config.rng_seed),
            config,
            tokens,
            worker,
            ponder: PonderCache::new(),
            ponder_job: None,
            pending: None,
        }
    }

    pub fn is_background(&self) -> bool {
        self.worker.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replies computed by search so far, on either thread
    pub fn search_invocations(&self) -> u64 {
        self.tokens.invocations()
    }

    pub fn ponder_cache(&self) -> &PonderCache {
        &self.ponder
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ponder job currently allowed to fill the cache
    pub fn ponder_job(&self) -> Option<JobId> {
        self.ponder_job
    }

    pub fn pending_job(&self) -> Option<JobId> {
        self.pending.as_ref().map(|p| p.job)
    }

    /// Start computing the cpu's reply to `state`, superseding any earlier job
    ///
    /// A ponder hit for `state` is served without another search. Replies the
    /// worker finished while nobody was polling are collected first.
    pub fn request_move(&mut self, state: GameState, mode: CpuMode, history: &[StateKey]) -> JobId {
        self.drain_responses();
        self.stop_pondering();
        let job = self.tokens.issue_move();
        let profile = *self.config.profile(mode);
        let mut pending = PendingMove {
            job,
            state,
            history: history.to_vec(),
            profile,
            issued: Instant::now(),
            from_ponder: false,
            progress: None,
            ready: None,
        };

        if let Some(entry) = self.ponder.take(state.key(), mode) {
            info!("[AI] ponder hit for {}: {:?}", state, entry.mv);
            pending.from_ponder = true;
            pending.ready = Some(ComputedMove {
                job,
                state_key: entry.state_key,
                mv: entry.mv,
                depth_used: entry.depth_used,
                elapsed_ms: 0,
                complete: true,
                stop: None,
            });
        } else if let Some(worker) = &self.worker {
            let request = SearchRequest::ComputeMove(MoveJob {
                job,
                state,
                mode,
                history: history.to_vec(),
                profile,
            });
            if let Err(e) = worker.send(request) {
                warn!("[AI] {}; using fallback move", e);
                self.worker = None;
                pending.ready = Some(self.fallback_result(&pending));
            }
        } else {
            pending.ready = Some(self.compute_inline(&pending, mode));
        }

        self.ponder.clear();
        debug!("[AI] move job {} issued for {} ({})", job, state, mode);
        self.pending = Some(pending);
        job
    }

    /// Search replies to every player move from `state` in the background
    ///
    /// Returns `false` when there is no worker to ponder on.
    pub fn ponder(&mut self, state: GameState, mode: CpuMode, history: &[StateKey]) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        let player_moves = legal_moves(&state, Side::Player);
        if player_moves.is_empty() {
            return false;
        }

        self.ponder.clear();
        let job = self.tokens.issue_ponder();
        let request = SearchRequest::PonderMoves(PonderJob {
            job,
            state,
            mode,
            history: history.to_vec(),
            profile: *self.config.profile(mode),
            player_moves,
        });
        match worker.send(request) {
            Ok(()) => {
                debug!("[AI] ponder job {} issued for {}", job, state);
                self.ponder_job = Some(job);
                true
            }
            Err(e) => {
                warn!("[AI] {}; pondering disabled", e);
                self.worker = None;
                false
            }
        }
    }

    fn stop_pondering(&mut self) {
        if self.ponder_job.take().is_some() {
            self.tokens.cancel_ponder();
        }
    }

    /// Drop the pending move job; its result will never be released
    pub fn cancel(&mut self) {
        self.tokens.cancel_move();
        if let Some(pending) = self.pending.take() {
            debug!("[AI] move job {} cancelled", pending.job);
        }
        if let Some(worker) = &self.worker {
            let _ = worker.send(SearchRequest::Cancel);
        }
    }

    /// Cancel everything and forget all cached replies
    pub fn reset(&mut self) {
        self.cancel();
        self.stop_pondering();
        self.ponder.clear();
        self.inline_rng = make_rng(self.config.rng_seed);
        if let Some(worker) = &self.worker {
            let _ = worker.send(SearchRequest::Reset);
        }
    }

    /// Collect worker output and release the pending move if its time has come
    pub fn poll(&mut self) -> Option<ScheduledMove> {
        self.drain_responses();
        self.try_release()
    }

    /// Block until the pending move is released; `None` if there is none
    pub fn wait(&mut self) -> Option<ScheduledMove> {
        loop {
            if let Some(released) = self.poll() {
                return Some(released);
            }
            self.pending.as_ref()?;
            self.pump(WAIT_SLICE);
        }
    }

    /// Wait up to `timeout` for one worker response and handle it
    pub fn pump(&mut self, timeout: Duration) {
        let received = match &self.worker {
            Some(worker) => worker.responses().recv_timeout(timeout),
            None => {
                std::thread::sleep(timeout);
                return;
            }
        };
        match received {
            Ok(response) => self.handle_response(response),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
        }
    }

    fn drain_responses(&mut self) {
        loop {
            let received = match &self.worker {
                Some(worker) => worker.responses().try_recv(),
                None => return,
            };
            match received {
                Ok(response) => self.handle_response(response),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.worker_lost();
                    return;
                }
            }
        }
    }

    fn handle_response(&mut self, response: SearchResponse) {
        match response {
            SearchResponse::MoveComputed(result) => {
                let current = self.tokens.is_current_move(result.job);
                match self.pending.as_mut() {
                    Some(pending) if current && pending.job == result.job => {
                        if result.complete {
                            pending.ready = Some(result);
                        } else {
                            pending.progress = Some(result);
                        }
                    }
                    _ => debug!("[AI] discarding stale result for job {}", result.job),
                }
            }
            SearchResponse::PonderReady(entry) => {
                if self.ponder_job == Some(entry.job) && self.tokens.is_current_ponder(entry.job) {
                    self.ponder.insert(entry);
                } else {
                    debug!("[AI] discarding stale ponder entry for job {}", entry.job);
                }
            }
        }
    }

    fn worker_lost(&mut self) {
        warn!("[AI] search worker disconnected; searching on the caller's thread");
        self.worker = None;
        self.ponder_job = None;
        let result = match &self.pending {
            Some(pending) if pending.ready.is_none() => self.fallback_result(pending),
            _ => return,
        };
        if let Some(pending) = self.pending.as_mut() {
            pending.ready = Some(result);
        }
    }

    fn try_release(&mut self) -> Option<ScheduledMove> {
        let pending = self.pending.as_ref()?;
        let elapsed = pending.issued.elapsed().as_millis() as u64;

        if pending.ready.is_some() {
            if elapsed < pending.profile.min_think_ms {
                return None;
            }
            let mut pending = self.pending.take()?;
            let result = pending.ready.take()?;
            return Some(pending.release(result));
        }

        if elapsed < pending.profile.max_think_ms {
            return None;
        }

        // Out of time: commit the best move so far
        let mut pending = self.pending.take()?;
        self.tokens.cancel_move();
        let result = match pending.progress.take() {
            Some(progress) if progress.mv.is_some() => progress,
            _ => self.fallback_result(&pending),
        };
        warn!(
            "[AI] job {} hit max think time ({}ms); committing {:?}",
            pending.job, pending.profile.max_think_ms, result.mv
        );
        Some(pending.release(result))
    }

    fn compute_inline(&mut self, pending: &PendingMove, mode: CpuMode) -> ComputedMove {
        let started = Instant::now();
        let outcome = block_on(compute_reply(
            pending.state,
            mode,
            &pending.history,
            &pending.profile,
            DeepeningLimits::from_profile(&pending.profile),
            &self.config.selector,
            &self.tokens,
            &mut self.inline_rng,
            &mut || false,
        ));
        ComputedMove {
            job: pending.job,
            state_key: pending.state.key(),
            mv: outcome.mv,
            depth_used: outcome.depth_used,
            elapsed_ms: started.elapsed().as_millis() as u64,
            complete: true,
            stop: outcome.stop,
        }
    }

    fn fallback_result(&self, pending: &PendingMove) -> ComputedMove {
        ComputedMove {
            job: pending.job,
            state_key: pending.state.key(),
            mv: fallback_move(pending.state, &pending.history, &self.config.selector),
            depth_used: crate::constants::FALLBACK_SEARCH_DEPTH,
            elapsed_ms: 0,
            complete: true,
            stop: None,
        }
    }
}

impl Drop for SearchScheduler {
    fn drop(&mut self) {
        // Let the worker abandon its current job before the handle joins it
        self.tokens.cancel_move();
        self.tokens.cancel_ponder();
    }
}

impl std::fmt::Debug for SearchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchScheduler")
            .field("background", &self.is_background())
            .field("pending_job", &self.pending_job())
            .field("ponder_job", &self.ponder_job)
            .field("ponder_entries", &self.ponder.len())
            .field("invocations", &self.search_invocations())
            .finish()
    }
}
