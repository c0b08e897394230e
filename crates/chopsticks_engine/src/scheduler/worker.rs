//! Background search worker
//!
//! A single named thread that owns its own rng and drives the async
//! deepening loop with `block_on`. It never touches session state: it reads
//! snapshots from requests and answers over the response channel.

use super::messages::{ComputedMove, JobId, MoveJob, PonderEntry, PonderJob, SearchRequest, SearchResponse};
use crate::config::{EngineConfig, ModeProfile, SelectorConfig};
use crate::error::{EngineError, EngineResult};
use crate::move_gen::apply_move;
use crate::search::{deepen, DeepeningControl, DeepeningLimits, StopReason};
use crate::selector::{execute_plan, plan_selection, Candidate, SelectionPlan};
use crate::types::{CpuMode, GameState, Move, Side, StateKey};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures_lite::future::block_on;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};
use web_time::Instant;

/// Latest issued job ids plus a count of replies computed
///
/// Shared between the scheduler and the worker. Bumping an id is how a job
/// gets cancelled: the worker compares ids between deepening iterations.
#[derive(Debug, Default)]
pub struct JobTokens {
    moves: AtomicU64,
    ponder: AtomicU64,
    invocations: AtomicU64,
}

impl JobTokens {
    pub fn issue_move(&self) -> JobId {
        self.moves.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn issue_ponder(&self) -> JobId {
        self.ponder.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_move(&self) -> JobId {
        self.moves.load(Ordering::SeqCst)
    }

    pub fn latest_ponder(&self) -> JobId {
        self.ponder.load(Ordering::SeqCst)
    }

    pub fn is_current_move(&self, job: JobId) -> bool {
        self.latest_move() == job
    }

    pub fn is_current_ponder(&self, job: JobId) -> bool {
        self.latest_ponder() == job
    }

    /// Invalidate whatever move job is in flight
    pub fn cancel_move(&self) {
        self.moves.fetch_add(1, Ordering::SeqCst);
    }

    /// Invalidate whatever ponder job is in flight
    pub fn cancel_ponder(&self) {
        self.ponder.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of cpu replies computed by search so far
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// One computed cpu reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplyOutcome {
    pub mv: Option<Move>,
    pub depth_used: u32,
    pub stop: Option<StopReason>,
}

/// Pick the cpu's reply for `mode`, deepening when the profile asks for it
#[allow(clippy::too_many_arguments)]
pub(crate) async fn compute_reply<R, C>(
    state: GameState,
    mode: CpuMode,
    history: &[StateKey],
    profile: &ModeProfile,
    limits: DeepeningLimits,
    cfg: &SelectorConfig,
    tokens: &JobTokens,
    rng: &mut R,
    control: &mut C,
) -> ReplyOutcome
where
    R: Rng + ?Sized,
    C: DeepeningControl + ?Sized,
{
    tokens.record_invocation();
    let plan = plan_selection(mode, cfg, rng);
    match plan {
        SelectionPlan::Search { .. } if profile.deepening => {
            let report = deepen(state, history, plan, limits, cfg, control).await;
            ReplyOutcome {
                mv: report.best.map(|c| c.mv),
                depth_used: report.depth_reached,
                stop: Some(report.stop),
            }
        }
        SelectionPlan::Search { depth, .. } => ReplyOutcome {
            mv: execute_plan(state, plan, history, cfg, rng),
            depth_used: depth,
            stop: None,
        },
        SelectionPlan::Random => ReplyOutcome {
            mv: execute_plan(state, plan, history, cfg, rng),
            depth_used: 0,
            stop: None,
        },
    }
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Deepening hooks for a move job: stop when superseded, report progress
struct MoveControl<'a> {
    job: JobId,
    state_key: StateKey,
    started: Instant,
    tokens: &'a JobTokens,
    responses: &'a Sender<SearchResponse>,
}

impl DeepeningControl for MoveControl<'_> {
    fn should_stop(&self) -> bool {
        !self.tokens.is_current_move(self.job)
    }

    fn on_iteration(&mut self, depth: u32, best: Option<&Candidate>) {
        let progress = ComputedMove {
            job: self.job,
            state_key: self.state_key,
            mv: best.map(|c| c.mv),
            depth_used: depth,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            complete: false,
            stop: None,
        };
        let _ = self.responses.send(SearchResponse::MoveComputed(progress));
    }
}

/// Deepening hooks for one ponder candidate
struct PonderControl<'a> {
    job: JobId,
    tokens: &'a JobTokens,
}

impl DeepeningControl for PonderControl<'_> {
    fn should_stop(&self) -> bool {
        !self.tokens.is_current_ponder(self.job)
    }
}

struct Worker {
    config: EngineConfig,
    tokens: Arc<JobTokens>,
    rng: StdRng,
    responses: Sender<SearchResponse>,
}

impl Worker {
    fn run(mut self, requests: Receiver<SearchRequest>) {
        debug!("[AI] search worker started");
        while let Ok(request) = requests.recv() {
            match request {
                SearchRequest::ComputeMove(job) => self.compute_move(job),
                SearchRequest::PonderMoves(job) => self.ponder(job),
                SearchRequest::Cancel => trace!("[AI] worker acknowledged cancel"),
                SearchRequest::Reset => {
                    self.rng = make_rng(self.config.rng_seed);
                    debug!("[AI] worker reset");
                }
                SearchRequest::Shutdown => break,
            }
        }
        debug!("[AI] search worker stopped");
    }

    fn compute_move(&mut self, job: MoveJob) {
        if !self.tokens.is_current_move(job.job) {
            trace!("[AI] skipping superseded move job {}", job.job);
            return;
        }

        let started = Instant::now();
        let state_key = job.state.key();
        let limits = DeepeningLimits::from_profile(&job.profile);
        let mut control = MoveControl {
            job: job.job,
            state_key,
            started,
            tokens: &self.tokens,
            responses: &self.responses,
        };
        let outcome = block_on(compute_reply(
            job.state,
            job.mode,
            &job.history,
            &job.profile,
            limits,
            &self.config.selector,
            &self.tokens,
            &mut self.rng,
            &mut control,
        ));

        if !self.tokens.is_current_move(job.job) {
            debug!("[AI] move job {} cancelled after {}ms", job.job, started.elapsed().as_millis());
            return;
        }
        let done = ComputedMove {
            job: job.job,
            state_key,
            mv: outcome.mv,
            depth_used: outcome.depth_used,
            elapsed_ms: started.elapsed().as_millis() as u64,
            complete: true,
            stop: outcome.stop,
        };
        info!(
            "[AI] {} reply {:?} at depth {} in {}ms",
            job.mode, done.mv, done.depth_used, done.elapsed_ms
        );
        let _ = self.responses.send(SearchResponse::MoveComputed(done));
    }

    fn ponder(&mut self, job: PonderJob) {
        let history_len = self.config.history_len;
        let limits = DeepeningLimits {
            budget_ms: job.profile.ponder_slice_ms,
            ..DeepeningLimits::from_profile(&job.profile)
        };
        let mut control = PonderControl {
            job: job.job,
            tokens: &self.tokens,
        };

        for &player_move in &job.player_moves {
            if !self.tokens.is_current_ponder(job.job) {
                trace!("[AI] ponder job {} superseded", job.job);
                return;
            }
            let next = apply_move(job.state, Side::Player, player_move);
            if next.is_terminal() {
                continue;
            }

            let mut history = job.history.clone();
            history.push(next.key());
            if history.len() > history_len {
                history.drain(..history.len() - history_len);
            }

            let outcome = block_on(compute_reply(
                next,
                job.mode,
                &history,
                &job.profile,
                limits,
                &self.config.selector,
                &self.tokens,
                &mut self.rng,
                &mut control,
            ));
            if outcome.stop == Some(StopReason::Cancelled) || !self.tokens.is_current_ponder(job.job) {
                return;
            }

            trace!("[AI] pondered {} -> {:?}", player_move, outcome.mv);
            let entry = PonderEntry {
                job: job.job,
                player_move,
                state_key: next.key(),
                mode: job.mode,
                mv: outcome.mv,
                depth_used: outcome.depth_used,
            };
            if self.responses.send(SearchResponse::PonderReady(entry)).is_err() {
                return;
            }
        }
        debug!("[AI] ponder job {} finished {} candidates", job.job, job.player_moves.len());
    }
}

/// Channels and thread handle for a running worker
pub struct WorkerHandle {
    requests: Sender<SearchRequest>,
    responses: Receiver<SearchResponse>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn send(&self, request: SearchRequest) -> EngineResult<()> {
        self.requests
            .send(request)
            .map_err(|e| EngineError::WorkerUnavailable {
                message: e.to_string(),
            })
    }

    pub fn responses(&self) -> &Receiver<SearchResponse> {
        &self.responses
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let _ = self.requests.send(SearchRequest::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("[AI] search worker panicked during shutdown");
            }
        }
    }
}

/// Start the worker thread
pub fn spawn_worker(config: EngineConfig, tokens: Arc<JobTokens>) -> EngineResult<WorkerHandle> {
    let (request_tx, request_rx) = unbounded();
    let (response_tx, response_rx) = unbounded();
    let worker = Worker {
        rng: make_rng(config.rng_seed),
        config,
        tokens,
        responses: response_tx,
    };

    let thread = thread::Builder::new()
        .name("chopsticks-search".to_string())
        .spawn(move || worker.run(request_rx))
        .map_err(|e| EngineError::WorkerUnavailable {
            message: e.to_string(),
        })?;

    Ok(WorkerHandle {
        requests: request_tx,
        responses: response_rx,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_gen::is_legal_move;
    use std::time::Duration;

    #[test]
    fn test_tokens_supersede() {
        let tokens = JobTokens::default();
        let a = tokens.issue_move();
        assert!(tokens.is_current_move(a));
        let b = tokens.issue_move();
        assert!(b > a);
        assert!(!tokens.is_current_move(a));
        tokens.cancel_move();
        assert!(!tokens.is_current_move(b));
        assert!(tokens.is_current_ponder(0));
    }

    #[test]
    fn test_compute_reply_counts_invocations() {
        let tokens = JobTokens::default();
        let cfg = SelectorConfig::default();
        let profile = ModeProfile::for_mode(CpuMode::Hard);
        let mut rng = StdRng::seed_from_u64(9);
        let state = GameState::new([2, 3], [1, 4]).unwrap();

        let outcome = block_on(compute_reply(
            state,
            CpuMode::Hard,
            &[],
            &profile,
            DeepeningLimits::from_profile(&profile),
            &cfg,
            &tokens,
            &mut rng,
            &mut || false,
        ));
        assert!(is_legal_move(&state, Side::Cpu, outcome.mv.unwrap()));
        assert_eq!(tokens.invocations(), 1);
    }

    #[test]
    fn test_worker_answers_move_job() {
        let tokens = Arc::new(JobTokens::default());
        let config = EngineConfig {
            rng_seed: Some(3),
            ..EngineConfig::default()
        };
        let worker = spawn_worker(config, Arc::clone(&tokens)).unwrap();
        let state = GameState::initial();
        let job = tokens.issue_move();
        worker
            .send(SearchRequest::ComputeMove(MoveJob {
                job,
                state,
                mode: CpuMode::Strong,
                history: Vec::new(),
                profile: ModeProfile::for_mode(CpuMode::Strong),
            }))
            .unwrap();

        let done = loop {
            match worker.responses().recv_timeout(Duration::from_secs(30)).unwrap() {
                SearchResponse::MoveComputed(m) if m.complete => break m,
                SearchResponse::MoveComputed(progress) => assert!(!progress.complete),
                SearchResponse::PonderReady(_) => panic!("no ponder job was issued"),
            }
        };
        assert_eq!(done.job, job);
        assert_eq!(done.state_key, state.key());
        assert!(is_legal_move(&state, Side::Cpu, done.mv.unwrap()));
        assert!(done.depth_used >= ModeProfile::for_mode(CpuMode::Strong).min_depth);
    }
}
