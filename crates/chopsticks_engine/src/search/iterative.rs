//! Iterative deepening search
//!
//! Runs the cpu candidate search at increasing depths so the background
//! worker always has a usable move and can stop on time. The loop yields
//! between iterations and checks the caller's stop flag there, which is
//! where cancellation takes effect.

use crate::config::{ModeProfile, SelectorConfig};
use crate::constants::WIN_THRESHOLD;
use crate::move_gen::legal_moves;
use crate::selector::{search_candidates, Candidate, Direction, SelectionPlan};
use crate::types::{GameState, Side, StateKey};
use futures_lite::future::yield_now;
use std::time::Duration;
use tracing::{debug, trace};
use web_time::Instant;

/// Depth schedule and time budget for one deepening run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepeningLimits {
    pub min_depth: u32,
    pub depth_step: u32,
    pub max_depth: u32,
    pub budget_ms: u64,
}

impl DeepeningLimits {
    pub fn from_profile(profile: &ModeProfile) -> Self {
        Self {
            min_depth: profile.min_depth,
            depth_step: profile.depth_step,
            max_depth: profile.max_depth,
            budget_ms: profile.effective_budget_ms(),
        }
    }

    /// A single iteration at `depth`
    pub fn fixed(depth: u32) -> Self {
        Self {
            min_depth: depth,
            depth_step: 1,
            max_depth: depth,
            budget_ms: u64::MAX,
        }
    }
}

/// Why a deepening run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ProvenWin,
    TimeBudget,
    DepthCap,
    Cancelled,
    NoMoves,
}

/// Result of a deepening run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepeningReport {
    /// Best candidate from the deepest completed iteration
    pub best: Option<Candidate>,
    pub depth_reached: u32,
    pub iterations: u32,
    pub elapsed_ms: u64,
    pub stop: StopReason,
}

/// Hooks the deepening loop calls between iterations
pub trait DeepeningControl {
    /// Checked before every iteration; `true` ends the run as cancelled
    fn should_stop(&self) -> bool;

    /// Called after every completed iteration with its best candidate
    fn on_iteration(&mut self, _depth: u32, _best: Option<&Candidate>) {}
}

impl<F: Fn() -> bool> DeepeningControl for F {
    fn should_stop(&self) -> bool {
        self()
    }
}

/// Deepen the cpu's candidate search until a stop condition fires
///
/// `plan` supplies the direction and repeat handling; its own depth is
/// replaced by the schedule in `limits`. A random plan has nothing to
/// search and ends immediately with no candidate.
pub async fn deepen<C: DeepeningControl + ?Sized>(
    state: GameState,
    history: &[StateKey],
    plan: SelectionPlan,
    limits: DeepeningLimits,
    cfg: &SelectorConfig,
    control: &mut C,
) -> DeepeningReport {
    let start = Instant::now();
    let budget = Duration::from_millis(limits.budget_ms);
    let mut report = DeepeningReport {
        best: None,
        depth_reached: 0,
        iterations: 0,
        elapsed_ms: 0,
        stop: StopReason::NoMoves,
    };

    let moves = legal_moves(&state, Side::Cpu);
    let SelectionPlan::Search {
        direction,
        penalize_repeats,
        avoid_repeats,
        ..
    } = plan
    else {
        return report;
    };
    if moves.is_empty() {
        return report;
    }

    let max_depth = limits.max_depth.max(1);
    let step = limits.depth_step.max(1);
    let mut depth = limits.min_depth.clamp(1, max_depth);

    report.stop = loop {
        if control.should_stop() {
            break StopReason::Cancelled;
        }

        let best = search_candidates(
            state,
            &moves,
            depth,
            direction,
            penalize_repeats,
            avoid_repeats,
            history,
            cfg,
        );
        report.iterations += 1;
        report.depth_reached = depth;
        trace!("[AI] depth {} best {:?}", depth, best.as_ref().map(|c| c.mv));
        control.on_iteration(depth, best.as_ref());

        let proven = direction == Direction::Max
            && best.as_ref().is_some_and(|c| c.raw >= WIN_THRESHOLD);
        report.best = best;

        if proven {
            break StopReason::ProvenWin;
        }
        if depth >= max_depth {
            break StopReason::DepthCap;
        }
        if start.elapsed() >= budget {
            break StopReason::TimeBudget;
        }

        depth = depth.saturating_add(step).min(max_depth);
        yield_now().await;
    };

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    debug!(
        "[AI] deepening stopped at depth {} after {} iterations ({:?}, {}ms)",
        report.depth_reached, report.iterations, report.stop, report.elapsed_ms
    );
    report
}
