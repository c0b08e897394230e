//! Hint engine for the human player
//!
//! A full-line search rooted at the player. The result tells the player
//! whether the position is won, lost, drawn at the horizon or stuck in a
//! loop, which move to play first and the line that follows.

use crate::constants::HINT_SEARCH_DEPTH;
use crate::search::{search_position, SearchOptions};
use crate::types::{GameState, SearchResult, Side, StateKey};
use std::collections::HashMap;
use tracing::debug;

/// Best line for the player at the default hint depth
pub fn compute_hint(state: GameState) -> SearchResult {
    compute_hint_at(state, HINT_SEARCH_DEPTH)
}

/// Best line for the player, searched `depth` plies deep
pub fn compute_hint_at(state: GameState, depth: u32) -> SearchResult {
    let result = search_position(state, Side::Player, Side::Player, depth, SearchOptions::HINT);
    debug!(
        "[AI] hint for {}: {} in {} ({:?}, score {})",
        state, result.outcome, result.steps, result.first_move, result.score
    );
    result
}

/// Hint results keyed by exact state
#[derive(Debug, Clone, Default)]
pub struct HintCache {
    depth: u32,
    entries: HashMap<StateKey, SearchResult>,
}

impl HintCache {
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            entries: HashMap::new(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Cached hint for `state`, computing it on a miss or when `force` is set
    pub fn get_or_compute(&mut self, state: GameState, force: bool) -> SearchResult {
        let key = state.key();
        if !force {
            if let Some(hit) = self.entries.get(&key) {
                return hit.clone();
            }
        }
        let result = compute_hint_at(state, self.depth);
        self.entries.insert(key, result.clone());
        result
    }

    pub fn get(&self, state: &GameState) -> Option<&SearchResult> {
        self.entries.get(&state.key())
    }

    pub fn invalidate(&mut self, state: &GameState) {
        self.entries.remove(&state.key());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
