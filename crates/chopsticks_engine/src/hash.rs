//! Transposition memo
//!
//! One memo per top-level search. Keys include the remaining depth and the
//! side the search is rooted at, so a stored value is only reused for the
//! exact question it answered. Values found inside an alpha-beta window are
//! stored with their bound type.
//!
//! Each entry also records the `(state, turn)` nodes its subtree expanded.
//! Loop detection makes a value depend on the path above it, so an entry is
//! only reused when none of those nodes are on the current path.

use crate::types::{Move, Outcome, Side, StateKey};
use std::collections::HashMap;

/// Every `StateKey` fits below 6^4
const STATE_KEYS: usize = 1296;
const NODE_WORDS: usize = (STATE_KEYS * 2).div_ceil(64);

/// Fixed-size bitset over `(StateKey, Side)` search nodes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeSet([u64; NODE_WORDS]);

impl Default for NodeSet {
    fn default() -> Self {
        Self([0; NODE_WORDS])
    }
}

impl std::fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSet").field("len", &self.len()).finish()
    }
}

#[inline]
fn node_bit(node: &(StateKey, Side)) -> (usize, u64) {
    let side = match node.1 {
        Side::Player => 0,
        Side::Cpu => 1,
    };
    let index = node.0 .0 as usize * 2 + side;
    (index / 64, 1u64 << (index % 64))
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; `false` if it was already present
    pub fn insert(&mut self, node: (StateKey, Side)) -> bool {
        let (word, mask) = node_bit(&node);
        let fresh = self.0[word] & mask == 0;
        self.0[word] |= mask;
        fresh
    }

    /// Remove a node; `false` if it was absent
    pub fn remove(&mut self, node: &(StateKey, Side)) -> bool {
        let (word, mask) = node_bit(node);
        let present = self.0[word] & mask != 0;
        self.0[word] &= !mask;
        present
    }

    pub fn contains(&self, node: &(StateKey, Side)) -> bool {
        let (word, mask) = node_bit(node);
        self.0[word] & mask != 0
    }

    pub fn union_with(&mut self, other: &NodeSet) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    pub fn intersects(&self, other: &NodeSet) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a & b != 0)
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }
}

/// Memo key: position, side to move, remaining depth, root side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub state: StateKey,
    pub turn: Side,
    pub depth: u32,
    pub root: Side,
}

/// What a stored score means relative to the window it was searched with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// True score is at least this (search failed high)
    Lower,
    /// True score is at most this (search failed low)
    Upper,
}

#[derive(Debug, Clone)]
pub struct MemoEntry {
    pub score: i64,
    pub bound: Bound,
    pub outcome: Outcome,
    pub steps: u32,
    pub line: Vec<Move>,
    /// Nodes expanded below (and including) the stored node
    pub visited: NodeSet,
}

impl MemoEntry {
    /// Whether this entry settles a node searched with `(alpha, beta)`
    pub fn usable(&self, alpha: i64, beta: i64) -> bool {
        match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= beta,
            Bound::Upper => self.score <= alpha,
        }
    }

    /// Whether the stored subtree stays clear of `path`
    pub fn path_safe(&self, path: &NodeSet) -> bool {
        !self.visited.intersects(path)
    }
}

/// Per-search memo map
#[derive(Debug, Default)]
pub struct TranspositionMemo {
    entries: HashMap<MemoKey, MemoEntry>,
}

impl TranspositionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self, key: &MemoKey) -> Option<&MemoEntry> {
        self.entries.get(key)
    }

    /// Store a result; an exact entry is never replaced by a bound
    pub fn store(&mut self, key: MemoKey, entry: MemoEntry) {
        match self.entries.get(&key) {
            Some(existing) if existing.bound == Bound::Exact && entry.bound != Bound::Exact => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameState;

    fn key() -> MemoKey {
        MemoKey {
            state: GameState::initial().key(),
            turn: Side::Player,
            depth: 3,
            root: Side::Cpu,
        }
    }

    fn entry(score: i64, bound: Bound) -> MemoEntry {
        MemoEntry {
            score,
            bound,
            outcome: Outcome::Draw,
            steps: 3,
            line: Vec::new(),
            visited: NodeSet::new(),
        }
    }

    #[test]
    fn test_bounds_are_respected() {
        assert!(entry(10, Bound::Exact).usable(-5, 5));
        assert!(entry(10, Bound::Lower).usable(-5, 5));
        assert!(!entry(10, Bound::Lower).usable(-5, 50));
        assert!(entry(-10, Bound::Upper).usable(-5, 5));
        assert!(!entry(-10, Bound::Upper).usable(-50, 5));
    }

    #[test]
    fn test_exact_entry_survives_bound_store() {
        let mut memo = TranspositionMemo::new();
        memo.store(key(), entry(7, Bound::Exact));
        memo.store(key(), entry(99, Bound::Lower));
        assert_eq!(memo.probe(&key()).map(|e| e.score), Some(7));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_node_set_tracks_state_and_turn() {
        let mut set = NodeSet::new();
        let highest = (StateKey(1295), Side::Cpu);
        assert!(set.insert(highest));
        assert!(!set.insert(highest));
        assert!(set.insert((StateKey(1295), Side::Player)));
        assert!(!set.contains(&(StateKey(0), Side::Cpu)));
        assert_eq!(set.len(), 2);
        assert!(set.remove(&highest));
        assert!(!set.remove(&highest));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_entry_overlapping_path_is_not_safe() {
        let node = (GameState::new([2, 3], [1, 4]).unwrap().key(), Side::Player);
        let mut stored = entry(5, Bound::Exact);
        stored.visited.insert(node);

        let mut path = NodeSet::new();
        path.insert((GameState::initial().key(), Side::Cpu));
        assert!(stored.path_safe(&path));
        path.insert(node);
        assert!(!stored.path_safe(&path));
    }

    #[test]
    fn test_depth_is_part_of_the_key() {
        let mut memo = TranspositionMemo::new();
        memo.store(key(), entry(7, Bound::Exact));
        let deeper = MemoKey { depth: 4, ..key() };
        assert!(memo.probe(&deeper).is_none());
    }
}
