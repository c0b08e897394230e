//! Ponder cache
//!
//! Cpu replies computed while the player was still deciding, keyed by the
//! state the player's move leads to. Only entries computed for the current
//! mode are served.

use super::messages::PonderEntry;
use crate::types::{CpuMode, StateKey};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PonderCache {
    entries: HashMap<StateKey, PonderEntry>,
}

impl PonderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: PonderEntry) {
        self.entries.insert(entry.state_key, entry);
    }

    /// Entry for `key` if it was computed under `mode`
    pub fn lookup(&self, key: StateKey, mode: CpuMode) -> Option<&PonderEntry> {
        self.entries.get(&key).filter(|entry| entry.mode == mode)
    }

    /// Remove and return the entry for `key` if it was computed under `mode`
    pub fn take(&mut self, key: StateKey, mode: CpuMode) -> Option<PonderEntry> {
        self.lookup(key, mode)?;
        self.entries.remove(&key)
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
