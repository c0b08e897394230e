//! Engine configuration
//!
//! Everything tunable lives here: selector depths and probabilities, the
//! repeat penalty, the hint depth and one timing/depth profile per cpu mode.
//! All structs deserialize with `#[serde(default)]`, so a settings file only
//! needs the fields it changes.

use crate::constants::*;
use crate::error::{EngineError, EngineResult};
use crate::types::CpuMode;
use serde::{Deserialize, Serialize};

/// Depths and probabilities for the synchronous selector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub deep_depth: u32,
    pub shallow_depth: u32,
    pub greedy_depth: u32,
    pub repeat_penalty: i64,
    pub hard_random_chance: f64,
    pub normal_random_chance: f64,
    pub normal_greedy_chance: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            deep_depth: DEEP_SEARCH_DEPTH,
            shallow_depth: SHALLOW_SEARCH_DEPTH,
            greedy_depth: GREEDY_SEARCH_DEPTH,
            repeat_penalty: REPEAT_PENALTY,
            hard_random_chance: HARD_RANDOM_CHANCE,
            normal_random_chance: NORMAL_RANDOM_CHANCE,
            normal_greedy_chance: NORMAL_GREEDY_CHANCE,
        }
    }
}

/// Background search behavior for one cpu mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeProfile {
    /// Use iterative deepening instead of a single selector call
    pub deepening: bool,
    pub min_depth: u32,
    pub depth_step: u32,
    pub max_depth: u32,
    /// Deepening stops starting new iterations after this long
    pub time_budget_ms: u64,
    /// A move is never released before this
    pub min_think_ms: u64,
    /// A move is committed by this point with whatever is best so far
    pub max_think_ms: u64,
    /// Budget per player move while pondering
    pub ponder_slice_ms: u64,
}

impl Default for ModeProfile {
    fn default() -> Self {
        ModeProfile::for_mode(CpuMode::Normal)
    }
}

impl ModeProfile {
    pub fn for_mode(mode: CpuMode) -> Self {
        match mode {
            CpuMode::Weakest => ModeProfile {
                deepening: false,
                min_depth: DEEP_SEARCH_DEPTH,
                depth_step: 1,
                max_depth: DEEP_SEARCH_DEPTH,
                time_budget_ms: 1500,
                min_think_ms: 400,
                max_think_ms: 2000,
                ponder_slice_ms: 60,
            },
            CpuMode::Normal => ModeProfile {
                deepening: false,
                min_depth: SHALLOW_SEARCH_DEPTH,
                depth_step: 1,
                max_depth: SHALLOW_SEARCH_DEPTH,
                time_budget_ms: 1500,
                min_think_ms: 500,
                max_think_ms: 2500,
                ponder_slice_ms: 60,
            },
            CpuMode::Hard => ModeProfile {
                deepening: true,
                min_depth: 2,
                depth_step: 2,
                max_depth: 10,
                time_budget_ms: 1200,
                min_think_ms: 600,
                max_think_ms: 3000,
                ponder_slice_ms: 150,
            },
            CpuMode::Strong => ModeProfile {
                deepening: true,
                min_depth: 4,
                depth_step: 2,
                max_depth: 20,
                time_budget_ms: 2500,
                min_think_ms: 700,
                max_think_ms: 4000,
                ponder_slice_ms: 250,
            },
        }
    }

    /// Time the deepening loop may actually spend
    pub fn effective_budget_ms(&self) -> u64 {
        self.time_budget_ms.min(self.max_think_ms)
    }

    /// Same depths and budgets with zero pacing delay
    pub fn without_pacing(self) -> Self {
        ModeProfile {
            min_think_ms: 0,
            ..self
        }
    }
}

/// Partial profile as written in a settings file
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct ProfileOverride {
    deepening: Option<bool>,
    min_depth: Option<u32>,
    depth_step: Option<u32>,
    max_depth: Option<u32>,
    time_budget_ms: Option<u64>,
    min_think_ms: Option<u64>,
    max_think_ms: Option<u64>,
    ponder_slice_ms: Option<u64>,
}

impl ProfileOverride {
    fn apply(self, base: ModeProfile) -> ModeProfile {
        ModeProfile {
            deepening: self.deepening.unwrap_or(base.deepening),
            min_depth: self.min_depth.unwrap_or(base.min_depth),
            depth_step: self.depth_step.unwrap_or(base.depth_step),
            max_depth: self.max_depth.unwrap_or(base.max_depth),
            time_budget_ms: self.time_budget_ms.unwrap_or(base.time_budget_ms),
            min_think_ms: self.min_think_ms.unwrap_or(base.min_think_ms),
            max_think_ms: self.max_think_ms.unwrap_or(base.max_think_ms),
            ponder_slice_ms: self.ponder_slice_ms.unwrap_or(base.ponder_slice_ms),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModeProfilesFile {
    weakest: ProfileOverride,
    normal: ProfileOverride,
    hard: ProfileOverride,
    strong: ProfileOverride,
}

impl From<ModeProfilesFile> for ModeProfiles {
    fn from(file: ModeProfilesFile) -> Self {
        ModeProfiles {
            weakest: file.weakest.apply(ModeProfile::for_mode(CpuMode::Weakest)),
            normal: file.normal.apply(ModeProfile::for_mode(CpuMode::Normal)),
            hard: file.hard.apply(ModeProfile::for_mode(CpuMode::Hard)),
            strong: file.strong.apply(ModeProfile::for_mode(CpuMode::Strong)),
        }
    }
}

/// One profile per cpu mode; fields missing from a settings file keep that mode's defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ModeProfilesFile")]
pub struct ModeProfiles {
    pub weakest: ModeProfile,
    pub normal: ModeProfile,
    pub hard: ModeProfile,
    pub strong: ModeProfile,
}

impl Default for ModeProfiles {
    fn default() -> Self {
        Self {
            weakest: ModeProfile::for_mode(CpuMode::Weakest),
            normal: ModeProfile::for_mode(CpuMode::Normal),
            hard: ModeProfile::for_mode(CpuMode::Hard),
            strong: ModeProfile::for_mode(CpuMode::Strong),
        }
    }
}

impl ModeProfiles {
    pub fn get(&self, mode: CpuMode) -> &ModeProfile {
        match mode {
            CpuMode::Weakest => &self.weakest,
            CpuMode::Normal => &self.normal,
            CpuMode::Hard => &self.hard,
            CpuMode::Strong => &self.strong,
        }
    }

    pub fn get_mut(&mut self, mode: CpuMode) -> &mut ModeProfile {
        match mode {
            CpuMode::Weakest => &mut self.weakest,
            CpuMode::Normal => &mut self.normal,
            CpuMode::Hard => &mut self.hard,
            CpuMode::Strong => &mut self.strong,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recent state keys kept for repeat avoidance
    pub history_len: usize,
    pub hint_depth: u32,
    pub selector: SelectorConfig,
    pub profiles: ModeProfiles,
    /// Fixed seed for reproducible cpu play; random when absent
    pub rng_seed: Option<u64>,
    /// Run searches on a background worker thread
    pub background_search: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_len: HISTORY_LEN,
            hint_depth: HINT_SEARCH_DEPTH,
            selector: SelectorConfig::default(),
            profiles: ModeProfiles::default(),
            rng_seed: None,
            background_search: true,
        }
    }
}

impl EngineConfig {
    pub fn profile(&self, mode: CpuMode) -> &ModeProfile {
        self.profiles.get(mode)
    }

    /// Reject settings that would make the engine misbehave
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });
        let s = &self.selector;

        for (name, p) in [
            ("hard_random_chance", s.hard_random_chance),
            ("normal_random_chance", s.normal_random_chance),
            ("normal_greedy_chance", s.normal_greedy_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} must be within 0..=1, got {}", name, p));
            }
        }
        if s.normal_random_chance + s.normal_greedy_chance > 1.0 {
            return invalid("normal random + greedy chances exceed 1".to_string());
        }
        if s.deep_depth == 0 || s.shallow_depth == 0 || s.greedy_depth == 0 || self.hint_depth == 0 {
            return invalid("search depths must be at least 1".to_string());
        }
        if self.history_len == 0 {
            return invalid("history_len must be at least 1".to_string());
        }

        for mode in CpuMode::ALL {
            let p = self.profile(mode);
            if p.min_depth == 0 || p.depth_step == 0 || p.max_depth < p.min_depth {
                return invalid(format!(
                    "{} profile needs 1 <= min_depth <= max_depth and a non-zero step",
                    mode
                ));
            }
            if p.min_think_ms > p.max_think_ms {
                return invalid(format!("{} profile has min_think_ms > max_think_ms", mode));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"hint_depth": 9, "profiles": {"strong": {"max_depth": 14}}}"#).unwrap();
        assert_eq!(cfg.hint_depth, 9);
        assert_eq!(cfg.profiles.strong.max_depth, 14);
        let strong = ModeProfile::for_mode(CpuMode::Strong);
        assert_eq!(cfg.profiles.strong.min_think_ms, strong.min_think_ms);
        assert_eq!(cfg.profiles.strong.min_depth, strong.min_depth);
        assert_eq!(cfg.profiles.hard, ModeProfile::for_mode(CpuMode::Hard));
        assert_eq!(cfg.selector, SelectorConfig::default());
    }

    #[test]
    fn test_bad_probability_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.selector.hard_random_chance = 1.5;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_inverted_think_window_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.profiles.hard.min_think_ms = 5000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_higher_tiers_deepen() {
        let profiles = ModeProfiles::default();
        assert!(profiles.hard.deepening && profiles.strong.deepening);
        assert!(!profiles.weakest.deepening && !profiles.normal.deepening);
        assert!(profiles.strong.max_depth > profiles.hard.max_depth);
        assert!(profiles.strong.effective_budget_ms() <= profiles.strong.max_think_ms);
    }
}
