//! Balance tuning.
//!
//! Four primitives, each returning how many entities it changed:
//!
//! - [`BalanceTuner::unlock_starters`]: enable LOCKED settings until `n` are enabled
//! - [`BalanceTuner::reduce_density`]: drop dependencies without splitting the dependency graph
//! - [`BalanceTuner::simplify_chains`]: cut settings with too many ancestors
//! - [`BalanceTuner::ensure_unlocked_ratio`]: force-unlock until enough settings are reachable
//!
//! The primitives only remove dependencies or promote settings, so they never
//! introduce a cycle or a dangling reference.

use log::{debug, info};
use menumaze_logic::analyzer;
use menumaze_logic::solvability::simulate_unlocking;
use menumaze_logic::{ContentGraph, SettingState};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Presets ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    /// Dependencies per setting.
    pub max_density: f64,
    /// Ancestor count above which a setting's chain is cut.
    pub max_chain_length: usize,
    pub min_unlocked_ratio: f64,
    pub starter_count: usize,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "easy",
        max_density: 1.5,
        max_chain_length: 3,
        min_unlocked_ratio: 0.4,
        starter_count: 5,
    },
    Preset {
        name: "medium",
        max_density: 2.5,
        max_chain_length: 5,
        min_unlocked_ratio: 0.3,
        starter_count: 3,
    },
    Preset {
        name: "hard",
        max_density: 3.5,
        max_chain_length: 7,
        min_unlocked_ratio: 0.2,
        starter_count: 2,
    },
    Preset {
        name: "very_hard",
        max_density: 5.0,
        max_chain_length: 10,
        min_unlocked_ratio: 0.1,
        starter_count: 1,
    },
];

impl Preset {
    pub fn by_name(name: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.name == name)
    }
}

/// Human-readable description of what a preset will adjust.
pub fn adjustments_summary(name: &str) -> Result<String> {
    let p = Preset::by_name(name).ok_or_else(|| Error::UnknownPreset(name.to_string()))?;
    Ok(format!(
        "Preset '{}':\n  - max dependency density: {:.1}\n  - max chain length: {}\n  - min unlocked ratio: {:.0}%\n  - starter settings: {}",
        p.name,
        p.max_density,
        p.max_chain_length,
        p.min_unlocked_ratio * 100.0,
        p.starter_count
    ))
}

/// Counts from one `apply_preset` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningReport {
    pub preset: String,
    pub starters_unlocked: usize,
    pub dependencies_removed: usize,
    pub chains_simplified: usize,
    pub settings_force_unlocked: usize,
}

impl TuningReport {
    pub fn total_changes(&self) -> usize {
        self.starters_unlocked
            + self.dependencies_removed
            + self.chains_simplified
            + self.settings_force_unlocked
    }
}

// ── Tuner ───────────────────────────────────────────────────────────────

/// Exclusive access to a content graph plus the random source used for
/// every random choice the tuner makes.
pub struct BalanceTuner<'a, R: Rng> {
    graph: &'a mut ContentGraph,
    rng: &'a mut R,
}

impl<'a, R: Rng> BalanceTuner<'a, R> {
    pub fn new(graph: &'a mut ContentGraph, rng: &'a mut R) -> Self {
        Self { graph, rng }
    }

    pub fn apply_preset(&mut self, name: &str) -> Result<TuningReport> {
        let preset = Preset::by_name(name).ok_or_else(|| Error::UnknownPreset(name.to_string()))?;

        let report = TuningReport {
            preset: preset.name.to_string(),
            starters_unlocked: self.unlock_starters(preset.starter_count),
            dependencies_removed: self.reduce_density(preset.max_density),
            chains_simplified: self.simplify_chains(preset.max_chain_length),
            settings_force_unlocked: self.ensure_unlocked_ratio(preset.min_unlocked_ratio),
        };
        info!(
            "applied preset {}: {} starters, {} dependencies removed, {} chains simplified, {} force-unlocked",
            report.preset,
            report.starters_unlocked,
            report.dependencies_removed,
            report.chains_simplified,
            report.settings_force_unlocked
        );
        Ok(report)
    }

    /// Enable LOCKED settings, fewest dependencies first, until at least `n`
    /// settings are enabled. Promoted settings lose their dependencies.
    pub fn unlock_starters(&mut self, n: usize) -> usize {
        let enabled = self.graph.enabled_count();
        if enabled >= n {
            return 0;
        }

        let mut candidates: Vec<(usize, String)> = self
            .graph
            .settings
            .values()
            .filter(|s| s.is_locked())
            .map(|s| (self.graph.resolver.get(&s.id).len(), s.id.clone()))
            .collect();
        candidates.sort_by_key(|(deps, _)| *deps);

        let mut unlocked = 0;
        for (_, id) in candidates.into_iter().take(n - enabled) {
            self.graph.resolver.clear(&id);
            if let Some(setting) = self.graph.get_setting_mut(&id) {
                setting.state = SettingState::Enabled;
                unlocked += 1;
            }
        }
        unlocked
    }

    /// Randomly drop the last dependency of settings with more than one until
    /// density is at most `target`. A drop that would split a weakly connected
    /// component of the dependency graph is undone.
    pub fn reduce_density(&mut self, target: f64) -> usize {
        let total = self.graph.setting_count();
        if total == 0 {
            return 0;
        }
        let density = self.graph.total_dependencies() as f64 / total as f64;
        if density <= target {
            return 0;
        }

        let target_deps = (target * total as f64).floor() as usize;
        let baseline = self.component_count();
        let mut removed = 0;

        while self.graph.total_dependencies() > target_deps {
            let mut candidates: Vec<String> = self
                .graph
                .resolver
                .dependencies
                .iter()
                .filter(|(_, deps)| deps.len() > 1)
                .map(|(id, _)| id.clone())
                .collect();
            if candidates.is_empty() {
                break;
            }
            candidates.shuffle(&mut *self.rng);

            let mut removed_this_pass = 0;
            for id in &candidates {
                if self.graph.total_dependencies() <= target_deps {
                    break;
                }
                let Some(dropped) = self
                    .graph
                    .resolver
                    .dependencies
                    .get_mut(id)
                    .filter(|deps| deps.len() > 1)
                    .and_then(Vec::pop)
                else {
                    continue;
                };
                if self.component_count() > baseline {
                    self.graph.resolver.add_dependency(id.as_str(), dropped);
                } else {
                    removed_this_pass += 1;
                }
            }
            if removed_this_pass == 0 {
                break;
            }
            removed += removed_this_pass;
        }

        debug!("reduce_density({:.2}): removed {}", target, removed);
        removed
    }

    /// For every setting with more than `max_len` ancestors, keep only its
    /// first dependency, or clear it (LOCKED becomes DISABLED) if it had one.
    pub fn simplify_chains(&mut self, max_len: usize) -> usize {
        let ids: Vec<String> = self.graph.resolver.dependencies.keys().cloned().collect();
        let mut simplified = 0;

        for id in &ids {
            let deps = self.graph.dependency_graph();
            if analyzer::ancestors(&deps, id).len() <= max_len {
                continue;
            }
            match self.graph.resolver.get(id).len() {
                0 => continue,
                1 => {
                    self.graph.resolver.clear(id);
                    if let Some(setting) = self.graph.get_setting_mut(id) {
                        if setting.is_locked() {
                            setting.state = SettingState::Disabled;
                        }
                    }
                }
                _ => {
                    if let Some(list) = self.graph.resolver.dependencies.get_mut(id) {
                        list.truncate(1);
                    }
                }
            }
            simplified += 1;
        }

        debug!("simplify_chains({}): simplified {}", max_len, simplified);
        simplified
    }

    /// Force-unlock random unreachable LOCKED settings, one at a time, until
    /// the simulated unlockable count reaches `floor(total × min_ratio)`.
    pub fn ensure_unlocked_ratio(&mut self, min_ratio: f64) -> usize {
        let target = (self.graph.setting_count() as f64 * min_ratio).floor() as usize;
        let mut forced = 0;

        loop {
            let unlocked = simulate_unlocking(self.graph);
            if unlocked.len() >= target {
                break;
            }
            let stuck: Vec<&str> = self
                .graph
                .settings
                .values()
                .filter(|s| s.is_locked() && !unlocked.contains(&s.id))
                .map(|s| s.id.as_str())
                .collect();
            let Some(id) = stuck.choose(&mut *self.rng).map(|s| s.to_string()) else {
                break;
            };
            self.graph.resolver.clear(&id);
            if let Some(setting) = self.graph.get_setting_mut(&id) {
                setting.state = SettingState::Enabled;
            }
            forced += 1;
        }

        debug!("ensure_unlocked_ratio({:.2}): forced {}", min_ratio, forced);
        forced
    }

    fn component_count(&self) -> usize {
        analyzer::weakly_connected_components(&self.graph.dependency_graph()).len()
    }
}
