//! Solvability checks for a finished content graph.
//!
//! Each check is a free function returning the issues it found; the
//! [`SolvabilityChecker`] runs them all and keeps the last result. Cycles and
//! dangling references are reported here as data, never raised.

use std::collections::BTreeSet;

use crate::analyzer;
use crate::content::ContentGraph;
use crate::dependency::Dependency;
use crate::types::SettingState;

/// What kind of problem an [`Issue`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    CircularDependency,
    MissingDependency,
    NoStartMenu,
    UnreachableMenus,
    UnlockableSetting,
    LowCompletionRate,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::CircularDependency => "circular_dependency",
            IssueKind::MissingDependency => "missing_dependency",
            IssueKind::NoStartMenu => "no_start_menu",
            IssueKind::UnreachableMenus => "unreachable_menus",
            IssueKind::UnlockableSetting => "unlockable_setting",
            IssueKind::LowCompletionRate => "low_completion_rate",
        }
    }
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
}

/// A single solvability problem.
#[derive(Debug, Clone)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub affected: Vec<String>,
}

// ── Dependency structure ────────────────────────────────────────────────

/// One issue per strongly connected component of size > 1, with an example cycle.
pub fn check_circular_dependencies(graph: &ContentGraph) -> Vec<Issue> {
    let deps = graph.dependency_graph();
    let mut issues = Vec::new();
    for component in analyzer::strongly_connected_components(&deps) {
        if component.len() < 2 {
            continue;
        }
        let mut affected = component.clone();
        affected.sort();
        let description = match analyzer::find_cycle_in(&deps, &component) {
            Some(mut cycle) => {
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                format!(
                    "Circular dependency group ({} settings): {}",
                    component.len(),
                    cycle.join(" -> ")
                )
            }
            None => format!(
                "Circular dependency group detected with {} settings",
                component.len()
            ),
        };
        issues.push(Issue {
            kind: IssueKind::CircularDependency,
            severity: Severity::Critical,
            description,
            affected,
        });
    }
    issues
}

/// Dependencies that reference settings which do not exist.
pub fn check_missing_dependencies(graph: &ContentGraph) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (setting_id, deps) in &graph.resolver.dependencies {
        let Some(setting) = graph.get_setting(setting_id) else {
            continue;
        };
        for dep in deps {
            let missing: Vec<String> = dep
                .referenced_ids()
                .into_iter()
                .filter(|id| graph.get_setting(id).is_none())
                .map(str::to_string)
                .collect();
            if missing.is_empty() {
                continue;
            }
            let description = match dep {
                Dependency::Simple { setting_id: target, .. } => format!(
                    "Setting '{}' depends on non-existent setting '{}'",
                    setting.label, target
                ),
                Dependency::Value { .. } => format!(
                    "Value dependency references non-existent settings: {}",
                    missing.join(", ")
                ),
            };
            let mut affected = vec![setting_id.clone()];
            affected.extend(missing);
            issues.push(Issue {
                kind: IssueKind::MissingDependency,
                severity: Severity::Critical,
                description,
                affected,
            });
        }
    }
    issues
}

// ── Menus ───────────────────────────────────────────────────────────────

/// Every menu must be reachable from the start menu via `connections`.
pub fn check_menu_connectivity(graph: &ContentGraph) -> Vec<Issue> {
    if graph.menus.is_empty() {
        return Vec::new();
    }
    let start = match graph.start_menu.as_deref() {
        Some(id) if graph.menus.contains_key(id) => id,
        other => {
            let description = match other {
                Some(id) => format!("Starting menu '{}' does not exist", id),
                None => "No starting menu defined".to_string(),
            };
            return vec![Issue {
                kind: IssueKind::NoStartMenu,
                severity: Severity::Critical,
                description,
                affected: other.map(|id| vec![id.to_string()]).unwrap_or_default(),
            }];
        }
    };

    let menus = graph.menu_graph();
    let reachable = analyzer::reachable_from(&menus, start);
    let unreachable: Vec<String> = menus
        .nodes()
        .filter(|id| !reachable.contains(*id))
        .map(str::to_string)
        .collect();
    if unreachable.is_empty() {
        return Vec::new();
    }
    vec![Issue {
        kind: IssueKind::UnreachableMenus,
        severity: Severity::Warning,
        description: format!("Menus unreachable from start: {}", unreachable.join(", ")),
        affected: unreachable,
    }]
}

// ── Unlock simulation ───────────────────────────────────────────────────

/// Settings reachable by repeatedly satisfying dependencies, starting from
/// every ENABLED setting. Capped at `2 × settings` passes.
pub fn simulate_unlocking(graph: &ContentGraph) -> BTreeSet<String> {
    let mut unlocked: BTreeSet<String> = graph
        .settings
        .values()
        .filter(|s| s.is_enabled())
        .map(|s| s.id.clone())
        .collect();

    let max_iterations = graph.setting_count() * 2;
    let mut iteration = 0;
    let mut changed = true;
    while changed && iteration < max_iterations {
        changed = false;
        iteration += 1;
        for id in graph.settings.keys() {
            if unlocked.contains(id) {
                continue;
            }
            if can_unlock_with(graph, id, &unlocked) {
                unlocked.insert(id.clone());
                changed = true;
            }
        }
    }
    unlocked
}

fn can_unlock_with(graph: &ContentGraph, setting_id: &str, unlocked: &BTreeSet<String>) -> bool {
    graph.resolver.get(setting_id).iter().all(|dep| match dep {
        Dependency::Simple {
            setting_id,
            required_state,
        } => unlocked.contains(setting_id) || *required_state != SettingState::Enabled,
        Dependency::Value {
            setting_a,
            setting_b,
            ..
        } => unlocked.contains(setting_a) && unlocked.contains(setting_b),
    })
}

/// LOCKED settings the simulation never reaches.
pub fn check_unlockable_settings(graph: &ContentGraph, unlocked: &BTreeSet<String>) -> Vec<Issue> {
    graph
        .settings
        .values()
        .filter(|s| s.is_locked() && !unlocked.contains(&s.id))
        .map(|s| Issue {
            kind: IssueKind::UnlockableSetting,
            severity: Severity::Critical,
            description: format!("Setting '{}' can never be unlocked", s.label),
            affected: vec![s.id.clone()],
        })
        .collect()
}

/// Warn when fewer than half of all settings can ever be unlocked.
pub fn check_completion_rate(graph: &ContentGraph, unlocked: &BTreeSet<String>) -> Vec<Issue> {
    let total = graph.setting_count();
    if (unlocked.len() as f64) < total as f64 * 0.5 {
        vec![Issue {
            kind: IssueKind::LowCompletionRate,
            severity: Severity::Warning,
            description: format!("Only {}/{} settings can be unlocked", unlocked.len(), total),
            affected: Vec::new(),
        }]
    } else {
        Vec::new()
    }
}

// ── Master validation ───────────────────────────────────────────────────

pub fn validate_all(graph: &ContentGraph) -> Vec<Issue> {
    let unlocked = simulate_unlocking(graph);
    let mut all = Vec::new();
    all.extend(check_circular_dependencies(graph));
    all.extend(check_missing_dependencies(graph));
    all.extend(check_menu_connectivity(graph));
    all.extend(check_unlockable_settings(graph, &unlocked));
    all.extend(check_completion_rate(graph, &unlocked));
    all
}

/// Runs every check and keeps the issues from the last run.
#[derive(Debug, Default)]
pub struct SolvabilityChecker {
    issues: Vec<Issue>,
}

impl SolvabilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the issue list with a fresh run. True when nothing was found.
    pub fn validate(&mut self, graph: &ContentGraph) -> bool {
        self.issues = validate_all(graph);
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Critical)
    }

    pub fn report(&self) -> String {
        if self.issues.is_empty() {
            return "Game is solvable - no issues detected".to_string();
        }
        let critical: Vec<&Issue> = self.critical_issues().collect();
        let warnings: Vec<&Issue> = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();

        let mut lines = vec![format!("Found {} solvability issues:", self.issues.len())];
        if !critical.is_empty() {
            lines.push(format!("\nCritical Issues ({}):", critical.len()));
            lines.extend(critical.iter().map(|i| format!("  - {}", i.description)));
        }
        if !warnings.is_empty() {
            lines.push(format!("\nWarnings ({}):", warnings.len()));
            lines.extend(warnings.iter().map(|i| format!("  - {}", i.description)));
        }
        lines.join("\n")
    }
}
