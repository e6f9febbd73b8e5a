//! Player progress over a content graph.

use crate::content::ContentGraph;
use crate::types::{CompletionState, SettingState};

/// Overall progress percentage. Enabled or locked settings count as
/// configured, each visited menu adds half a setting. Never reaches 100.
pub fn overall_progress(graph: &ContentGraph) -> f64 {
    let total = graph.setting_count();
    if total == 0 {
        return 0.0;
    }
    let configured = graph
        .settings
        .values()
        .filter(|s| matches!(s.state, SettingState::Enabled | SettingState::Locked))
        .count();
    let visited_bonus = graph.visited_menus.len() as f64 * 0.5;
    let raw = (configured as f64 + visited_bonus) / total as f64;
    (raw * 100.0).min(99.0)
}

/// Completion of one menu; unknown menus are incomplete.
pub fn menu_completion(graph: &ContentGraph, menu_id: &str) -> CompletionState {
    graph
        .get_menu(menu_id)
        .map(|m| m.calculate_completion(graph))
        .unwrap_or(CompletionState::Incomplete)
}

/// Share of menus visited, as a percentage.
pub fn critical_path_progress(graph: &ContentGraph) -> f64 {
    let total = graph.menu_count();
    if total == 0 {
        return 0.0;
    }
    graph.visited_menus.len() as f64 / total as f64 * 100.0
}

/// Every setting that has dependencies is enabled (and there is at least one).
pub fn is_victory(graph: &ContentGraph) -> bool {
    let mut gated = graph
        .settings
        .values()
        .filter(|s| graph.resolver.has_dependencies(&s.id))
        .peekable();
    gated.peek().is_some() && gated.all(|s| s.is_enabled())
}
