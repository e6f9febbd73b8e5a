//! Difficulty metrics and scoring over the dependency graph.
//!
//! Score is a capped sum of five sub-scores:
//!
//! | Metric | Weight | Cap |
//! |--------|--------|-----|
//! | dependency density | ×20 | 30 |
//! | max chain length | ×5 | 25 |
//! | locked ratio | ×20 | 20 |
//! | branching factor | ×3 | 15 |
//! | menu critical path | ×2 | 10 |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyzer;
use crate::content::ContentGraph;
use crate::graph::DiGraph;

/// Difficulty bucket derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Trivial,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Rating {
    /// Lower score bound of each rating, highest first.
    const THRESHOLDS: [(u32, Rating); 5] = [
        (80, Rating::VeryHard),
        (60, Rating::Hard),
        (40, Rating::Medium),
        (20, Rating::Easy),
        (0, Rating::Trivial),
    ];

    pub fn from_score(score: u32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, r)| *r)
            .unwrap_or(Rating::Trivial)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Trivial => "trivial",
            Rating::Easy => "easy",
            Rating::Medium => "medium",
            Rating::Hard => "hard",
            Rating::VeryHard => "very_hard",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMetrics {
    pub dependency_density: f64,
    pub max_chain_length: usize,
    pub avg_chain_length: f64,
    pub locked_setting_ratio: f64,
    pub branching_factor: f64,
    pub critical_path_length: usize,
    pub total_settings: usize,
    pub total_dependencies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyScore {
    /// 0..=100
    pub overall: u32,
    pub rating: Rating,
    pub metrics: DifficultyMetrics,
    pub suggestions: Vec<String>,
}

pub fn analyze(graph: &ContentGraph) -> DifficultyScore {
    let metrics = calculate_metrics(graph);
    let overall = calculate_score(&metrics);
    DifficultyScore {
        overall,
        rating: Rating::from_score(overall),
        suggestions: suggestions(&metrics, overall),
        metrics,
    }
}

pub fn calculate_metrics(graph: &ContentGraph) -> DifficultyMetrics {
    let total_settings = graph.setting_count();
    let total_dependencies = graph.total_dependencies();
    let ratio = |n: usize| {
        if total_settings == 0 {
            0.0
        } else {
            n as f64 / total_settings as f64
        }
    };
    let deps = graph.dependency_graph();

    DifficultyMetrics {
        dependency_density: ratio(total_dependencies),
        max_chain_length: max_chain_length(&deps),
        avg_chain_length: avg_chain_length(&deps),
        locked_setting_ratio: ratio(graph.locked_count()),
        branching_factor: branching_factor(&deps),
        critical_path_length: menu_critical_path_length(graph),
        total_settings,
        total_dependencies,
    }
}

pub fn calculate_score(m: &DifficultyMetrics) -> u32 {
    let density = (m.dependency_density * 20.0).min(30.0);
    let chain = (m.max_chain_length as f64 * 5.0).min(25.0);
    let locked = m.locked_setting_ratio * 20.0;
    let branching = (m.branching_factor * 3.0).min(15.0);
    let critical = (m.critical_path_length as f64 * 2.0).min(10.0);
    let total = density + chain + locked + branching + critical;
    (total as u32).min(100)
}

pub fn suggestions(m: &DifficultyMetrics, score: u32) -> Vec<String> {
    let mut out = Vec::new();
    if m.dependency_density > 2.0 {
        out.push("High dependency density detected - consider reducing interconnections".to_string());
    }
    if m.max_chain_length > 5 {
        out.push(format!(
            "Long dependency chains ({}) may frustrate players",
            m.max_chain_length
        ));
    }
    if m.locked_setting_ratio > 0.7 {
        out.push("Too many locked settings - provide more accessible entry points".to_string());
    }
    if m.locked_setting_ratio < 0.3 {
        out.push("Low challenge level - consider adding more dependencies".to_string());
    }
    if m.branching_factor < 1.5 {
        out.push("Limited branching - add more parallel unlocking paths".to_string());
    }
    if m.critical_path_length < 3 {
        out.push("Short critical path - game may feel too simple".to_string());
    }
    if score > 80 {
        out.push("Overall difficulty very high - may discourage casual players".to_string());
    } else if score < 20 {
        out.push("Overall difficulty low - may bore experienced players".to_string());
    }
    out
}

/// Longest path (in edges) over the weakly connected components that are acyclic.
pub fn max_chain_length(deps: &DiGraph) -> usize {
    analyzer::weakly_connected_components(deps)
        .iter()
        .filter_map(|c| analyzer::dag_longest_path_length(deps, c))
        .max()
        .unwrap_or(0)
}

/// Mean ancestor count per setting.
pub fn avg_chain_length(deps: &DiGraph) -> f64 {
    let count = deps.node_count();
    if count == 0 {
        return 0.0;
    }
    let total: usize = deps.nodes().map(|n| analyzer::ancestors(deps, n).len()).sum();
    total as f64 / count as f64
}

/// Mean out-degree over nodes that have any successors.
pub fn branching_factor(deps: &DiGraph) -> f64 {
    let degrees: Vec<usize> = deps
        .nodes()
        .map(|n| deps.out_degree(n))
        .filter(|d| *d > 0)
        .collect();
    if degrees.is_empty() {
        return 0.0;
    }
    degrees.iter().sum::<usize>() as f64 / degrees.len() as f64
}

/// Edge count of the menu graph's critical path (0 without start or end menus).
pub fn menu_critical_path_length(graph: &ContentGraph) -> usize {
    analyzer::find_critical_path(&graph.menu_graph())
        .len()
        .saturating_sub(1)
}

pub fn report(score: &DifficultyScore) -> String {
    let m = &score.metrics;
    let mut lines = vec![
        "Difficulty Analysis Report".to_string(),
        "=".repeat(50),
        String::new(),
        format!(
            "Overall Score: {}/100 ({})",
            score.overall,
            score.rating.as_str().to_uppercase()
        ),
        String::new(),
        "Metrics:".to_string(),
        format!("  Total Settings: {}", m.total_settings),
        format!("  Total Dependencies: {}", m.total_dependencies),
        format!("  Dependency Density: {:.2}", m.dependency_density),
        format!("  Max Chain Length: {}", m.max_chain_length),
        format!("  Avg Chain Length: {:.2}", m.avg_chain_length),
        format!("  Locked Ratio: {:.1}%", m.locked_setting_ratio * 100.0),
        format!("  Branching Factor: {:.2}", m.branching_factor),
        format!("  Critical Path: {} menus", m.critical_path_length),
    ];
    if !score.suggestions.is_empty() {
        lines.push("\nSuggestions:".to_string());
        lines.extend(score.suggestions.iter().map(|s| format!("  - {}", s)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Dependency;
    use crate::menu::MenuNode;
    use crate::types::{Setting, SettingState, SettingType};

    #[test]
    fn test_rating_buckets() {
        assert_eq!(Rating::from_score(0), Rating::Trivial);
        assert_eq!(Rating::from_score(19), Rating::Trivial);
        assert_eq!(Rating::from_score(20), Rating::Easy);
        assert_eq!(Rating::from_score(59), Rating::Medium);
        assert_eq!(Rating::from_score(60), Rating::Hard);
        assert_eq!(Rating::from_score(100), Rating::VeryHard);
    }

    #[test]
    fn test_score_is_capped() {
        let m = DifficultyMetrics {
            dependency_density: 10.0,
            max_chain_length: 50,
            avg_chain_length: 10.0,
            locked_setting_ratio: 1.0,
            branching_factor: 20.0,
            critical_path_length: 40,
            total_settings: 10,
            total_dependencies: 100,
        };
        assert_eq!(calculate_score(&m), 100);
    }

    #[test]
    fn test_cyclic_component_is_skipped_for_chains() {
        let mut g = DiGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        g.add_edge("x", "y");
        g.add_edge("y", "z");
        assert_eq!(max_chain_length(&g), 2);
        assert_eq!(branching_factor(&g), 1.0);
    }

    #[test]
    fn test_menu_critical_path_length() {
        let mut g = ContentGraph::new();
        for (id, next) in [("m0", Some("m1")), ("m1", Some("m2")), ("m2", None)] {
            let mut menu = MenuNode::new(id, "general");
            if let Some(n) = next {
                menu.connect(n);
            }
            g.add_menu(menu, Vec::new());
        }
        assert_eq!(menu_critical_path_length(&g), 2);
    }

    #[test]
    fn test_empty_graph_is_trivial() {
        let score = analyze(&ContentGraph::new());
        assert_eq!(score.overall, 0);
        assert_eq!(score.rating, Rating::Trivial);
        assert!(report(&score).contains("Overall Score: 0/100 (TRIVIAL)"));
    }

    #[test]
    fn test_avg_chain_counts_ancestors() {
        let mut g = ContentGraph::new();
        let settings = ["a", "b", "c"]
            .iter()
            .map(|id| Setting::new(*id, SettingType::Boolean, SettingState::Disabled, *id))
            .collect();
        g.add_menu(MenuNode::new("m", "general"), settings);
        g.resolver.add_dependency("b", Dependency::enabled("a"));
        g.resolver.add_dependency("c", Dependency::enabled("b"));
        let m = calculate_metrics(&g);
        assert_eq!(m.max_chain_length, 2);
        assert!((m.avg_chain_length - 1.0).abs() < 1e-9);
    }
}
