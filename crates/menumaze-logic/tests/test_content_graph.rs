//! Integration tests for hand-built content graphs.
//!
//! Exercises: ContentGraph → SolvabilityChecker / DifficultyAnalyzer
//!
//! All tests are pure logic, no generation or randomness.

use menumaze_logic::difficulty::{analyze, Rating};
use menumaze_logic::solvability::{IssueKind, Severity, SolvabilityChecker};
use menumaze_logic::{
    ContentGraph, Dependency, MenuNode, Setting, SettingState, SettingType, SettingValue,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn graph_with(settings: Vec<Setting>) -> ContentGraph {
    let mut g = ContentGraph::new();
    g.add_menu(MenuNode::new("general_0_0", "general"), settings);
    g.start_menu = Some("general_0_0".into());
    g
}

fn boolean(id: &str, state: SettingState) -> Setting {
    Setting::new(id, SettingType::Boolean, state, id.to_uppercase())
}

// ── Solvability ────────────────────────────────────────────────────────

#[test]
fn single_gate_is_solvable() {
    let mut g = graph_with(vec![
        boolean("s1", SettingState::Enabled),
        boolean("s2", SettingState::Locked),
    ]);
    g.resolver.add_dependency("s2", Dependency::enabled("s1"));

    let mut checker = SolvabilityChecker::new();
    assert!(checker.validate(&g), "{}", checker.report());
}

#[test]
fn two_cycle_reports_one_circular_issue() {
    let mut g = graph_with(vec![
        boolean("s1", SettingState::Enabled),
        boolean("s2", SettingState::Locked),
    ]);
    g.resolver.add_dependency("s2", Dependency::enabled("s1"));
    g.resolver.add_dependency("s1", Dependency::enabled("s2"));

    let mut checker = SolvabilityChecker::new();
    assert!(!checker.validate(&g));

    let circular: Vec<_> = checker
        .issues()
        .iter()
        .filter(|i| i.kind == IssueKind::CircularDependency)
        .collect();
    assert_eq!(circular.len(), 1);
    assert_eq!(circular[0].severity, Severity::Critical);
    assert_eq!(circular[0].affected, vec!["s1", "s2"]);
    assert!(circular[0].description.contains("->"));
}

#[test]
fn validate_replaces_previous_issues() {
    let mut g = graph_with(vec![boolean("a", SettingState::Locked)]);
    g.resolver.add_dependency("a", Dependency::enabled("missing"));

    let mut checker = SolvabilityChecker::new();
    assert!(!checker.validate(&g));
    let first = checker.issues().len();
    assert!(first >= 2);

    g.resolver.clear("a");
    g.settings.get_mut("a").unwrap().state = SettingState::Enabled;
    assert!(checker.validate(&g));
    assert!(checker.issues().is_empty());
}

// ── Difficulty ─────────────────────────────────────────────────────────

#[test]
fn linear_chain_of_ten() {
    let ids: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
    let mut settings = vec![boolean(&ids[0], SettingState::Enabled)];
    settings.extend(ids[1..].iter().map(|id| boolean(id, SettingState::Locked)));
    let mut g = graph_with(settings);
    for pair in ids.windows(2) {
        g.resolver.add_dependency(pair[1].clone(), Dependency::enabled(pair[0].clone()));
    }

    let score = analyze(&g);
    assert_eq!(score.metrics.max_chain_length, 9);
    assert_eq!(score.metrics.total_dependencies, 9);
    assert!(score.overall > 30, "score was {}", score.overall);
    assert!(score.rating >= Rating::Medium);
    assert!(
        score.suggestions.iter().any(|s| s.contains("chain")),
        "{:?}",
        score.suggestions
    );

    let mut checker = SolvabilityChecker::new();
    assert!(checker.validate(&g), "{}", checker.report());
}

// ── Consumer contract ──────────────────────────────────────────────────

#[test]
fn session_layer_unlocks_in_order() {
    let mut g = graph_with(vec![
        Setting::new("vol", SettingType::Integer, SettingState::Disabled, "Volume")
            .with_bounds(0.0, 100.0),
        boolean("mute", SettingState::Locked),
    ]);
    g.resolver.add_dependency("mute", Dependency::enabled("vol"));

    assert!(!g.can_enable("mute"));
    assert!(g.propagate_unlocks().is_empty());

    g.transition("vol", SettingState::Enabled).unwrap();
    g.update_setting("vol", SettingValue::Int(70)).unwrap();
    assert!(g.can_enable("mute"));
    assert_eq!(g.propagate_unlocks(), vec!["mute".to_string()]);
    g.transition("mute", SettingState::Enabled).unwrap();
    assert_eq!(g.enabled_count(), 2);
}
