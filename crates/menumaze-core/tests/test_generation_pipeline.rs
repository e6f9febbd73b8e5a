//! Integration tests for the full generation and tuning flow.
//!
//! Exercises: GenerationData → GridCollapse → Topology → Population
//! → Dependencies → SolvabilityChecker / DifficultyAnalyzer → BalanceTuner
//!
//! Everything runs on the built-in data set unless a test overrides it.

use menumaze_core::config::{CategoryRule, DifficultyTier, GenerationData};
use menumaze_core::error::Error;
use menumaze_core::generation::GenerationPipeline;
use menumaze_core::tuning::BalanceTuner;
use menumaze_logic::analyzer;
use menumaze_logic::difficulty::{self, Rating};
use menumaze_logic::solvability::{Severity, SolvabilityChecker};
use menumaze_logic::ContentGraph;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn generate(seed: u64) -> ContentGraph {
    GenerationPipeline::new(GenerationData::builtin().expect("builtin data"))
        .generate(Some(seed))
        .unwrap_or_else(|e| panic!("seed {} failed: {}", seed, e))
}

fn component_count(graph: &ContentGraph) -> usize {
    analyzer::weakly_connected_components(&graph.dependency_graph()).len()
}

fn abc_data() -> GenerationData {
    let mut data = GenerationData::builtin().expect("builtin data");
    data.rules = [("A", ["B", "C"]), ("B", ["A", "C"]), ("C", ["A", "B"])]
        .into_iter()
        .map(|(cat, conns)| {
            (
                cat.to_string(),
                CategoryRule {
                    connections: conns.iter().map(|s| s.to_string()).collect(),
                    requires: Vec::new(),
                },
            )
        })
        .collect();
    data.config.grid_width = 3;
    data.config.grid_height = 3;
    data.config.min_path_length = 3;
    data.config.required_categories = 2;
    data
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn same_seed_gives_same_graph() {
    for seed in 0..10 {
        let a = generate(seed);
        let b = generate(seed);
        assert_eq!(a.menu_count(), b.menu_count());
        assert_eq!(a.setting_count(), b.setting_count());
        for (id, menu) in &a.menus {
            let other = &b.menus[id];
            assert_eq!(menu.category, other.category);
            assert_eq!(menu.settings.len(), other.settings.len());
        }
        assert_eq!(a, b, "seed {}", seed);
    }
}

#[test]
fn different_seeds_differ() {
    let graphs: Vec<ContentGraph> = (0..5).map(generate).collect();
    assert!(graphs.windows(2).any(|w| w[0] != w[1]));
}

// ── Structure ──────────────────────────────────────────────────────────

#[test]
fn dependency_graph_is_acyclic_for_every_seed() {
    for seed in 0..25 {
        let graph = generate(seed);
        assert!(graph.total_dependencies() > 0, "seed {}", seed);
        assert!(
            analyzer::is_acyclic(&graph.dependency_graph()),
            "seed {} produced a dependency cycle",
            seed
        );
    }
}

#[test]
fn generated_graphs_pass_the_checker() {
    for seed in 0..10 {
        let graph = generate(seed);
        let mut checker = SolvabilityChecker::new();
        assert!(checker.validate(&graph), "seed {}: {}", seed, checker.report());
    }
}

#[test]
fn every_menu_is_reachable_from_start() {
    let graph = generate(3);
    let start = graph.start_menu.clone().expect("start menu");
    let reach = analyzer::reachable_from(&graph.menu_graph(), &start);
    assert_eq!(reach.len(), graph.menu_count());
}

#[test]
fn three_by_three_abc_grid_generates() {
    for seed in 0..20 {
        let graph = GenerationPipeline::new(abc_data())
            .generate(Some(seed))
            .unwrap_or_else(|e| panic!("seed {} failed: {}", seed, e));
        assert!(graph.menu_count() >= 3, "seed {}", seed);
        assert!(analyzer::is_weakly_connected(&graph.menu_graph()), "seed {}", seed);
        assert!(graph
            .menus
            .values()
            .all(|m| ["A", "B", "C"].contains(&m.category.as_str())));
    }
}

#[test]
fn enabled_settings_accept_updates() {
    for seed in 0..15 {
        let graph = generate(seed);
        for s in graph.settings.values().filter(|s| s.is_enabled()) {
            let mut edited = graph.clone();
            assert!(
                edited.update_setting(&s.id, s.value.clone()).is_ok(),
                "seed {}: enabled {} rejected its current value",
                seed,
                s.id
            );
        }
    }
}

// ── Difficulty ─────────────────────────────────────────────────────────

#[test]
fn difficulty_score_matches_rating() {
    for seed in 0..5 {
        let score = difficulty::analyze(&generate(seed));
        assert!(score.overall <= 100);
        assert_eq!(score.rating, Rating::from_score(score.overall));
        assert_eq!(score.metrics.total_settings, generate(seed).setting_count());
    }
}

fn mean_density(tier: DifficultyTier) -> f64 {
    (0..10)
        .map(|seed| {
            let mut data = GenerationData::builtin().expect("builtin data");
            data.config.difficulty_tier = tier;
            let graph = GenerationPipeline::new(data)
                .generate(Some(seed))
                .unwrap_or_else(|e| panic!("seed {} failed: {}", seed, e));
            graph.total_dependencies() as f64 / graph.setting_count() as f64
        })
        .sum::<f64>()
        / 10.0
}

#[test]
fn hard_tier_is_denser_than_easy() {
    let easy = mean_density(DifficultyTier::Easy);
    let hard = mean_density(DifficultyTier::Hard);
    assert!(hard > easy, "hard {:.3} <= easy {:.3}", hard, easy);
}

// ── Balance tuning ─────────────────────────────────────────────────────

#[test]
fn presets_leave_no_critical_issues() {
    for seed in 0..8 {
        let graph = generate(seed);
        for preset in ["easy", "medium", "hard"] {
            let mut tuned = graph.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            BalanceTuner::new(&mut tuned, &mut rng)
                .apply_preset(preset)
                .expect("known preset");

            let mut checker = SolvabilityChecker::new();
            checker.validate(&tuned);
            let critical = checker
                .issues()
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count();
            assert_eq!(critical, 0, "seed {} preset {}: {}", seed, preset, checker.report());
            assert!(analyzer::is_acyclic(&tuned.dependency_graph()));
        }
    }
}

#[test]
fn presets_are_safe_to_reapply() {
    let mut graph = generate(12);
    let mut rng = StdRng::seed_from_u64(12);
    let mut tuner = BalanceTuner::new(&mut graph, &mut rng);
    tuner.apply_preset("easy").expect("first pass");
    let second = tuner.apply_preset("easy").expect("second pass");
    assert_eq!(second.starters_unlocked, 0);
    assert_eq!(second.settings_force_unlocked, 0);
}

#[test]
fn unlock_starters_adds_exactly_the_shortfall() {
    let mut graph = generate(21);
    let enabled = graph.enabled_count();
    let locked = graph.locked_count();
    assert!(locked > 0);
    let wanted = locked.min(3);

    let mut rng = StdRng::seed_from_u64(0);
    let mut tuner = BalanceTuner::new(&mut graph, &mut rng);
    assert_eq!(tuner.unlock_starters(enabled + wanted), wanted);
    assert_eq!(tuner.unlock_starters(enabled), 0);
    assert_eq!(graph.enabled_count(), enabled + wanted);
}

#[test]
fn reduce_density_never_splits_components() {
    for seed in 0..10 {
        let mut graph = generate(seed);
        let before = component_count(&graph);
        let deps_before = graph.total_dependencies();

        let mut rng = StdRng::seed_from_u64(seed);
        let removed = BalanceTuner::new(&mut graph, &mut rng).reduce_density(0.1);

        assert_eq!(component_count(&graph), before, "seed {}", seed);
        assert_eq!(graph.total_dependencies(), deps_before - removed);
    }
}

#[test]
fn unknown_preset_is_an_error() {
    let mut graph = generate(0);
    let mut rng = StdRng::seed_from_u64(0);
    let result = BalanceTuner::new(&mut graph, &mut rng).apply_preset("impossible");
    assert!(matches!(result, Err(Error::UnknownPreset(_))));
}

#[test]
fn tier_names_a_known_preset() {
    let data = GenerationData::builtin().expect("builtin data");
    let mut graph = generate(4);
    let mut rng = StdRng::seed_from_u64(4);
    let report = BalanceTuner::new(&mut graph, &mut rng)
        .apply_preset(data.config.difficulty_tier.preset_name())
        .expect("tier preset exists");
    assert_eq!(report.preset, "medium");
}
