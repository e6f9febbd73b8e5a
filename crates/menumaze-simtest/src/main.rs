//! MenuMaze Headless Generation Harness
//!
//! Generates mazes over a seed sweep and runs every validator against them.
//! Runs entirely in-process with the built-in data set.
//!
//! Usage:
//!   cargo run -p menumaze-simtest
//!   cargo run -p menumaze-simtest -- --verbose
//!   cargo run -p menumaze-simtest -- --seeds 200

use menumaze_core::config::GenerationData;
use menumaze_core::generation::GenerationPipeline;
use menumaze_core::persistence;
use menumaze_core::tuning::{self, BalanceTuner, PRESETS};
use menumaze_logic::analyzer;
use menumaze_logic::difficulty::{self, Rating};
use menumaze_logic::evaluator::DependencyEvaluator;
use menumaze_logic::progress;
use menumaze_logic::solvability::{Severity, SolvabilityChecker};
use menumaze_logic::{ContentGraph, SettingState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

const DEFAULT_SEEDS: u64 = 50;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seeds = args
        .iter()
        .position(|a| a == "--seeds")
        .and_then(|i| args.get(i + 1))
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_SEEDS);
    println!("=== MenuMaze Generation Harness ({} seeds) ===\n", seeds);

    let data = match GenerationData::builtin() {
        Ok(d) => d,
        Err(e) => {
            println!("  ✗ data_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Built-in data consistency
    results.extend(validate_data(&data, verbose));

    // 2. Generation sweep
    let graphs = generate_all(&data, seeds, &mut results);
    results.extend(validate_structure(&graphs, verbose));

    // 3. Determinism
    results.extend(validate_determinism(&data, &graphs));

    // 4. Difficulty analysis
    results.extend(validate_difficulty(&graphs, verbose));

    // 5. Balance presets
    results.extend(validate_presets(&graphs, verbose));

    // 6. Play-through
    results.extend(validate_playthrough(&graphs, verbose));

    // 7. Save / load
    results.extend(validate_persistence(&graphs));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

/// Summarize offending seeds for a detail line.
fn seed_list(seeds: &[u64]) -> String {
    if seeds.is_empty() {
        return "none".into();
    }
    let shown: Vec<String> = seeds.iter().take(10).map(|s| s.to_string()).collect();
    if seeds.len() > 10 {
        format!("{} (+{} more)", shown.join(", "), seeds.len() - 10)
    } else {
        shown.join(", ")
    }
}

// ── 1. Data ─────────────────────────────────────────────────────────────

fn validate_data(data: &GenerationData, verbose: bool) -> Vec<TestResult> {
    println!("--- Data ---");
    let mut results = Vec::new();

    results.push(check(
        "rules_not_empty",
        data.rules.len() >= data.config.required_categories,
        format!(
            "{} categories, {} required",
            data.rules.len(),
            data.config.required_categories
        ),
    ));

    let unknown: Vec<String> = data
        .rules
        .iter()
        .flat_map(|(cat, rule)| {
            rule.connections
                .iter()
                .filter(|c| !data.rules.contains_key(*c))
                .map(move |c| format!("{}→{}", cat, c))
        })
        .collect();
    results.push(check(
        "rules_reference_known_categories",
        unknown.is_empty(),
        if unknown.is_empty() {
            "all connections name a known category".into()
        } else {
            unknown.join(", ")
        },
    ));

    let asymmetric: Vec<String> = data
        .rules
        .iter()
        .flat_map(|(cat, rule)| {
            rule.connections
                .iter()
                .filter(|c| {
                    data.rules
                        .get(*c)
                        .is_some_and(|other| !other.connections.contains(cat))
                })
                .map(move |c| format!("{}↔{}", cat, c))
        })
        .collect();
    results.push(check(
        "rules_symmetric",
        asymmetric.is_empty(),
        if asymmetric.is_empty() {
            "every connection is mutual".into()
        } else {
            asymmetric.join(", ")
        },
    ));

    let missing_specs: Vec<&str> = data
        .rules
        .keys()
        .filter(|c| !data.categories.contains_key(*c))
        .map(String::as_str)
        .collect();
    results.push(check(
        "categories_have_specs",
        missing_specs.is_empty(),
        if missing_specs.is_empty() {
            "every category has a setting spec".into()
        } else {
            missing_specs.join(", ")
        },
    ));

    let templates = data
        .labels
        .templates
        .get("setting_labels")
        .map_or(0, Vec::len);
    results.push(check(
        "setting_label_templates",
        templates > 0,
        format!("{} templates", templates),
    ));

    if verbose {
        println!("  Settings per category:");
        for (cat, spec) in &data.categories {
            println!("    {:14}: {}", cat, spec.setting_count);
        }
    }

    results
}

// ── 2. Generation ───────────────────────────────────────────────────────

fn generate_all(data: &GenerationData, seeds: u64, results: &mut Vec<TestResult>) -> Vec<(u64, ContentGraph)> {
    println!("--- Generation ---");
    let mut graphs = Vec::new();
    let mut failures = Vec::new();
    for seed in 0..seeds {
        match GenerationPipeline::new(data.clone()).generate(Some(seed)) {
            Ok(g) => graphs.push((seed, g)),
            Err(e) => failures.push(format!("seed {}: {}", seed, e)),
        }
    }
    results.push(check(
        "generation_succeeds",
        failures.is_empty(),
        if failures.is_empty() {
            format!("{} graphs generated", graphs.len())
        } else {
            failures.join("; ")
        },
    ));
    graphs
}

fn validate_structure(graphs: &[(u64, ContentGraph)], verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    let cyclic: Vec<u64> = graphs
        .iter()
        .filter(|(_, g)| !analyzer::is_acyclic(&g.dependency_graph()))
        .map(|(s, _)| *s)
        .collect();
    results.push(check(
        "dependencies_acyclic",
        cyclic.is_empty(),
        format!("cyclic seeds: {}", seed_list(&cyclic)),
    ));

    let mut unsolvable = Vec::new();
    for (seed, g) in graphs {
        let mut checker = SolvabilityChecker::new();
        if !checker.validate(g) {
            if verbose {
                println!("  seed {}:\n{}", seed, checker.report());
            }
            unsolvable.push(*seed);
        }
    }
    results.push(check(
        "checker_clean",
        unsolvable.is_empty(),
        format!("seeds with issues: {}", seed_list(&unsolvable)),
    ));

    let no_start: Vec<u64> = graphs
        .iter()
        .filter(|(_, g)| g.start_menu.as_ref().map_or(true, |s| !g.menus.contains_key(s)))
        .map(|(s, _)| *s)
        .collect();
    results.push(check(
        "start_menu_set",
        no_start.is_empty(),
        format!("seeds without start menu: {}", seed_list(&no_start)),
    ));

    if verbose && !graphs.is_empty() {
        let n = graphs.len() as f64;
        let menus: usize = graphs.iter().map(|(_, g)| g.menu_count()).sum();
        let settings: usize = graphs.iter().map(|(_, g)| g.setting_count()).sum();
        let deps: usize = graphs.iter().map(|(_, g)| g.total_dependencies()).sum();
        let locked: usize = graphs.iter().map(|(_, g)| g.locked_count()).sum();
        println!(
            "  avg: {:.1} menus, {:.1} settings, {:.1} dependencies, {:.1} locked",
            menus as f64 / n,
            settings as f64 / n,
            deps as f64 / n,
            locked as f64 / n
        );
    }

    results
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(data: &GenerationData, graphs: &[(u64, ContentGraph)]) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mismatched: Vec<u64> = graphs
        .iter()
        .take(10)
        .filter(|(seed, g)| {
            GenerationPipeline::new(data.clone())
                .generate(Some(*seed))
                .map_or(true, |again| &again != g)
        })
        .map(|(s, _)| *s)
        .collect();
    vec![check(
        "same_seed_same_graph",
        mismatched.is_empty(),
        format!("mismatched seeds: {}", seed_list(&mismatched)),
    )]
}

// ── 4. Difficulty ───────────────────────────────────────────────────────

fn validate_difficulty(graphs: &[(u64, ContentGraph)], verbose: bool) -> Vec<TestResult> {
    println!("--- Difficulty ---");
    let mut ratings: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut bad = Vec::new();
    for (seed, g) in graphs {
        let score = difficulty::analyze(g);
        if score.overall > 100 || score.rating != Rating::from_score(score.overall) {
            bad.push(*seed);
        }
        *ratings.entry(score.rating.as_str()).or_default() += 1;
    }

    if verbose {
        println!("  Rating distribution:");
        for (rating, count) in &ratings {
            println!("    {:10}: {}", rating, count);
        }
    }

    vec![check(
        "scores_in_range",
        bad.is_empty(),
        format!("bad seeds: {}", seed_list(&bad)),
    )]
}

// ── 5. Balance presets ──────────────────────────────────────────────────

fn validate_presets(graphs: &[(u64, ContentGraph)], verbose: bool) -> Vec<TestResult> {
    println!("--- Balance Presets ---");
    let mut results = Vec::new();

    for preset in PRESETS.iter() {
        let mut critical = Vec::new();
        let mut last_report = None;
        for (seed, g) in graphs {
            let mut tuned = g.clone();
            let mut rng = StdRng::seed_from_u64(*seed);
            match BalanceTuner::new(&mut tuned, &mut rng).apply_preset(preset.name) {
                Ok(report) => last_report = Some(report),
                Err(_) => {
                    critical.push(*seed);
                    continue;
                }
            }
            let mut checker = SolvabilityChecker::new();
            checker.validate(&tuned);
            if checker.issues().iter().any(|i| i.severity == Severity::Critical) {
                critical.push(*seed);
            }
        }

        if verbose {
            if let Ok(summary) = tuning::adjustments_summary(preset.name) {
                println!("{}", summary);
            }
            if let Some(report) = &last_report {
                println!(
                    "  last report: {}",
                    serde_json::to_string(report).unwrap_or_default()
                );
            }
        }

        results.push(check(
            &format!("preset_{}_no_critical_issues", preset.name),
            critical.is_empty(),
            format!("seeds with critical issues: {}", seed_list(&critical)),
        ));
    }

    results
}

// ── 6. Play-through ─────────────────────────────────────────────────────

/// Unlock and enable everything that becomes available, round by round.
/// Returns the number of rounds, or `None` if the graph stalls short of victory.
fn play(graph: &mut ContentGraph) -> Option<usize> {
    if let Some(start) = graph.start_menu.clone() {
        graph.navigate_to(&start);
    }
    let menus: Vec<String> = graph.menus.keys().cloned().collect();
    for id in &menus {
        graph.navigate_to(id);
    }

    let max_rounds = graph.setting_count() + 1;
    for round in 0..max_rounds {
        graph.propagate_unlocks();
        let ready: Vec<String> = graph
            .settings
            .values()
            .filter(|s| s.state == SettingState::Disabled && graph.can_enable(&s.id))
            .map(|s| s.id.clone())
            .collect();
        if ready.is_empty() {
            return progress::is_victory(graph).then_some(round);
        }
        for id in &ready {
            if graph.transition(id, SettingState::Enabled).is_err() {
                return None;
            }
        }
    }
    None
}

fn validate_playthrough(graphs: &[(u64, ContentGraph)], verbose: bool) -> Vec<TestResult> {
    println!("--- Play-through ---");
    let mut stalled = Vec::new();
    let mut under_blocked = Vec::new();
    let mut rounds = Vec::new();

    for (seed, g) in graphs {
        let mut evaluator = DependencyEvaluator::new();
        let blocked = evaluator
            .evaluate_all(g)
            .values()
            .filter(|e| !e.can_enable)
            .count();
        if blocked < g.locked_count() {
            under_blocked.push(*seed);
        }

        let mut played = g.clone();
        match play(&mut played) {
            Some(r) => rounds.push(r),
            None => stalled.push(*seed),
        }
        if verbose && *seed == 0 {
            println!(
                "  seed 0: progress {:.0}%, critical path {:.0}%",
                progress::overall_progress(&played),
                progress::critical_path_progress(&played)
            );
        }
    }

    let max_rounds = rounds.iter().copied().max().unwrap_or(0);
    vec![
        check(
            "locked_settings_are_blocked",
            under_blocked.is_empty(),
            format!("seeds: {}", seed_list(&under_blocked)),
        ),
        check(
            "victory_reachable",
            stalled.is_empty(),
            format!(
                "stalled seeds: {}, longest play-through {} rounds",
                seed_list(&stalled),
                max_rounds
            ),
        ),
    ]
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(graphs: &[(u64, ContentGraph)]) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let Some((seed, graph)) = graphs.first() else {
        return vec![check("save_load_roundtrip", false, "no graph to save")];
    };

    let mut buffer = Vec::new();
    let outcome = persistence::save_content(&mut buffer, graph, Some(*seed))
        .and_then(|_| persistence::load_content(&buffer[..]));
    let result = match outcome {
        Ok(loaded) => check(
            "save_load_roundtrip",
            &loaded.graph == graph && loaded.seed == Some(*seed),
            format!("{} bytes", buffer.len()),
        ),
        Err(e) => check("save_load_roundtrip", false, e.to_string()),
    };
    vec![result]
}
