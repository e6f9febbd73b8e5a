//! Dependency synthesis on top of the menu graph.
//!
//! Three additive layers, each refusing any edge that would close a cycle
//! in the dependency graph built so far:
//!
//! 1. navigation gating: a menu's key setting gates each successor's key setting
//! 2. critical-path gating: one random setting pair per consecutive critical menu
//! 3. cross links: `min(total / 10, 20)` draws, each picking a random setting
//!    and topping its dependency count up to a sample from the tier's
//!    dependency profile, linking only pairs with no path either way

use menumaze_logic::analyzer;
use menumaze_logic::{Dependency, DependencyResolver, DiGraph, MenuNode};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

use crate::config::DependencyProfile;

/// Cap on cross-link draws.
const MAX_CROSS_DEPENDENCIES: usize = 20;

pub struct DependencyGenerator<'a> {
    graph: &'a DiGraph,
    menus: &'a BTreeMap<String, MenuNode>,
    min_path_length: usize,
    profile: Option<DependencyProfile>,
    deps: DependencyResolver,
    /// Mirror of `deps` as edges `prerequisite -> dependent`.
    dep_graph: DiGraph,
}

impl<'a> DependencyGenerator<'a> {
    pub fn new(graph: &'a DiGraph, menus: &'a BTreeMap<String, MenuNode>, min_path_length: usize) -> Self {
        Self {
            graph,
            menus,
            min_path_length,
            profile: None,
            deps: DependencyResolver::new(),
            dep_graph: DiGraph::new(),
        }
    }

    /// Draw cross-link counts from `profile`. Without one every draw targets
    /// a single dependency.
    pub fn with_profile(mut self, profile: DependencyProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn generate(mut self, rng: &mut impl Rng) -> DependencyResolver {
        let nav = self.add_navigation_dependencies();
        let critical = self.add_critical_path_dependencies(rng);
        let cross = self.add_cross_dependencies(rng);
        log::debug!(
            "dependencies: {} navigation, {} critical-path, {} cross",
            nav,
            critical,
            cross
        );
        self.deps
    }

    /// Menu with at least one setting.
    fn menu(&self, id: &str) -> Option<&'a MenuNode> {
        let menus: &'a BTreeMap<String, MenuNode> = self.menus;
        menus.get(id).filter(|m| !m.settings.is_empty())
    }

    /// Record `dependent` requires `prerequisite` unless that closes a cycle.
    fn try_add(&mut self, dependent: &str, prerequisite: &str) -> bool {
        if dependent == prerequisite || analyzer::has_path(&self.dep_graph, dependent, prerequisite) {
            return false;
        }
        self.deps
            .add_dependency(dependent, Dependency::enabled(prerequisite));
        self.dep_graph.add_edge(prerequisite, dependent);
        true
    }

    fn add_navigation_dependencies(&mut self) -> usize {
        let graph = self.graph;
        let mut added = 0;
        for node in graph.nodes() {
            let Some(key) = self.menu(node).and_then(MenuNode::key_setting) else {
                continue;
            };
            for succ in graph.successors(node) {
                let Some(target) = self.menu(succ).and_then(MenuNode::key_setting) else {
                    continue;
                };
                if self.try_add(target, key) {
                    added += 1;
                }
            }
        }
        added
    }

    fn add_critical_path_dependencies(&mut self, rng: &mut impl Rng) -> usize {
        let path = analyzer::critical_path(self.graph, self.min_path_length);
        let mut added = 0;
        for pair in path.windows(2) {
            let (Some(current), Some(next)) = (self.menu(&pair[0]), self.menu(&pair[1])) else {
                continue;
            };
            let (Some(from), Some(to)) = (current.settings.choose(rng), next.settings.choose(rng)) else {
                continue;
            };
            if self.try_add(to, from) {
                added += 1;
            }
        }
        added
    }

    /// Dependency count for one cross-link draw, clamped to the profile's range.
    fn sample_dependency_count(&self, rng: &mut impl Rng) -> usize {
        let Some(p) = self.profile else {
            return 1;
        };
        let sample = match Normal::new(p.mean_dependencies, p.std_dev) {
            Ok(normal) => normal.sample(rng),
            Err(_) => p.mean_dependencies,
        };
        let count = sample.round().max(0.0) as usize;
        count.clamp(p.min_dependencies, p.max_dependencies.max(p.min_dependencies))
    }

    fn add_cross_dependencies(&mut self, rng: &mut impl Rng) -> usize {
        let graph = self.graph;
        let all: Vec<&'a str> = graph
            .nodes()
            .filter_map(|n| self.menu(n))
            .flat_map(|m| m.settings.iter().map(String::as_str))
            .collect();
        if all.is_empty() {
            return 0;
        }

        let draws = (all.len() / 10).min(MAX_CROSS_DEPENDENCIES);
        let mut added = 0;
        for _ in 0..draws {
            let Some(&dependent) = all.choose(rng) else {
                continue;
            };
            let target = self.sample_dependency_count(rng);
            let missing = target.saturating_sub(self.deps.get(dependent).len());
            for _ in 0..missing {
                let Some(&prereq) = all.choose(rng) else {
                    continue;
                };
                if prereq == dependent
                    || analyzer::has_path(&self.dep_graph, prereq, dependent)
                    || analyzer::has_path(&self.dep_graph, dependent, prereq)
                {
                    continue;
                }
                if self.try_add(dependent, prereq) {
                    added += 1;
                }
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Bidirectional grid-like graph where every menu has `per_menu` settings.
    fn fixture(n: usize, per_menu: usize) -> (DiGraph, BTreeMap<String, MenuNode>) {
        let mut graph = DiGraph::new();
        let mut menus = BTreeMap::new();
        for i in 0..n {
            let id = format!("m{}", i);
            graph.add_node(&id);
            let mut menu = MenuNode::new(&id, "general");
            menu.settings = (0..per_menu).map(|j| format!("{}_setting_{}", id, j)).collect();
            menus.insert(id, menu);
        }
        for i in 1..n {
            let (a, b) = (format!("m{}", i - 1), format!("m{}", i));
            graph.add_edge(&a, &b);
            graph.add_edge(&b, &a);
        }
        (graph, menus)
    }

    fn resolver_graph(r: &DependencyResolver) -> DiGraph {
        r.to_graph(std::iter::empty())
    }

    #[test]
    fn test_navigation_skips_back_edges() {
        let (graph, menus) = fixture(4, 1);
        let mut gen = DependencyGenerator::new(&graph, &menus, 3);
        assert_eq!(gen.add_navigation_dependencies(), 3);
        assert!(gen.deps.get("m1_setting_0").contains(&Dependency::enabled("m0_setting_0")));
        assert!(gen.deps.get("m0_setting_0").is_empty());
    }

    #[test]
    fn test_output_is_acyclic_across_seeds() {
        let (graph, menus) = fixture(12, 6);
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let deps = DependencyGenerator::new(&graph, &menus, 3).generate(&mut rng);
            assert!(deps.total_dependencies() > 0);
            assert!(analyzer::is_acyclic(&resolver_graph(&deps)), "seed {}", seed);
        }
    }

    fn profile(min: usize, max: usize, mean: f64, std_dev: f64) -> DependencyProfile {
        DependencyProfile {
            min_dependencies: min,
            max_dependencies: max,
            mean_dependencies: mean,
            std_dev,
        }
    }

    #[test]
    fn test_sampled_counts_stay_in_profile_range() {
        let (graph, menus) = fixture(4, 2);
        let gen = DependencyGenerator::new(&graph, &menus, 3).with_profile(profile(2, 4, 3.0, 5.0));
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..200 {
            let n = gen.sample_dependency_count(&mut rng);
            assert!((2..=4).contains(&n), "{}", n);
        }
        let plain = DependencyGenerator::new(&graph, &menus, 3);
        assert_eq!(plain.sample_dependency_count(&mut rng), 1);
    }

    #[test]
    fn test_wider_profile_adds_more_cross_links() {
        let (graph, menus) = fixture(12, 10);
        let mut narrow_total = 0;
        let mut wide_total = 0;
        for seed in 0..10 {
            let narrow = DependencyGenerator::new(&graph, &menus, 3)
                .with_profile(profile(1, 1, 1.0, 0.0))
                .generate(&mut StdRng::seed_from_u64(seed));
            let wide = DependencyGenerator::new(&graph, &menus, 3)
                .with_profile(profile(6, 10, 8.0, 1.0))
                .generate(&mut StdRng::seed_from_u64(seed));
            assert!(analyzer::is_acyclic(&resolver_graph(&wide)), "seed {}", seed);
            narrow_total += narrow.total_dependencies();
            wide_total += wide.total_dependencies();
        }
        assert!(wide_total > narrow_total, "{} <= {}", wide_total, narrow_total);
    }

    #[test]
    fn test_empty_menus_are_skipped() {
        let (graph, mut menus) = fixture(3, 2);
        menus.get_mut("m1").unwrap().settings.clear();
        let mut rng = StdRng::seed_from_u64(9);
        let deps = DependencyGenerator::new(&graph, &menus, 3).generate(&mut rng);
        for (dependent, list) in &deps.dependencies {
            assert!(!dependent.starts_with("m1_"));
            for d in list {
                assert!(d.referenced_ids().iter().all(|id| !id.starts_with("m1_")));
            }
        }
    }
}
