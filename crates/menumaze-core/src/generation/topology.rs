//! Collapsed grid → menu connectivity graph.

use menumaze_logic::analyzer;
use menumaze_logic::DiGraph;
use std::collections::{BTreeMap, BTreeSet};

use super::wfc::{Grid, Position};
use crate::error::ValidationFailure;

/// Smallest menu graph worth playing.
pub const MIN_NODES: usize = 3;

pub fn node_id(category: &str, pos: Position) -> String {
    format!("{}_{}_{}", category, pos.0, pos.1)
}

/// Menu graph plus the category of each node.
#[derive(Debug, Clone, Default)]
pub struct TopologyConverter {
    pub graph: DiGraph,
    categories: BTreeMap<String, String>,
}

impl TopologyConverter {
    /// One node per collapsed cell, edges both ways between adjacent collapsed cells.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut graph = DiGraph::new();
        let mut categories = BTreeMap::new();

        for (pos, category) in grid.collapsed_cells() {
            let id = node_id(category, pos);
            graph.add_node(&id);
            categories.insert(id, category.to_string());
        }
        for (pos, category) in grid.collapsed_cells() {
            let from = node_id(category, pos);
            for npos in grid.neighbors(pos) {
                let Some(neighbor) = grid.get(npos) else {
                    continue;
                };
                if let (true, Some(ncat)) = (neighbor.collapsed, neighbor.state.as_deref()) {
                    graph.add_edge(&from, &node_id(ncat, npos));
                }
            }
        }
        Self { graph, categories }
    }

    pub fn category_of(&self, node: &str) -> Option<&str> {
        self.categories.get(node).map(String::as_str)
    }

    /// Distinct categories among the remaining nodes.
    pub fn category_count(&self) -> usize {
        self.graph
            .nodes()
            .filter_map(|n| self.category_of(n))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Reject graphs that are empty, tiny, split, or have a short critical path.
    pub fn validate_graph(&self, min_path_length: usize) -> Result<(), ValidationFailure> {
        let nodes = self.graph.node_count();
        if nodes == 0 {
            return Err(ValidationFailure::Empty);
        }
        if nodes < MIN_NODES {
            return Err(ValidationFailure::TooFewNodes { found: nodes });
        }
        let components = analyzer::weakly_connected_components(&self.graph).len();
        if components != 1 {
            return Err(ValidationFailure::Disconnected { components });
        }
        let path = self.critical_path(min_path_length);
        if path.len() < min_path_length {
            return Err(ValidationFailure::CriticalPathTooShort {
                found: path.len(),
                required: min_path_length,
            });
        }
        Ok(())
    }

    /// Keep only what the best start node reaches, or the largest weak
    /// component when there is no start node.
    pub fn prune_dead_ends(&mut self) -> usize {
        if self.graph.is_empty() {
            return 0;
        }
        let starts = analyzer::start_nodes(&self.graph);
        let keep: BTreeSet<String> = if starts.is_empty() {
            let components = analyzer::weakly_connected_components(&self.graph);
            if components.len() <= 1 {
                return 0;
            }
            // first of the largest wins ties
            let mut largest: &[String] = &[];
            for c in &components {
                if c.len() > largest.len() {
                    largest = c;
                }
            }
            largest.iter().cloned().collect()
        } else {
            let mut best = BTreeSet::new();
            for s in &starts {
                let reach = analyzer::reachable_from(&self.graph, s);
                if reach.len() > best.len() {
                    best = reach;
                }
            }
            best
        };

        let doomed: Vec<String> = self
            .graph
            .nodes()
            .filter(|n| !keep.contains(*n))
            .map(str::to_string)
            .collect();
        for id in &doomed {
            self.graph.remove_node(id);
            self.categories.remove(id);
        }
        doomed.len()
    }

    pub fn critical_path(&self, min_path_length: usize) -> Vec<String> {
        analyzer::critical_path(&self.graph, min_path_length)
    }
}
