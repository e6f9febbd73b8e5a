//! Grid collapse: constrained random assignment of categories to grid cells.
//!
//! Starts by collapsing the centre cell, then repeatedly collapses the
//! uncollapsed cell with the lowest entropy and narrows its neighbours to
//! the collapsed category's allowed connections. Stops on full collapse, on
//! the first contradiction, or after `2 × width × height` iterations. A
//! partially collapsed grid is a normal result.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::config::WfcRules;

pub type Position = (i32, i32);

const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub position: Position,
    pub possible: BTreeSet<String>,
    pub collapsed: bool,
    pub state: Option<String>,
    /// Remaining possibilities; `usize::MAX` until the grid is initialized.
    pub entropy: usize,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            possible: BTreeSet::new(),
            collapsed: false,
            state: None,
            entropy: usize::MAX,
        }
    }

    /// Pick one remaining category uniformly. `None` if nothing is left.
    fn collapse(&mut self, rng: &mut impl Rng) -> Option<String> {
        if self.possible.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..self.possible.len());
        let state = self.possible.iter().nth(pick)?.clone();
        self.possible = BTreeSet::from([state.clone()]);
        self.state = Some(state.clone());
        self.collapsed = true;
        self.entropy = 0;
        Some(state)
    }

    fn constrain(&mut self, allowed: &BTreeSet<String>) {
        self.possible.retain(|c| allowed.contains(c));
        self.entropy = self.possible.len();
    }

    /// Uncollapsed with nothing left to choose.
    pub fn is_contradiction(&self) -> bool {
        !self.collapsed && self.entropy == 0
    }
}

/// Fixed-size grid keyed by `(x, y)`; iteration is x-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: BTreeMap<Position, Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = BTreeMap::new();
        for x in 0..width as i32 {
            for y in 0..height as i32 {
                cells.insert((x, y), Cell::new((x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// In-grid neighbour positions in N, E, S, W order.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| (pos.0 + dx, pos.1 + dy))
            .filter(|p| self.cells.contains_key(p))
            .collect()
    }

    /// Uncollapsed cell with strictly lowest positive entropy, first in iteration order on ties.
    pub fn lowest_entropy_cell(&self) -> Option<Position> {
        let mut best: Option<(usize, Position)> = None;
        for cell in self.cells.values() {
            if cell.collapsed || cell.entropy == 0 {
                continue;
            }
            if best.map_or(true, |(e, _)| cell.entropy < e) {
                best = Some((cell.entropy, cell.position));
            }
        }
        best.map(|(_, p)| p)
    }

    pub fn is_complete(&self) -> bool {
        self.cells.values().all(|c| c.collapsed)
    }

    pub fn has_contradiction(&self) -> bool {
        self.cells.values().any(Cell::is_contradiction)
    }

    pub fn collapsed_count(&self) -> usize {
        self.cells.values().filter(|c| c.collapsed).count()
    }

    /// Collapsed cells as `(position, category)` in iteration order.
    pub fn collapsed_cells(&self) -> impl Iterator<Item = (Position, &str)> + '_ {
        self.cells
            .values()
            .filter_map(|c| c.state.as_deref().filter(|_| c.collapsed).map(|s| (c.position, s)))
    }
}

/// Runs the collapse over a grid of the configured size.
pub struct WfcGenerator<'a> {
    rules: &'a WfcRules,
    width: usize,
    height: usize,
}

impl<'a> WfcGenerator<'a> {
    pub fn new(rules: &'a WfcRules, width: usize, height: usize) -> Self {
        Self {
            rules,
            width,
            height,
        }
    }

    pub fn generate(&self, rng: &mut impl Rng) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        if grid.cells.is_empty() {
            return grid;
        }
        self.initialize(&mut grid);

        let center = ((self.width / 2) as i32, (self.height / 2) as i32);
        if let Some(cell) = grid.cells.get_mut(&center) {
            cell.collapse(rng);
        }
        self.propagate(&mut grid, center);

        let max_iterations = self.width * self.height * 2;
        let mut iterations = 0;
        while !grid.is_complete() && iterations < max_iterations {
            let Some(pos) = grid.lowest_entropy_cell() else {
                break;
            };
            if grid.has_contradiction() {
                break;
            }
            if let Some(cell) = grid.cells.get_mut(&pos) {
                cell.collapse(rng);
            }
            self.propagate(&mut grid, pos);
            iterations += 1;
        }

        log::debug!(
            "grid collapse: {}/{} cells after {} iterations (contradiction: {})",
            grid.collapsed_count(),
            grid.cells.len(),
            iterations,
            grid.has_contradiction()
        );
        grid
    }

    fn initialize(&self, grid: &mut Grid) {
        let all: BTreeSet<String> = self.rules.keys().cloned().collect();
        for cell in grid.cells.values_mut() {
            cell.possible = all.clone();
            cell.entropy = all.len();
        }
    }

    /// Breadth-first constraint spread from a collapsed cell.
    fn propagate(&self, grid: &mut Grid, start: Position) {
        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::new();

        while let Some(pos) = queue.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            let Some(state) = grid
                .get(pos)
                .filter(|c| c.collapsed)
                .and_then(|c| c.state.clone())
            else {
                continue;
            };
            let allowed: BTreeSet<String> = self
                .rules
                .get(&state)
                .map(|r| r.connections.iter().cloned().collect())
                .unwrap_or_default();

            for npos in grid.neighbors(pos) {
                let Some(neighbor) = grid.cells.get_mut(&npos) else {
                    continue;
                };
                if neighbor.collapsed {
                    continue;
                }
                let before = neighbor.entropy;
                neighbor.constrain(&allowed);
                if neighbor.entropy < before && neighbor.entropy > 0 {
                    queue.push_back(npos);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRule;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rules(table: &[(&str, &[&str])]) -> WfcRules {
        table.iter()
            .map(|(cat, conns)| {
                (
                    cat.to_string(),
                    CategoryRule {
                        connections: conns.iter().map(|s| s.to_string()).collect(),
                        requires: Vec::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_new_grid_uses_sentinel_entropy() {
        let grid = Grid::new(2, 3);
        assert_eq!(grid.cells.len(), 6);
        assert!(grid.cells.values().all(|c| c.entropy == usize::MAX));
        assert_eq!(grid.neighbors((0, 0)), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_full_collapse_with_permissive_rules() {
        let r = rules(&[("a", &["a", "b"]), ("b", &["a", "b"])]);
        let mut rng = StdRng::seed_from_u64(7);
        let grid = WfcGenerator::new(&r, 4, 4).generate(&mut rng);
        assert!(grid.is_complete());
        for cell in grid.cells.values() {
            assert!(cell.collapsed);
            assert_eq!(cell.possible.len(), 1);
            assert_eq!(cell.entropy, 0);
        }
    }

    #[test]
    fn test_neighbors_respect_rules() {
        // a may only touch b and b may only touch a: a checkerboard.
        let r = rules(&[("a", &["b"]), ("b", &["a"])]);
        let mut rng = StdRng::seed_from_u64(3);
        let grid = WfcGenerator::new(&r, 3, 3).generate(&mut rng);
        assert!(grid.is_complete());
        for (pos, cat) in grid.collapsed_cells() {
            for n in grid.neighbors(pos) {
                let other = grid.get(n).and_then(|c| c.state.as_deref()).unwrap();
                assert_ne!(cat, other);
            }
        }
    }

    #[test]
    fn test_contradiction_stops_early() {
        // Nothing may sit next to anything.
        let r = rules(&[("a", &[]), ("b", &[])]);
        let mut rng = StdRng::seed_from_u64(1);
        let grid = WfcGenerator::new(&r, 3, 3).generate(&mut rng);
        assert_eq!(grid.collapsed_count(), 1);
        assert!(grid.has_contradiction());
    }

    #[test]
    fn test_same_seed_same_grid() {
        let r = rules(&[("a", &["a", "b", "c"]), ("b", &["a", "c"]), ("c", &["a", "b"])]);
        let g1 = WfcGenerator::new(&r, 5, 5).generate(&mut StdRng::seed_from_u64(42));
        let g2 = WfcGenerator::new(&r, 5, 5).generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(g1, g2);
    }
}
