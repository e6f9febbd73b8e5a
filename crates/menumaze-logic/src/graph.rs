//! Insertion-ordered directed graph over string ids.
//!
//! Both the menu connectivity graph and the setting dependency graph use
//! this type. Node and edge iteration follow insertion order so every
//! "first found" tie-break is reproducible for a given seed.

use std::collections::HashMap;

/// A directed graph with string node ids and no parallel edges.
#[derive(Debug, Clone, Default)]
pub struct DiGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// Removed nodes keep their slot so indices stay stable.
    alive: Vec<bool>,
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if absent; returns its index either way.
    pub fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            if !self.alive[idx] {
                self.alive[idx] = true;
            }
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        self.alive.push(true);
        self.succ.push(Vec::new());
        self.pred.push(Vec::new());
        idx
    }

    /// Add `from -> to`, creating either node as needed. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        if !self.succ[a].contains(&b) {
            self.succ[a].push(b);
            self.pred[b].push(a);
        }
    }

    /// Remove `from -> to`. Returns whether the edge existed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(a), Some(b)) = (self.live_index(from), self.live_index(to)) else {
            return false;
        };
        let before = self.succ[a].len();
        self.succ[a].retain(|&n| n != b);
        self.pred[b].retain(|&n| n != a);
        self.succ[a].len() != before
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) {
        let Some(idx) = self.live_index(id) else {
            return;
        };
        for s in std::mem::take(&mut self.succ[idx]) {
            self.pred[s].retain(|&n| n != idx);
        }
        for p in std::mem::take(&mut self.pred[idx]) {
            self.succ[p].retain(|&n| n != idx);
        }
        self.alive[idx] = false;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.live_index(id).is_some()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.live_index(from), self.live_index(to)) {
            (Some(a), Some(b)) => self.succ[a].contains(&b),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn edge_count(&self) -> usize {
        self.live_indices().map(|i| self.succ[i].len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.live_indices().map(move |i| self.ids[i].as_str())
    }

    /// All edges as `(from, to)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.live_indices().flat_map(move |a| {
            self.succ[a]
                .iter()
                .map(move |&b| (self.ids[a].as_str(), self.ids[b].as_str()))
        })
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.live_index(id)
            .map(|i| self.succ[i].iter().map(|&n| self.ids[n].as_str()).collect())
            .unwrap_or_default()
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.live_index(id)
            .map(|i| self.pred[i].iter().map(|&n| self.ids[n].as_str()).collect())
            .unwrap_or_default()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.live_index(id).map(|i| self.pred[i].len()).unwrap_or(0)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.live_index(id).map(|i| self.succ[i].len()).unwrap_or(0)
    }

    // ── index-level access for the analyzer ────────────────────────────

    pub(crate) fn live_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied().filter(|&i| self.alive[i])
    }

    pub(crate) fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ids.len()).filter(move |&i| self.alive[i])
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn id_at(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub(crate) fn succ_at(&self, idx: usize) -> &[usize] {
        &self.succ[idx]
    }

    pub(crate) fn pred_at(&self, idx: usize) -> &[usize] {
        &self.pred[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut g = DiGraph::new();
        g.add_edge("c", "a");
        g.add_edge("b", "a");
        let nodes: Vec<_> = g.nodes().collect();
        assert_eq!(nodes, vec!["c", "a", "b"]);
        assert_eq!(g.predecessors("a"), vec!["c", "b"]);
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut g = DiGraph::new();
        g.add_edge("a", "b");
        g.add_edge("a", "b");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.in_degree("b"), 1);
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let mut g = DiGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.remove_node("b");
        assert!(!g.contains("b"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.out_degree("a"), 0);
    }

    #[test]
    fn test_remove_edge() {
        let mut g = DiGraph::new();
        g.add_edge("a", "b");
        assert!(g.remove_edge("a", "b"));
        assert!(!g.remove_edge("a", "b"));
        assert!(!g.has_edge("a", "b"));
        assert!(g.contains("a") && g.contains("b"));
    }

    #[test]
    fn test_readd_removed_node() {
        let mut g = DiGraph::new();
        g.add_node("x");
        g.remove_node("x");
        assert!(g.is_empty());
        g.add_node("x");
        assert_eq!(g.node_count(), 1);
    }
}
