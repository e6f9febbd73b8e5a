//! Stateless queries over a [`DiGraph`].
//!
//! This is the one place that defines what a "critical path" is. The
//! topology converter, the dependency generator and the difficulty
//! analyzer all call into here so they agree on which nodes are critical.

use crate::graph::DiGraph;
use std::collections::{BTreeSet, VecDeque};

/// Nodes with zero in-degree, in insertion order.
pub fn start_nodes(graph: &DiGraph) -> Vec<String> {
    graph
        .nodes()
        .filter(|n| graph.in_degree(n) == 0)
        .map(str::to_string)
        .collect()
}

/// Nodes with zero out-degree, in insertion order.
pub fn end_nodes(graph: &DiGraph) -> Vec<String> {
    graph
        .nodes()
        .filter(|n| graph.out_degree(n) == 0)
        .map(str::to_string)
        .collect()
}

/// Every node reachable from `start`, including `start` itself.
/// Empty if `start` is not in the graph.
pub fn reachable_from(graph: &DiGraph, start: &str) -> BTreeSet<String> {
    let Some(s) = graph.live_index(start) else {
        return BTreeSet::new();
    };
    collect(graph, bfs(graph, s, Direction::Forward))
}

/// Every node that can reach `target`, excluding `target` unless it sits on a cycle.
pub fn ancestors(graph: &DiGraph, target: &str) -> BTreeSet<String> {
    let Some(t) = graph.live_index(target) else {
        return BTreeSet::new();
    };
    let seen = bfs(graph, t, Direction::Backward);
    let mut out = collect(graph, seen);
    if !on_cycle(graph, t) {
        out.remove(target);
    }
    out
}

pub fn has_path(graph: &DiGraph, from: &str, to: &str) -> bool {
    match (graph.live_index(from), graph.live_index(to)) {
        (Some(a), Some(b)) => a == b || bfs(graph, a, Direction::Forward)[b],
        _ => false,
    }
}

/// BFS shortest path from `from` to `to`, inclusive of both ends.
pub fn shortest_path(graph: &DiGraph, from: &str, to: &str) -> Option<Vec<String>> {
    let a = graph.live_index(from)?;
    let b = graph.live_index(to)?;
    if a == b {
        return Some(vec![from.to_string()]);
    }

    let mut parent: Vec<Option<usize>> = vec![None; graph.slot_count()];
    let mut visited = vec![false; graph.slot_count()];
    let mut queue = VecDeque::new();
    visited[a] = true;
    queue.push_back(a);

    while let Some(current) = queue.pop_front() {
        for &next in graph.succ_at(current) {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            parent[next] = Some(current);
            if next == b {
                let mut path = vec![b];
                let mut cursor = b;
                while let Some(p) = parent[cursor] {
                    path.push(p);
                    cursor = p;
                }
                path.reverse();
                return Some(path.into_iter().map(|i| graph.id_at(i).to_string()).collect());
            }
            queue.push_back(next);
        }
    }
    None
}

/// Longest of the shortest paths between any start node and any end node.
///
/// Ties keep the first pair found in (start, end) iteration order. Empty
/// when the graph has no start or no end nodes.
pub fn find_critical_path(graph: &DiGraph) -> Vec<String> {
    let starts = start_nodes(graph);
    let ends = end_nodes(graph);
    let mut longest: Vec<String> = Vec::new();
    for start in &starts {
        for end in &ends {
            if let Some(path) = shortest_path(graph, start, end) {
                if path.len() > longest.len() {
                    longest = path;
                }
            }
        }
    }
    longest
}

/// Critical path with a fallback for graphs without start or end nodes.
///
/// Grid-derived menu graphs are bidirectional, so every node has in- and
/// out-edges. In that case the first `min_len` nodes in iteration order
/// stand in for the critical path (empty if the graph is smaller).
pub fn critical_path(graph: &DiGraph, min_len: usize) -> Vec<String> {
    if start_nodes(graph).is_empty() || end_nodes(graph).is_empty() {
        if graph.node_count() < min_len {
            return Vec::new();
        }
        return graph.nodes().take(min_len).map(str::to_string).collect();
    }
    find_critical_path(graph)
}

/// Weakly connected components, ordered by their first node.
pub fn weakly_connected_components(graph: &DiGraph) -> Vec<Vec<String>> {
    let mut seen = vec![false; graph.slot_count()];
    let mut components = Vec::new();
    for start in graph.live_indices() {
        if seen[start] {
            continue;
        }
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        while let Some(n) = queue.pop_front() {
            members.push(n);
            for &m in graph.succ_at(n).iter().chain(graph.pred_at(n)) {
                if !seen[m] {
                    seen[m] = true;
                    queue.push_back(m);
                }
            }
        }
        members.sort_unstable();
        components.push(members.into_iter().map(|i| graph.id_at(i).to_string()).collect());
    }
    components
}

/// An empty graph is not considered connected.
pub fn is_weakly_connected(graph: &DiGraph) -> bool {
    weakly_connected_components(graph).len() == 1
}

/// Strongly connected components (iterative Tarjan).
pub fn strongly_connected_components(graph: &DiGraph) -> Vec<Vec<String>> {
    const UNVISITED: usize = usize::MAX;
    let n = graph.slot_count();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for root in graph.live_indices() {
        if index[root] != UNVISITED {
            continue;
        }
        // (node, position in its successor list)
        let mut work: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = work.last_mut() {
            let node = frame.0;
            let succ = graph.succ_at(node);
            if frame.1 < succ.len() {
                let next = succ[frame.1];
                frame.1 += 1;
                if index[next] == UNVISITED {
                    index[next] = next_index;
                    lowlink[next] = next_index;
                    next_index += 1;
                    stack.push(next);
                    on_stack[next] = true;
                    work.push((next, 0));
                } else if on_stack[next] {
                    lowlink[node] = lowlink[node].min(index[next]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[node]);
            }
            if lowlink[node] == index[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(graph.id_at(member).to_string());
                    if member == node {
                        break;
                    }
                }
                component.sort();
                components.push(component);
            }
        }
    }
    components
}

/// One simple cycle that stays inside `component`, starting at its first member.
pub fn find_cycle_in(graph: &DiGraph, component: &[String]) -> Option<Vec<String>> {
    let members: BTreeSet<usize> = component
        .iter()
        .filter_map(|id| graph.live_index(id))
        .collect();
    let &start = members.iter().next()?;

    // DFS from start looking for an edge back to start.
    let mut parent: Vec<Option<usize>> = vec![None; graph.slot_count()];
    let mut visited = vec![false; graph.slot_count()];
    let mut stack = vec![start];
    visited[start] = true;
    while let Some(node) = stack.pop() {
        for &next in graph.succ_at(node) {
            if !members.contains(&next) {
                continue;
            }
            if next == start {
                let mut cycle = vec![node];
                let mut cursor = node;
                while let Some(p) = parent[cursor] {
                    cycle.push(p);
                    cursor = p;
                }
                cycle.reverse();
                return Some(cycle.into_iter().map(|i| graph.id_at(i).to_string()).collect());
            }
            if !visited[next] {
                visited[next] = true;
                parent[next] = Some(node);
                stack.push(next);
            }
        }
    }
    None
}

pub fn is_acyclic(graph: &DiGraph) -> bool {
    let has_self_loop = graph.nodes().any(|n| graph.has_edge(n, n));
    !has_self_loop && strongly_connected_components(graph).iter().all(|c| c.len() == 1)
}

/// Number of edges on the longest path through the given node subset.
/// Returns `None` when the subgraph contains a cycle.
pub fn dag_longest_path_length(graph: &DiGraph, nodes: &[String]) -> Option<usize> {
    let members: Vec<usize> = nodes.iter().filter_map(|id| graph.live_index(id)).collect();
    let mut in_set = vec![false; graph.slot_count()];
    for &m in &members {
        in_set[m] = true;
    }

    let mut indegree = vec![0usize; graph.slot_count()];
    for &m in &members {
        indegree[m] = graph.pred_at(m).iter().filter(|&&p| in_set[p]).count();
    }
    let mut queue: VecDeque<usize> = members.iter().copied().filter(|&m| indegree[m] == 0).collect();
    let mut depth = vec![0usize; graph.slot_count()];
    let mut processed = 0usize;
    let mut longest = 0usize;

    while let Some(node) = queue.pop_front() {
        processed += 1;
        longest = longest.max(depth[node]);
        for &next in graph.succ_at(node) {
            if !in_set[next] {
                continue;
            }
            depth[next] = depth[next].max(depth[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    (processed == members.len()).then_some(longest)
}

// ── internals ───────────────────────────────────────────────────────────

enum Direction {
    Forward,
    Backward,
}

fn bfs(graph: &DiGraph, start: usize, direction: Direction) -> Vec<bool> {
    let mut seen = vec![false; graph.slot_count()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(n) = queue.pop_front() {
        let next = match direction {
            Direction::Forward => graph.succ_at(n),
            Direction::Backward => graph.pred_at(n),
        };
        for &m in next {
            if !seen[m] {
                seen[m] = true;
                queue.push_back(m);
            }
        }
    }
    seen
}

fn collect(graph: &DiGraph, seen: Vec<bool>) -> BTreeSet<String> {
    seen.into_iter()
        .enumerate()
        .filter(|(_, s)| *s)
        .map(|(i, _)| graph.id_at(i).to_string())
        .collect()
}

/// Whether node `idx` can reach itself through at least one edge.
fn on_cycle(graph: &DiGraph, idx: usize) -> bool {
    let reach = bfs(graph, idx, Direction::Forward);
    graph.pred_at(idx).iter().any(|&p| reach[p])
}
