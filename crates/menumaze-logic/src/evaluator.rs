//! Cached dependency evaluation with blocking reasons.
//!
//! Results stay valid until a setting changes; [`DependencyEvaluator::invalidate`]
//! marks that setting and everything that transitively depends on it dirty.

use std::collections::{BTreeMap, BTreeSet};

use crate::content::ContentGraph;

/// Outcome of evaluating one setting's dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub setting_id: String,
    pub can_enable: bool,
    /// Description of each unmet dependency.
    pub blocking: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct DependencyEvaluator {
    cache: BTreeMap<String, Evaluation>,
    dirty: BTreeSet<String>,
}

impl DependencyEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, graph: &ContentGraph, setting_id: &str) -> Evaluation {
        if !self.dirty.contains(setting_id) {
            if let Some(hit) = self.cache.get(setting_id) {
                return hit.clone();
            }
        }
        let result = evaluate_setting(graph, setting_id);
        self.cache.insert(setting_id.to_string(), result.clone());
        self.dirty.remove(setting_id);
        result
    }

    pub fn evaluate_all(&mut self, graph: &ContentGraph) -> BTreeMap<String, Evaluation> {
        graph
            .settings
            .keys()
            .map(|id| (id.clone(), self.evaluate(graph, id)))
            .collect()
    }

    /// Mark `setting_id` and all of its transitive dependents dirty.
    pub fn invalidate(&mut self, graph: &ContentGraph, setting_id: &str) {
        let mut stack = vec![setting_id.to_string()];
        while let Some(id) = stack.pop() {
            if !self.dirty.insert(id.clone()) {
                continue;
            }
            stack.extend(graph.resolver.dependents_of(&id));
        }
    }

    pub fn is_cached(&self, setting_id: &str) -> bool {
        self.cache.contains_key(setting_id) && !self.dirty.contains(setting_id)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.dirty.clear();
    }
}

fn evaluate_setting(graph: &ContentGraph, setting_id: &str) -> Evaluation {
    if graph.get_setting(setting_id).is_none() {
        return Evaluation {
            setting_id: setting_id.to_string(),
            can_enable: false,
            blocking: Vec::new(),
            reason: "Setting not found".to_string(),
        };
    }
    let blocking: Vec<String> = graph
        .resolver
        .get(setting_id)
        .iter()
        .filter(|d| !d.evaluate(graph))
        .map(|d| d.to_string())
        .collect();
    let reason = if blocking.is_empty() {
        String::new()
    } else {
        format!("Blocked by: {}", blocking.join(", "))
    };
    Evaluation {
        setting_id: setting_id.to_string(),
        can_enable: blocking.is_empty(),
        blocking,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Dependency;
    use crate::menu::MenuNode;
    use crate::types::{Setting, SettingState, SettingType};

    fn chain() -> ContentGraph {
        let mut g = ContentGraph::new();
        let settings = ["a", "b", "c"]
            .iter()
            .map(|id| Setting::new(*id, SettingType::Boolean, SettingState::Disabled, *id))
            .collect();
        g.add_menu(MenuNode::new("m", "general"), settings);
        g.resolver.add_dependency("b", Dependency::enabled("a"));
        g.resolver.add_dependency("c", Dependency::enabled("b"));
        g
    }

    #[test]
    fn test_blocking_reasons() {
        let g = chain();
        let mut ev = DependencyEvaluator::new();
        let r = ev.evaluate(&g, "b");
        assert!(!r.can_enable);
        assert_eq!(r.blocking, vec!["a must be enabled".to_string()]);
        assert_eq!(r.reason, "Blocked by: a must be enabled");
        assert!(ev.evaluate(&g, "a").can_enable);
        assert_eq!(ev.evaluate(&g, "zzz").reason, "Setting not found");
    }

    #[test]
    fn test_cache_and_transitive_invalidation() {
        let mut g = chain();
        let mut ev = DependencyEvaluator::new();
        assert_eq!(ev.evaluate_all(&g).len(), 3);
        assert!(ev.is_cached("c"));

        g.settings.get_mut("a").unwrap().state = SettingState::Enabled;
        // stale until invalidated
        assert!(!ev.evaluate(&g, "b").can_enable);

        ev.invalidate(&g, "a");
        assert!(!ev.is_cached("b"));
        assert!(!ev.is_cached("c"));
        assert!(ev.evaluate(&g, "b").can_enable);
    }
}
