//! Setting dependencies and the resolver that stores them.
//!
//! A dependency always names settings by id. The resolver maps each
//! dependent setting to the ordered list of dependencies that must all
//! hold before it can be enabled.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::graph::DiGraph;
use crate::types::{Setting, SettingState};

/// Anything that can resolve a setting id to a setting.
pub trait SettingLookup {
    fn lookup_setting(&self, id: &str) -> Option<&Setting>;
}

impl SettingLookup for BTreeMap<String, Setting> {
    fn lookup_setting(&self, id: &str) -> Option<&Setting> {
        self.get(id)
    }
}

/// Comparison operator for value dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }

    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            other => Err(format!("Invalid operator: {}", other)),
        }
    }
}

/// One unlock requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dependency {
    /// `setting_id` must be in `required_state`.
    Simple {
        setting_id: String,
        required_state: SettingState,
    },
    /// `setting_a <op> setting_b` must hold on their current values.
    Value {
        setting_a: String,
        op: CompareOp,
        setting_b: String,
    },
}

impl Dependency {
    /// Shorthand for the common "must be enabled" requirement.
    pub fn enabled(setting_id: impl Into<String>) -> Self {
        Dependency::Simple {
            setting_id: setting_id.into(),
            required_state: SettingState::Enabled,
        }
    }

    pub fn value(setting_a: impl Into<String>, op: CompareOp, setting_b: impl Into<String>) -> Self {
        Dependency::Value {
            setting_a: setting_a.into(),
            op,
            setting_b: setting_b.into(),
        }
    }

    /// Whether the dependency currently holds. Missing settings never satisfy it.
    pub fn evaluate(&self, lookup: &impl SettingLookup) -> bool {
        match self {
            Dependency::Simple {
                setting_id,
                required_state,
            } => lookup
                .lookup_setting(setting_id)
                .is_some_and(|s| s.state == *required_state),
            Dependency::Value {
                setting_a,
                op,
                setting_b,
            } => {
                let (Some(a), Some(b)) = (lookup.lookup_setting(setting_a), lookup.lookup_setting(setting_b))
                else {
                    return false;
                };
                a.value.compare(&b.value).is_some_and(|ord| op.holds(ord))
            }
        }
    }

    /// Ids of the settings this dependency reads.
    pub fn referenced_ids(&self) -> Vec<&str> {
        match self {
            Dependency::Simple { setting_id, .. } => vec![setting_id.as_str()],
            Dependency::Value {
                setting_a,
                setting_b,
                ..
            } => vec![setting_a.as_str(), setting_b.as_str()],
        }
    }

    pub fn references(&self, id: &str) -> bool {
        self.referenced_ids().contains(&id)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Simple {
                setting_id,
                required_state,
            } => write!(f, "{} must be {}", setting_id, required_state),
            Dependency::Value {
                setting_a,
                op,
                setting_b,
            } => write!(f, "{} {} {}", setting_a, op.symbol(), setting_b),
        }
    }
}

/// Dependent-setting id → dependencies (AND semantics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyResolver {
    pub dependencies: BTreeMap<String, Vec<Dependency>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dependency(&mut self, setting_id: impl Into<String>, dependency: Dependency) {
        self.dependencies
            .entry(setting_id.into())
            .or_default()
            .push(dependency);
    }

    pub fn get(&self, setting_id: &str) -> &[Dependency] {
        self.dependencies
            .get(setting_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_dependencies(&self, setting_id: &str) -> bool {
        !self.get(setting_id).is_empty()
    }

    /// Drop every dependency of `setting_id`. Returns how many were removed.
    pub fn clear(&mut self, setting_id: &str) -> usize {
        self.dependencies
            .remove(setting_id)
            .map(|deps| deps.len())
            .unwrap_or(0)
    }

    /// All dependencies of `setting_id` hold.
    pub fn can_enable(&self, setting_id: &str, lookup: &impl SettingLookup) -> bool {
        self.get(setting_id).iter().all(|d| d.evaluate(lookup))
    }

    /// `can_enable` for every setting that has dependencies.
    pub fn resolve_all(&self, lookup: &impl SettingLookup) -> BTreeMap<String, bool> {
        self.dependencies
            .keys()
            .map(|id| (id.clone(), self.can_enable(id, lookup)))
            .collect()
    }

    pub fn total_dependencies(&self) -> usize {
        self.dependencies.values().map(Vec::len).sum()
    }

    /// Settings that list `setting_id` in any dependency.
    pub fn dependents_of(&self, setting_id: &str) -> BTreeSet<String> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d.references(setting_id)))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Directed graph with an edge `prerequisite -> dependent` for every
    /// referenced id. `nodes` are added first so isolated settings appear.
    pub fn to_graph<'a>(&self, nodes: impl IntoIterator<Item = &'a str>) -> DiGraph {
        let mut graph = DiGraph::new();
        for id in nodes {
            graph.add_node(id);
        }
        for (dependent, deps) in &self.dependencies {
            for dep in deps {
                for prereq in dep.referenced_ids() {
                    graph.add_edge(prereq, dependent);
                }
            }
        }
        graph
    }
}
