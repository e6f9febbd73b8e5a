//! The content graph: an arena of menus and settings keyed by id, plus the
//! dependency resolver that links settings together.
//!
//! This is the only structure the session layer touches. Reads go through
//! `get_menu` / `get_setting`; value changes go through [`ContentGraph::update_setting`],
//! which re-checks bounds and dependencies before committing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dependency::{Dependency, DependencyResolver, SettingLookup};
use crate::graph::DiGraph;
use crate::menu::MenuNode;
use crate::types::{Setting, SettingState, SettingType, SettingValue};

/// Why a consumer mutation was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    UnknownSetting(String),
    /// Dependencies are unmet; one human-readable line per unmet dependency.
    Blocked {
        setting_id: String,
        reasons: Vec<String>,
    },
    TypeMismatch {
        setting_id: String,
        expected: SettingType,
        found: SettingType,
    },
    OutOfBounds {
        setting_id: String,
        value: f64,
    },
    InvalidTransition {
        setting_id: String,
        from: SettingState,
        to: SettingState,
    },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::UnknownSetting(id) => write!(f, "unknown setting '{}'", id),
            UpdateError::Blocked { setting_id, reasons } => {
                write!(f, "{} is blocked: {}", setting_id, reasons.join(", "))
            }
            UpdateError::TypeMismatch {
                setting_id,
                expected,
                found,
            } => write!(
                f,
                "{} expects a {:?} value, got {:?}",
                setting_id, expected, found
            ),
            UpdateError::OutOfBounds { setting_id, value } => {
                write!(f, "{} is out of bounds for {}", value, setting_id)
            }
            UpdateError::InvalidTransition { setting_id, from, to } => {
                write!(f, "{} cannot go from {} to {}", setting_id, from, to)
            }
        }
    }
}

impl std::error::Error for UpdateError {}

/// Menus, settings and the dependencies between settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentGraph {
    pub menus: BTreeMap<String, MenuNode>,
    pub settings: BTreeMap<String, Setting>,
    pub resolver: DependencyResolver,
    /// Menu the player starts in.
    pub start_menu: Option<String>,
    pub current_menu: Option<String>,
    /// Menus entered so far, in first-visit order.
    pub visited_menus: Vec<String>,
}

impl SettingLookup for ContentGraph {
    fn lookup_setting(&self, id: &str) -> Option<&Setting> {
        self.settings.get(id)
    }
}

impl ContentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a menu together with the settings it owns. The menu's setting
    /// list is extended with their ids in the given order.
    pub fn add_menu(&mut self, mut menu: MenuNode, settings: Vec<Setting>) {
        for setting in settings {
            if !menu.settings.contains(&setting.id) {
                menu.settings.push(setting.id.clone());
            }
            self.settings.insert(setting.id.clone(), setting);
        }
        self.menus.insert(menu.id.clone(), menu);
    }

    pub fn get_menu(&self, id: &str) -> Option<&MenuNode> {
        self.menus.get(id)
    }

    pub fn get_menu_mut(&mut self, id: &str) -> Option<&mut MenuNode> {
        self.menus.get_mut(id)
    }

    pub fn get_setting(&self, id: &str) -> Option<&Setting> {
        self.settings.get(id)
    }

    pub fn get_setting_mut(&mut self, id: &str) -> Option<&mut Setting> {
        self.settings.get_mut(id)
    }

    /// The menu that owns `setting_id`.
    pub fn menu_of(&self, setting_id: &str) -> Option<&MenuNode> {
        self.menus
            .values()
            .find(|m| m.settings.iter().any(|s| s == setting_id))
    }

    pub fn can_enable(&self, setting_id: &str) -> bool {
        self.resolver.can_enable(setting_id, self)
    }

    /// Change a setting's value after checking type, bounds and dependencies.
    pub fn update_setting(&mut self, setting_id: &str, value: SettingValue) -> Result<(), UpdateError> {
        let setting = self
            .settings
            .get(setting_id)
            .ok_or_else(|| UpdateError::UnknownSetting(setting_id.to_string()))?;

        if !setting.accepts_type(&value) {
            return Err(UpdateError::TypeMismatch {
                setting_id: setting_id.to_string(),
                expected: setting.setting_type,
                found: value.setting_type(),
            });
        }
        if !setting.within_bounds(&value) {
            return Err(UpdateError::OutOfBounds {
                setting_id: setting_id.to_string(),
                value: value.as_f64().unwrap_or_default(),
            });
        }
        if !self.can_enable(setting_id) {
            return Err(UpdateError::Blocked {
                setting_id: setting_id.to_string(),
                reasons: self.dependency_hints(setting_id),
            });
        }

        let value = match (setting.setting_type, value) {
            (SettingType::Float, SettingValue::Int(v)) => SettingValue::Float(v as f64),
            (_, v) => v,
        };
        if let Some(setting) = self.settings.get_mut(setting_id) {
            setting.value = value;
            setting.visit_count += 1;
        }
        Ok(())
    }

    /// Move a setting to a new state along an allowed transition. Entering
    /// ENABLED also requires every dependency to hold.
    pub fn transition(&mut self, setting_id: &str, to: SettingState) -> Result<(), UpdateError> {
        let from = self
            .settings
            .get(setting_id)
            .map(|s| s.state)
            .ok_or_else(|| UpdateError::UnknownSetting(setting_id.to_string()))?;

        if !from.can_transition(to) {
            return Err(UpdateError::InvalidTransition {
                setting_id: setting_id.to_string(),
                from,
                to,
            });
        }
        if to == SettingState::Enabled && !self.can_enable(setting_id) {
            return Err(UpdateError::Blocked {
                setting_id: setting_id.to_string(),
                reasons: self.dependency_hints(setting_id),
            });
        }
        if let Some(setting) = self.settings.get_mut(setting_id) {
            setting.state = to;
        }
        Ok(())
    }

    /// Enter a menu if its requirements hold. Records the visit.
    pub fn navigate_to(&mut self, menu_id: &str) -> bool {
        let accessible = match self.menus.get(menu_id) {
            Some(menu) => menu.is_accessible(&*self),
            None => false,
        };
        if !accessible {
            return false;
        }
        if let Some(menu) = self.menus.get_mut(menu_id) {
            menu.visited = true;
        }
        self.current_menu = Some(menu_id.to_string());
        if !self.visited_menus.iter().any(|m| m == menu_id) {
            self.visited_menus.push(menu_id.to_string());
        }
        true
    }

    /// Demote every LOCKED setting whose dependencies now hold to DISABLED.
    /// Returns the ids that changed.
    pub fn propagate_unlocks(&mut self) -> Vec<String> {
        let ready: Vec<String> = self
            .settings
            .values()
            .filter(|s| s.is_locked() && self.can_enable(&s.id))
            .map(|s| s.id.clone())
            .collect();
        for id in &ready {
            if let Some(setting) = self.settings.get_mut(id) {
                setting.state = SettingState::Disabled;
            }
        }
        ready
    }

    /// One line per unmet dependency of `setting_id`, using labels where known.
    pub fn dependency_hints(&self, setting_id: &str) -> Vec<String> {
        let label = |id: &str| {
            self.settings
                .get(id)
                .map(|s| s.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        self.resolver
            .get(setting_id)
            .iter()
            .filter(|d| !d.evaluate(self))
            .map(|d| match d {
                Dependency::Simple {
                    setting_id,
                    required_state,
                } => format!("Requires {} to be {}", label(setting_id), required_state),
                Dependency::Value {
                    setting_a,
                    op,
                    setting_b,
                } => format!(
                    "Requires {} {} {}",
                    label(setting_a),
                    op.symbol(),
                    label(setting_b)
                ),
            })
            .collect()
    }

    /// Menu connectivity graph built from each menu's `connections`.
    pub fn menu_graph(&self) -> DiGraph {
        let mut graph = DiGraph::new();
        for id in self.menus.keys() {
            graph.add_node(id);
        }
        for menu in self.menus.values() {
            for target in &menu.connections {
                graph.add_edge(&menu.id, target);
            }
        }
        graph
    }

    /// Setting dependency graph with edges `prerequisite -> dependent`.
    pub fn dependency_graph(&self) -> DiGraph {
        self.resolver
            .to_graph(self.settings.keys().map(String::as_str))
    }

    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    pub fn setting_count(&self) -> usize {
        self.settings.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.settings.values().filter(|s| s.is_enabled()).count()
    }

    pub fn locked_count(&self) -> usize {
        self.settings.values().filter(|s| s.is_locked()).count()
    }

    pub fn total_dependencies(&self) -> usize {
        self.resolver.total_dependencies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_menu_graph() -> ContentGraph {
        let mut g = ContentGraph::new();
        let mut audio = MenuNode::new("audio_0_0", "audio");
        audio.connect("video_1_0");
        g.add_menu(
            audio,
            vec![Setting::new("vol", SettingType::Integer, SettingState::Enabled, "Volume")
                .with_bounds(0.0, 100.0)],
        );
        let mut video = MenuNode::new("video_1_0", "video");
        video.require("vol", SettingState::Enabled);
        g.add_menu(
            video,
            vec![Setting::new("res", SettingType::Float, SettingState::Locked, "Resolution")],
        );
        g.resolver.add_dependency("res", Dependency::enabled("vol"));
        g.start_menu = Some("audio_0_0".into());
        g
    }

    #[test]
    fn test_update_checks_bounds_and_type() {
        let mut g = two_menu_graph();
        assert!(g.update_setting("vol", SettingValue::Int(40)).is_ok());
        assert_eq!(g.get_setting("vol").unwrap().visit_count, 1);
        assert!(matches!(
            g.update_setting("vol", SettingValue::Int(400)),
            Err(UpdateError::OutOfBounds { .. })
        ));
        assert!(matches!(
            g.update_setting("vol", SettingValue::Bool(true)),
            Err(UpdateError::TypeMismatch { .. })
        ));
        assert!(matches!(
            g.update_setting("nope", SettingValue::Int(1)),
            Err(UpdateError::UnknownSetting(_))
        ));
    }

    #[test]
    fn test_update_blocked_by_dependency() {
        let mut g = two_menu_graph();
        assert!(g.update_setting("res", SettingValue::Int(2)).is_ok());
        assert_eq!(g.get_setting("res").unwrap().value, SettingValue::Float(2.0));

        g.transition("vol", SettingState::Disabled).unwrap();
        match g.update_setting("res", SettingValue::Float(1.0)) {
            Err(UpdateError::Blocked { reasons, .. }) => {
                assert_eq!(reasons, vec!["Requires Volume to be enabled".to_string()]);
            }
            other => panic!("expected blocked, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_rules() {
        let mut g = two_menu_graph();
        assert!(matches!(
            g.transition("res", SettingState::Hidden),
            Err(UpdateError::InvalidTransition { .. })
        ));
        assert!(g.transition("res", SettingState::Enabled).is_ok());
    }

    #[test]
    fn test_navigation_respects_requirements() {
        let mut g = two_menu_graph();
        assert!(g.navigate_to("audio_0_0"));
        assert!(g.navigate_to("video_1_0"));
        assert!(g.navigate_to("audio_0_0"));
        assert_eq!(g.visited_menus, vec!["audio_0_0", "video_1_0"]);
        assert_eq!(g.current_menu.as_deref(), Some("audio_0_0"));

        g.transition("vol", SettingState::Disabled).unwrap();
        assert!(!g.navigate_to("video_1_0"));
        assert!(!g.navigate_to("missing"));
    }

    #[test]
    fn test_propagate_unlocks() {
        let mut g = two_menu_graph();
        assert_eq!(g.propagate_unlocks(), vec!["res".to_string()]);
        assert_eq!(g.get_setting("res").unwrap().state, SettingState::Disabled);
        assert!(g.propagate_unlocks().is_empty());
    }

    #[test]
    fn test_derived_graphs() {
        let g = two_menu_graph();
        let menus = g.menu_graph();
        assert!(menus.has_edge("audio_0_0", "video_1_0"));
        let deps = g.dependency_graph();
        assert!(deps.has_edge("vol", "res"));
        assert_eq!(g.menu_of("res").map(|m| m.id.as_str()), Some("video_1_0"));
        assert_eq!(g.locked_count(), 1);
        assert_eq!(g.total_dependencies(), 1);
    }
}
