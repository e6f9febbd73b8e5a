//! Menu nodes: a category, an ordered list of owned setting ids, and
//! outgoing connections to other menus.

use serde::{Deserialize, Serialize};

use crate::dependency::SettingLookup;
use crate::types::{CompletionState, SettingState};

/// A setting that must be in a given state before a menu can be entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub setting_id: String,
    pub state: SettingState,
}

/// A menu in the content graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: String,
    pub category: String,
    /// Ids of the settings this menu owns, in display order.
    pub settings: Vec<String>,
    /// Ids of menus reachable from this one.
    pub connections: Vec<String>,
    pub requirements: Vec<Requirement>,
    pub visited: bool,
    pub completion: CompletionState,
}

impl MenuNode {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            settings: Vec::new(),
            connections: Vec::new(),
            requirements: Vec::new(),
            visited: false,
            completion: CompletionState::Incomplete,
        }
    }

    pub fn connect(&mut self, menu_id: impl Into<String>) {
        let menu_id = menu_id.into();
        if !self.connections.contains(&menu_id) {
            self.connections.push(menu_id);
        }
    }

    pub fn is_connected(&self, menu_id: &str) -> bool {
        self.connections.iter().any(|c| c == menu_id)
    }

    pub fn require(&mut self, setting_id: impl Into<String>, state: SettingState) {
        self.requirements.push(Requirement {
            setting_id: setting_id.into(),
            state,
        });
    }

    /// The first setting, which gates navigation into successor menus.
    pub fn key_setting(&self) -> Option<&str> {
        self.settings.first().map(String::as_str)
    }

    /// All requirements hold. A requirement on a missing setting fails.
    pub fn is_accessible(&self, lookup: &impl SettingLookup) -> bool {
        self.requirements.iter().all(|req| {
            lookup
                .lookup_setting(&req.setting_id)
                .is_some_and(|s| s.state == req.state)
        })
    }

    /// Completion derived from how many owned settings are enabled.
    pub fn calculate_completion(&self, lookup: &impl SettingLookup) -> CompletionState {
        if self.settings.is_empty() {
            return CompletionState::Complete;
        }
        let enabled = self
            .settings
            .iter()
            .filter_map(|id| lookup.lookup_setting(id))
            .filter(|s| s.is_enabled())
            .count();
        if enabled == 0 {
            CompletionState::Incomplete
        } else if enabled == self.settings.len() {
            CompletionState::Complete
        } else {
            CompletionState::Partial
        }
    }
}
