//! Core setting types: states, value kinds, and the setting record itself.
//!
//! Settings live in the [`ContentGraph`](crate::content::ContentGraph) arena
//! keyed by id. Everything else (menus, dependencies) refers to them by id.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Lifecycle state of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingState {
    Enabled,
    Disabled,
    Hidden,
    Locked,
    Blinking,
}

impl SettingState {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingState::Enabled => "enabled",
            SettingState::Disabled => "disabled",
            SettingState::Hidden => "hidden",
            SettingState::Locked => "locked",
            SettingState::Blinking => "blinking",
        }
    }

    /// States this state may move to directly.
    pub fn allowed_transitions(self) -> &'static [SettingState] {
        match self {
            SettingState::Disabled => &[SettingState::Enabled, SettingState::Hidden],
            SettingState::Enabled => &[SettingState::Disabled, SettingState::Locked],
            SettingState::Locked => &[SettingState::Enabled],
            SettingState::Hidden => &[SettingState::Disabled, SettingState::Enabled],
            SettingState::Blinking => &[SettingState::Enabled, SettingState::Disabled],
        }
    }

    pub fn can_transition(self, to: SettingState) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

impl fmt::Display for SettingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag of a setting's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Boolean,
    Integer,
    Float,
    String,
}

impl SettingType {
    pub const ALL: [SettingType; 4] = [
        SettingType::Boolean,
        SettingType::Integer,
        SettingType::Float,
        SettingType::String,
    ];

    /// Zero value used when a setting is first compiled.
    pub fn default_value(self) -> SettingValue {
        match self {
            SettingType::Boolean => SettingValue::Bool(false),
            SettingType::Integer => SettingValue::Int(0),
            SettingType::Float => SettingValue::Float(0.0),
            SettingType::String => SettingValue::Text(String::new()),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SettingType::Integer | SettingType::Float)
    }
}

/// A concrete setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingValue::Bool(_) => SettingType::Boolean,
            SettingValue::Int(_) => SettingType::Integer,
            SettingValue::Float(_) => SettingType::Float,
            SettingValue::Text(_) => SettingType::String,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(v) => Some(*v as f64),
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Ordering between two values, or `None` if they cannot be compared.
    ///
    /// Integers and floats compare numerically with each other; every
    /// other pairing must share a type.
    pub fn compare(&self, other: &SettingValue) -> Option<Ordering> {
        match (self, other) {
            (SettingValue::Bool(a), SettingValue::Bool(b)) => Some(a.cmp(b)),
            (SettingValue::Text(a), SettingValue::Text(b)) => Some(a.cmp(b)),
            (SettingValue::Int(a), SettingValue::Int(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b)
            }
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{:.2}", v),
            SettingValue::Text(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Completion state of a menu node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    #[default]
    Incomplete,
    Partial,
    Complete,
}

/// A single configurable setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub setting_type: SettingType,
    pub value: SettingValue,
    pub state: SettingState,
    pub label: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Number of successful value updates.
    pub visit_count: u32,
}

impl Setting {
    /// Create a setting holding its type's default value.
    pub fn new(
        id: impl Into<String>,
        setting_type: SettingType,
        state: SettingState,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            setting_type,
            value: setting_type.default_value(),
            state,
            label: label.into(),
            min_value: None,
            max_value: None,
            visit_count: 0,
        }
    }

    /// Attach numeric bounds. Swapped bounds are normalized so `min <= max`.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.min_value = Some(lo);
        self.max_value = Some(hi);
        self
    }

    pub fn with_value(mut self, value: SettingValue) -> Self {
        self.value = value;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.state == SettingState::Enabled
    }

    pub fn is_locked(&self) -> bool {
        self.state == SettingState::Locked
    }

    /// Whether `value` has a compatible type for this setting.
    ///
    /// Float settings also accept integer values.
    pub fn accepts_type(&self, value: &SettingValue) -> bool {
        let incoming = value.setting_type();
        incoming == self.setting_type
            || (self.setting_type == SettingType::Float && incoming == SettingType::Integer)
    }

    /// Whether `value` lies within the numeric bounds (non-numeric values always do).
    pub fn within_bounds(&self, value: &SettingValue) -> bool {
        let Some(v) = value.as_f64() else {
            return true;
        };
        if let Some(min) = self.min_value {
            if v < min {
                return false;
            }
        }
        if let Some(max) = self.max_value {
            if v > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_transitions() {
        assert!(SettingState::Disabled.can_transition(SettingState::Enabled));
        assert!(SettingState::Locked.can_transition(SettingState::Enabled));
        assert!(!SettingState::Locked.can_transition(SettingState::Disabled));
        assert!(!SettingState::Hidden.can_transition(SettingState::Locked));
        assert_eq!(SettingState::Enabled.allowed_transitions().len(), 2);
    }

    #[test]
    fn test_default_values_match_type() {
        for t in SettingType::ALL {
            assert_eq!(t.default_value().setting_type(), t);
        }
    }

    #[test]
    fn test_numeric_comparison_across_types() {
        let a = SettingValue::Int(3);
        let b = SettingValue::Float(2.5);
        assert_eq!(a.compare(&b), Some(Ordering::Greater));
        assert_eq!(
            SettingValue::Bool(true).compare(&SettingValue::Int(1)),
            None
        );
        assert_eq!(
            SettingValue::Text("a".into()).compare(&SettingValue::Text("b".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_bounds() {
        let s = Setting::new("s", SettingType::Integer, SettingState::Enabled, "S")
            .with_bounds(100.0, 0.0);
        assert_eq!(s.min_value, Some(0.0));
        assert!(s.within_bounds(&SettingValue::Int(50)));
        assert!(!s.within_bounds(&SettingValue::Int(101)));
        assert!(!s.within_bounds(&SettingValue::Float(-0.5)));
    }

    #[test]
    fn test_float_setting_accepts_int() {
        let s = Setting::new("f", SettingType::Float, SettingState::Enabled, "F");
        assert!(s.accepts_type(&SettingValue::Int(4)));
        assert!(!s.accepts_type(&SettingValue::Bool(true)));
    }
}
