//! Generation inputs: parameters, adjacency rules, category specs and labels.
//!
//! All four load from JSON, either from a directory on disk or from the
//! copy under `data/` that is compiled into the crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const GENERATION_JSON: &str = include_str!("../../../data/generation.json");
const WFC_RULES_JSON: &str = include_str!("../../../data/wfc_rules.json");
const CATEGORIES_JSON: &str = include_str!("../../../data/categories.json");
const LABELS_JSON: &str = include_str!("../../../data/labels.json");

/// Settings compiled for a category without a spec.
pub const DEFAULT_SETTING_COUNT: usize = 8;

// ── Difficulty tier ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Per-setting dependency count distribution for a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencyProfile {
    pub min_dependencies: usize,
    pub max_dependencies: usize,
    pub mean_dependencies: f64,
    pub std_dev: f64,
}

impl DifficultyTier {
    /// Dependency counts for this tier; the max is capped at `min(total / 2, 20)`.
    pub fn dependency_profile(self, total_settings: usize) -> DependencyProfile {
        let cap = (total_settings / 2).min(20);
        let (max, mean, std_dev) = match self {
            DifficultyTier::Easy => (3, 1.5, 0.7),
            DifficultyTier::Medium => (6, 3.0, 1.2),
            DifficultyTier::Hard => (12, 5.0, 2.0),
        };
        DependencyProfile {
            min_dependencies: 1,
            max_dependencies: cap.min(max),
            mean_dependencies: mean,
            std_dev,
        }
    }

    /// Balance preset matching this tier.
    pub fn preset_name(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preset_name())
    }
}

// ── Parameters ──────────────────────────────────────────────────────────

/// Pipeline parameters. Read once when a pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub min_path_length: usize,
    pub max_depth: usize,
    pub required_categories: usize,
    pub gate_distribution: f64,
    pub critical_ratio: f64,
    pub decoy_ratio: f64,
    pub noise_ratio: f64,
    pub difficulty_tier: DifficultyTier,
    pub grid_width: usize,
    pub grid_height: usize,
    pub max_items_per_page: usize,
    /// Lock every setting whose dependencies are unmet right after synthesis.
    pub lock_gated_settings: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_path_length: 3,
            max_depth: 6,
            required_categories: 3,
            gate_distribution: 0.3,
            critical_ratio: 0.4,
            decoy_ratio: 0.2,
            noise_ratio: 0.1,
            difficulty_tier: DifficultyTier::Medium,
            grid_width: 5,
            grid_height: 5,
            max_items_per_page: 15,
            lock_gated_settings: true,
        }
    }
}

/// Adjacency rule for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Categories allowed in a neighbouring cell.
    pub connections: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Category → adjacency rule.
pub type WfcRules = BTreeMap<String, CategoryRule>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub setting_count: usize,
    #[serde(default)]
    pub complexity: u8,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Named template lists plus the vocabulary that fills `{placeholder}` slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelTemplates {
    pub templates: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub vocabulary: BTreeMap<String, Vec<String>>,
}

// ── Bundle ──────────────────────────────────────────────────────────────

/// Everything a pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationData {
    pub config: GenerationConfig,
    pub rules: WfcRules,
    pub categories: BTreeMap<String, CategorySpec>,
    pub labels: LabelTemplates,
}

impl GenerationData {
    /// The data set compiled into the crate.
    pub fn builtin() -> Result<Self> {
        let base = Path::new("<builtin>");
        let data = Self {
            config: parse(&base.join("generation.json"), GENERATION_JSON)?,
            rules: parse(&base.join("wfc_rules.json"), WFC_RULES_JSON)?,
            categories: parse(&base.join("categories.json"), CATEGORIES_JSON)?,
            labels: parse(&base.join("labels.json"), LABELS_JSON)?,
        };
        data.check_required()?;
        Ok(data)
    }

    /// Load the four JSON files from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let data = Self {
            config: load_file(&dir.join("generation.json"))?,
            rules: load_file(&dir.join("wfc_rules.json"))?,
            categories: load_file(&dir.join("categories.json"))?,
            labels: load_file(&dir.join("labels.json"))?,
        };
        data.check_required()?;
        log::debug!(
            "loaded {} categories and {} rules from {}",
            data.categories.len(),
            data.rules.len(),
            dir.display()
        );
        Ok(data)
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    fn check_required(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::ConfigurationMissing {
                what: "wfc_rules: no categories defined".to_string(),
            });
        }
        if !self.labels.templates.contains_key("setting_labels") {
            return Err(Error::ConfigurationMissing {
                what: "labels: setting_labels template list".to_string(),
            });
        }
        Ok(())
    }
}

fn load_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::ConfigurationMissing {
            what: format!("configuration file not found: {}", path.display()),
        });
    }
    let text = std::fs::read_to_string(path)?;
    parse(path, &text)
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| Error::ConfigurationInvalid {
        file: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_data_loads() {
        let data = GenerationData::builtin().unwrap();
        assert!(data.rules.len() >= 3);
        assert!(data.config.min_path_length >= 3);
        for rule in data.rules.values() {
            for target in &rule.connections {
                assert!(data.rules.contains_key(target), "unknown category {}", target);
            }
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: GenerationConfig = serde_json::from_str(r#"{"min_path_length": 4}"#).unwrap();
        assert_eq!(cfg.min_path_length, 4);
        assert_eq!(cfg.grid_width, 5);
        assert!(cfg.lock_gated_settings);
        assert_eq!(cfg.difficulty_tier, DifficultyTier::Medium);
    }

    #[test]
    fn test_tier_profiles() {
        let easy = DifficultyTier::Easy.dependency_profile(100);
        assert_eq!(easy.max_dependencies, 3);
        let hard = DifficultyTier::Hard.dependency_profile(10);
        assert_eq!(hard.max_dependencies, 5);
        let tiny = DifficultyTier::Medium.dependency_profile(100);
        assert_eq!(tiny.max_dependencies, 6);
        assert_eq!(DifficultyTier::Hard.preset_name(), "hard");
    }

    #[test]
    fn test_missing_dir_is_configuration_missing() {
        let err = GenerationData::from_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing { .. }));
    }
}
