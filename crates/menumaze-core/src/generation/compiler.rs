//! Setting compiler: turns a menu node into its list of settings.

use menumaze_logic::{Setting, SettingState, SettingType};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::BTreeMap;

use super::labels::LabelGenerator;
use crate::config::{CategorySpec, DEFAULT_SETTING_COUNT};

pub const DEFAULT_MIN_VALUE: f64 = 0.0;
pub const DEFAULT_MAX_VALUE: f64 = 100.0;

/// Boolean / integer / float / string weights for critical-path menus.
const CRITICAL_TYPE_WEIGHTS: [f64; 4] = [0.5, 0.2, 0.2, 0.1];
const NORMAL_TYPE_WEIGHTS: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

pub struct SettingCompiler<'a> {
    categories: &'a BTreeMap<String, CategorySpec>,
    labels: LabelGenerator<'a>,
    max_items_per_page: usize,
}

impl<'a> SettingCompiler<'a> {
    pub fn new(
        categories: &'a BTreeMap<String, CategorySpec>,
        labels: LabelGenerator<'a>,
        max_items_per_page: usize,
    ) -> Self {
        Self {
            categories,
            labels,
            max_items_per_page,
        }
    }

    /// How many settings a menu of `category` gets.
    pub fn setting_count(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map(|c| c.setting_count)
            .unwrap_or(DEFAULT_SETTING_COUNT)
            .min(self.max_items_per_page)
    }

    /// Settings for one menu. Critical menus start DISABLED, others ENABLED.
    pub fn compile(
        &self,
        node_id: &str,
        category: &str,
        is_critical: bool,
        rng: &mut impl Rng,
    ) -> Vec<Setting> {
        (0..self.setting_count(category))
            .map(|i| self.create_setting(node_id, category, i, is_critical, rng))
            .collect()
    }

    fn create_setting(
        &self,
        node_id: &str,
        category: &str,
        index: usize,
        is_critical: bool,
        rng: &mut impl Rng,
    ) -> Setting {
        let setting_type = choose_type(is_critical, rng);
        let label = self.labels.setting_label(category, index, rng);
        let state = if is_critical {
            SettingState::Disabled
        } else {
            SettingState::Enabled
        };
        let setting = Setting::new(
            format!("{}_setting_{}", node_id, index),
            setting_type,
            state,
            label,
        );
        if setting_type.is_numeric() {
            setting.with_bounds(DEFAULT_MIN_VALUE, DEFAULT_MAX_VALUE)
        } else {
            setting
        }
    }
}

fn choose_type(is_critical: bool, rng: &mut impl Rng) -> SettingType {
    let weights = if is_critical {
        CRITICAL_TYPE_WEIGHTS
    } else {
        NORMAL_TYPE_WEIGHTS
    };
    match WeightedIndex::new(weights) {
        Ok(dist) => SettingType::ALL[dist.sample(rng)],
        Err(_) => SettingType::Boolean,
    }
}
