//! Label generation from `{placeholder}` templates.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::LabelTemplates;

/// Used when a template list is missing or empty.
const FALLBACK_TEMPLATE: &str = "{category} {setting}";

/// Fills templates from a context map first, then the vocabulary.
pub struct LabelGenerator<'a> {
    labels: &'a LabelTemplates,
}

impl<'a> LabelGenerator<'a> {
    pub fn new(labels: &'a LabelTemplates) -> Self {
        Self { labels }
    }

    pub fn setting_label(&self, category: &str, index: usize, rng: &mut impl Rng) -> String {
        let index = index.to_string();
        self.generate(
            "setting_labels",
            &[("category", category), ("index", &index)],
            rng,
        )
    }

    fn generate(&self, kind: &str, context: &[(&str, &str)], rng: &mut impl Rng) -> String {
        let template = self
            .labels
            .templates
            .get(kind)
            .and_then(|list| list.choose(rng))
            .map(String::as_str)
            .unwrap_or(FALLBACK_TEMPLATE);
        let context: BTreeMap<&str, &str> = context.iter().copied().collect();
        self.fill(template, &context, rng)
    }

    /// Replace each `{word}` slot. Unknown placeholders render as `[word]`.
    pub fn fill(&self, template: &str, context: &BTreeMap<&str, &str>, rng: &mut impl Rng) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = &after[..close];
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                out.push('{');
                rest = after;
                continue;
            }
            out.push_str(&self.placeholder_value(name, context, rng));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn placeholder_value(&self, name: &str, context: &BTreeMap<&str, &str>, rng: &mut impl Rng) -> String {
        if let Some(v) = context.get(name) {
            return v.to_string();
        }
        self.labels
            .vocabulary
            .get(name)
            .and_then(|words| words.choose(rng))
            .cloned()
            .unwrap_or_else(|| format!("[{}]", name))
    }
}
