//! Full generation pipeline: collapse → topology → settings → dependencies.
//!
//! Every structural rejection is retried with the same random source, so a
//! seeded run is reproducible including its failed attempts. After
//! [`MAX_GENERATION_ATTEMPTS`] rejections the last failure is returned.

use log::{debug, info, warn};
use menumaze_logic::analyzer;
use menumaze_logic::{ContentGraph, DependencyResolver, MenuNode, SettingState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

use super::compiler::SettingCompiler;
use super::dependencies::DependencyGenerator;
use super::labels::LabelGenerator;
use super::topology::TopologyConverter;
use super::wfc::WfcGenerator;
use crate::config::GenerationData;
use crate::error::{Error, Result, ValidationFailure};

pub const MAX_GENERATION_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Generating,
    Done,
}

pub struct GenerationPipeline {
    data: GenerationData,
    state: PipelineState,
}

impl GenerationPipeline {
    pub fn new(data: GenerationData) -> Self {
        Self {
            data,
            state: PipelineState::Generating,
        }
    }

    pub fn data(&self) -> &GenerationData {
        &self.data
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Generate a content graph. `None` seeds from OS entropy.
    pub fn generate(&mut self, seed: Option<u64>) -> Result<ContentGraph> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            "generating content graph (seed {:?}, {}x{} grid, tier {})",
            seed, self.data.config.grid_width, self.data.config.grid_height, self.data.config.difficulty_tier
        );
        self.generate_with(&mut rng)
    }

    /// Generate using a caller-owned random source.
    pub fn generate_with(&mut self, rng: &mut impl Rng) -> Result<ContentGraph> {
        self.state = PipelineState::Generating;

        let mut last_failure = ValidationFailure::Empty;
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            match self.build_topology(rng) {
                Ok(converter) => {
                    let content = self.populate(&converter, rng);
                    self.state = PipelineState::Done;
                    info!(
                        "generated {} menus, {} settings, {} dependencies on attempt {}",
                        content.menu_count(),
                        content.setting_count(),
                        content.total_dependencies(),
                        attempt
                    );
                    return Ok(content);
                }
                Err(failure) => {
                    warn!(
                        "attempt {}/{} rejected: {}",
                        attempt, MAX_GENERATION_ATTEMPTS, failure
                    );
                    last_failure = failure;
                }
            }
        }

        Err(Error::StructuralValidation {
            attempts: MAX_GENERATION_ATTEMPTS,
            failure: last_failure,
        })
    }

    fn build_topology(
        &self,
        rng: &mut impl Rng,
    ) -> std::result::Result<TopologyConverter, ValidationFailure> {
        let config = &self.data.config;
        let grid = WfcGenerator::new(&self.data.rules, config.grid_width, config.grid_height)
            .generate(rng);

        let mut converter = TopologyConverter::from_grid(&grid);
        converter.validate_graph(config.min_path_length)?;

        let pruned = converter.prune_dead_ends();
        if pruned > 0 {
            debug!("pruned {} unreachable menus", pruned);
        }

        let found = converter.category_count();
        if found < config.required_categories {
            return Err(ValidationFailure::TooFewCategories {
                found,
                required: config.required_categories,
            });
        }
        Ok(converter)
    }

    fn populate(&self, converter: &TopologyConverter, rng: &mut impl Rng) -> ContentGraph {
        let config = &self.data.config;
        let compiler = SettingCompiler::new(
            &self.data.categories,
            LabelGenerator::new(&self.data.labels),
            config.max_items_per_page,
        );
        let critical: BTreeSet<String> = converter
            .critical_path(config.min_path_length)
            .into_iter()
            .collect();

        let mut content = ContentGraph::new();
        for node in converter.graph.nodes() {
            let Some(category) = converter.category_of(node) else {
                continue;
            };
            let mut menu = MenuNode::new(node, category);
            for succ in converter.graph.successors(node) {
                menu.connect(succ);
            }
            let settings = compiler.compile(node, category, critical.contains(node), rng);
            content.add_menu(menu, settings);
        }

        let profile = config
            .difficulty_tier
            .dependency_profile(content.setting_count());
        let mut resolver =
            DependencyGenerator::new(&converter.graph, &content.menus, config.min_path_length)
                .with_profile(profile)
                .generate(rng);
        let trimmed = cap_dependencies(&mut resolver, profile.max_dependencies);
        if trimmed > 0 {
            debug!(
                "trimmed {} dependencies over the {} cap of {}",
                trimmed, config.difficulty_tier, profile.max_dependencies
            );
        }
        content.resolver = resolver;

        if config.lock_gated_settings {
            lock_gated_settings(&mut content);
        }

        let start = analyzer::start_nodes(&converter.graph)
            .into_iter()
            .next()
            .or_else(|| converter.graph.nodes().next().map(str::to_string));
        content.start_menu = start.clone();
        content.current_menu = start;
        content
    }
}

/// Truncate every dependency list to at most `max` entries.
/// Returns the number of dependencies dropped.
fn cap_dependencies(resolver: &mut DependencyResolver, max: usize) -> usize {
    let max = max.max(1);
    let mut dropped = 0;
    for list in resolver.dependencies.values_mut() {
        if list.len() > max {
            dropped += list.len() - max;
            list.truncate(max);
        }
    }
    dropped
}

/// Lock every setting whose dependencies do not hold, repeating until no
/// setting changes. A lock can break a dependent's prerequisite, so one pass
/// is not enough. Returns the number of settings locked.
fn lock_gated_settings(content: &mut ContentGraph) -> usize {
    let mut locked = 0;
    loop {
        let gated: Vec<String> = content
            .resolver
            .dependencies
            .keys()
            .filter(|id| content.settings.get(*id).is_some_and(|s| !s.is_locked()))
            .filter(|id| !content.can_enable(id))
            .cloned()
            .collect();
        if gated.is_empty() {
            return locked;
        }
        for id in &gated {
            if let Some(setting) = content.get_setting_mut(id) {
                setting.state = SettingState::Locked;
            }
        }
        locked += gated.len();
    }
}
