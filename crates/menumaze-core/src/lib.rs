//! MenuMaze Core - procedural settings-menu maze generation
//!
//! Builds a [`ContentGraph`](menumaze_logic::ContentGraph) of menus and
//! interdependent settings from a seed, and retunes finished graphs toward
//! a difficulty preset.
//!
//! # Architecture
//!
//! Generation is a single-threaded pipeline driven by one seeded random source:
//! - **Grid collapse**: categories assigned to a grid under adjacency rules
//! - **Topology**: collapsed cells become menus, adjacency becomes navigation
//! - **Population**: each menu gets settings compiled from its category
//! - **Dependencies**: navigation, critical-path and cross-link gating
//!
//! Analysis (solvability, difficulty, progress) lives in `menumaze-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use menumaze_core::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let data = GenerationData::builtin()?;
//! let mut graph = GenerationPipeline::new(data).generate(Some(42))?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! BalanceTuner::new(&mut graph, &mut rng).apply_preset("medium")?;
//!
//! let mut checker = SolvabilityChecker::new();
//! checker.validate(&graph);
//! println!("{}", checker.report());
//! println!("{}", difficulty::report(&difficulty::analyze(&graph)));
//! # Ok::<(), menumaze_core::error::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod persistence;
pub mod tuning;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::{DifficultyTier, GenerationConfig, GenerationData};
    pub use crate::error::{Error, Result, ValidationFailure};
    pub use crate::generation::GenerationPipeline;
    pub use crate::tuning::{BalanceTuner, TuningReport};
    pub use menumaze_logic::difficulty;
    pub use menumaze_logic::solvability::SolvabilityChecker;
    pub use menumaze_logic::ContentGraph;
}
