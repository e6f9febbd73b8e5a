//! Pure content-graph logic for MenuMaze.
//!
//! This crate holds the data model of a settings-menu maze and every
//! read-only analysis over it. Nothing here owns a random source or touches
//! the filesystem; generation and tuning live in `menumaze-core`.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analyzer`] | Start/end nodes, reachability, critical path, SCCs over a [`graph::DiGraph`] |
//! | [`content`] | The [`content::ContentGraph`] arena of menus, settings and dependencies |
//! | [`dependency`] | Simple/value dependencies and the resolver (AND semantics) |
//! | [`difficulty`] | Density/chain/branching metrics and the 0–100 difficulty score |
//! | [`evaluator`] | Cached dependency evaluation with transitive invalidation |
//! | [`graph`] | Insertion-ordered directed graph over string ids |
//! | [`menu`] | Menu nodes, accessibility requirements, completion |
//! | [`progress`] | Overall progress, per-menu completion, victory condition |
//! | [`solvability`] | Cycle, dangling-reference, reachability and unlock checks |
//! | [`types`] | Setting states, value types, the setting record |

pub mod analyzer;
pub mod content;
pub mod dependency;
pub mod difficulty;
pub mod evaluator;
pub mod graph;
pub mod menu;
pub mod progress;
pub mod solvability;
pub mod types;

pub use content::{ContentGraph, UpdateError};
pub use dependency::{CompareOp, Dependency, DependencyResolver, SettingLookup};
pub use graph::DiGraph;
pub use menu::MenuNode;
pub use types::{CompletionState, Setting, SettingState, SettingType, SettingValue};
