//! Generation - grid collapse, menu topology, settings and dependencies.

pub mod compiler;
pub mod dependencies;
pub mod labels;
pub mod pipeline;
pub mod topology;
pub mod wfc;

pub use compiler::SettingCompiler;
pub use dependencies::DependencyGenerator;
pub use labels::LabelGenerator;
pub use pipeline::{GenerationPipeline, PipelineState, MAX_GENERATION_ATTEMPTS};
pub use topology::TopologyConverter;
pub use wfc::{Cell, Grid, Position, WfcGenerator};
