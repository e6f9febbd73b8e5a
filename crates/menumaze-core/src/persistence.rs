//! Save/Load for generated content graphs
//!
//! Binary saves use bincode with a format version header. JSON export is
//! for inspection and tooling; it carries the same version field.

use menumaze_logic::ContentGraph;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a content graph
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Seed the graph was generated from, if known
    pub seed: Option<u64>,
    pub graph: ContentGraph,
}

/// Save a content graph to a writer
pub fn save_content<W: Write>(
    writer: W,
    graph: &ContentGraph,
    seed: Option<u64>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        seed,
        graph: graph.clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a content graph from a reader
pub fn load_content<R: Read>(reader: R) -> Result<LoadedContent, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    check_version(save_data)
}

/// Pretty-printed JSON with the same layout as a binary save
pub fn export_json<W: Write>(
    writer: W,
    graph: &ContentGraph,
    seed: Option<u64>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        seed,
        graph: graph.clone(),
    };
    serde_json::to_writer_pretty(writer, &save_data)?;
    Ok(())
}

pub fn import_json<R: Read>(reader: R) -> Result<LoadedContent, SaveError> {
    let save_data: SaveData = serde_json::from_reader(reader)?;
    check_version(save_data)
}

fn check_version(save_data: SaveData) -> Result<LoadedContent, SaveError> {
    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    Ok(LoadedContent {
        seed: save_data.seed,
        graph: save_data.graph,
    })
}

/// Result of loading a save
pub struct LoadedContent {
    pub seed: Option<u64>,
    pub graph: ContentGraph,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
