use std::path::PathBuf;

use concourse_config::ConfigError;
use concourse_data::DataLoadError;

use crate::entity::Position;

/// Errors that can occur while building or populating a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Failed to locate or read a scenario directory's files.
    #[error("data load error in {dir}: {source}")]
    DataLoad {
        dir: PathBuf,
        source: DataLoadError,
    },

    /// The registry rejected a schema or a document outside any entity.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One entity of a scenario failed to parse or construct.
    #[error("entity {index} ({id}): {source}")]
    Entity {
        index: usize,
        id: String,
        source: ConfigError,
    },

    /// The scenario document does not have the expected outer structure.
    #[error("malformed scenario: {detail}")]
    Scenario { detail: String },

    #[error("invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("entity at {position} lies outside the {width}x{height} world")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },

    /// A scenario entity parsed but sits off the grid.
    #[error("entity {index} ({id}) at {position} lies outside the {width}x{height} world")]
    EntityOutOfBounds {
        index: usize,
        id: String,
        position: Position,
        width: i32,
        height: i32,
    },

    /// The registry produced an object type no entity variant exists for.
    #[error("no entity variant for configuration type {type_name}")]
    UnmappedEntityType { type_name: String },
}

impl WorldError {
    /// The index of the failing entity within its scenario, if any.
    pub fn entity_index(&self) -> Option<usize> {
        match self {
            WorldError::Entity { index, .. } | WorldError::EntityOutOfBounds { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}
