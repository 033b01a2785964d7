//! ImportError: unified error type for the geometry import pipeline.
//!
//! Every fallible step of a load returns this type so a single caller can
//! report the failure and abandon the load. Nothing here is recoverable;
//! advisory conditions are logged instead of being returned.

use crate::engine::EntityHandle;
use crate::model::boundary::UnsupportedBoundary;
use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for geometry import operations.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The fixed-name geometry source is not present in the input directory.
    #[error("Geometry file '{}' does not exist!", .0.display())]
    MissingGeometryFile(PathBuf),
    /// A call into the geometry engine itself failed.
    #[error("geometry engine failure during {operation}: {message}")]
    Engine {
        operation: &'static str,
        message: String,
    },
    /// The ASCII geometry source could not be parsed.
    #[error("geometry parse error: {0}")]
    GeometryParse(String),
    /// Index outside `1..=count` for the requested dimension.
    #[error("entity index {index} out of range for dimension {dimension} ({count} entities)")]
    IndexOutOfRange {
        dimension: u8,
        index: usize,
        count: usize,
    },
    /// Handle not known to the engine.
    #[error("unknown entity handle {0}")]
    UnknownHandle(EntityHandle),

    /// A volume carries no `material` property.
    #[error("Volume {volume} (handle {handle}) has no material assignment.")]
    EmptyMaterialTag { volume: i32, handle: EntityHandle },
    /// Library strategy: the volume's material key is not in the library.
    #[error("Material with value {0} not found in the material library")]
    MaterialNotInLibrary(String),
    /// Library record without a usable integer `mat_number`.
    #[error("Library material {key} has no integer mat_number")]
    MissingMaterialNumber { key: String },
    /// Legacy strategy: several registered materials share the name.
    #[error(
        "More than one material found with name {0}. Please ensure materials have unique \
         names if using this property to assign materials."
    )]
    AmbiguousMaterialName(String),
    /// Legacy strategy: no name match and the tag is not an integer.
    #[error("Could not convert material name {0} to id")]
    InvalidMaterialId(String),
    /// A non-void material id that is not registered.
    #[error("Material {id} assigned to volume {volume} is not registered")]
    UnregisteredMaterial { id: i32, volume: i32 },
    /// Two registered materials with the same id.
    #[error("Two or more materials use the same unique ID: {0}")]
    DuplicateMaterialId(i32),
    /// `temp` property that does not parse as a float.
    #[error("Invalid temperature \"{value}\" on volume {volume}")]
    InvalidTemperature { volume: i32, value: String },

    /// `white` or `periodic` boundary tag.
    #[error("{0} boundary condition not supported for imported geometry.")]
    UnsupportedBoundary(UnsupportedBoundary),
    /// Boundary tag that matches no known keyword.
    #[error("Unknown boundary condition \"{value}\" specified on surface {surface}")]
    UnknownBoundary { value: String, surface: i32 },

    /// A materials XML document could not be parsed.
    #[error("Error reading library materials: {0}")]
    MaterialsXml(String),
    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Shorthand for [`ImportError::Engine`].
    pub fn engine(operation: &'static str, message: impl Into<String>) -> Self {
        ImportError::Engine {
            operation,
            message: message.into(),
        }
    }
}
